use crate::clients::{
    entities::{AlbumRecord, AlbumSummary, ArtistProfile},
    errors::Result,
};

/// Read-only view of the external music catalog.
///
/// Every call is a single request; implementations must not paginate, retry or cache.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Artist profile by catalog id
    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile>;

    /// Album-type releases of an artist in the fixed market, first page only
    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumSummary>>;

    /// Full album record behind an album summary's detail link
    async fn album(&self, href: &str) -> Result<AlbumRecord>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile> {
        (**self).artist(artist_id).await
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumSummary>> {
        (**self).artist_albums(artist_id).await
    }

    async fn album(&self, href: &str) -> Result<AlbumRecord> {
        (**self).album(href).await
    }
}
