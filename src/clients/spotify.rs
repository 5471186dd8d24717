use log::debug;

use crate::clients::{
    catalog::Catalog,
    entities::{AlbumRecord, AlbumSummary, ArtistProfile, ArtistRef, DatePrecision, TrackPage, TrackRecord},
    errors::{Error, Result},
};
use rspotify::{
    ClientCredsSpotify, Credentials,
    model::{
        AlbumId, AlbumType, ArtistId, Country, DatePrecision as SpotifyDatePrecision, FullAlbum,
        FullArtist, Market, SimplifiedAlbum, SimplifiedTrack,
    },
    prelude::*,
};

/// Albums are always requested for this market
pub const MARKET: Market = Market::Country(Country::UnitedStates);

impl From<FullArtist> for ArtistProfile {
    fn from(f: FullArtist) -> ArtistProfile {
        ArtistProfile { name: f.name }
    }
}

impl From<SimplifiedAlbum> for AlbumSummary {
    fn from(f: SimplifiedAlbum) -> AlbumSummary {
        AlbumSummary {
            artists: f
                .artists
                .into_iter()
                .map(|a| ArtistRef { name: a.name })
                .collect(),
            href: f.href,
        }
    }
}

impl From<SpotifyDatePrecision> for DatePrecision {
    fn from(f: SpotifyDatePrecision) -> DatePrecision {
        match f {
            SpotifyDatePrecision::Year => DatePrecision::Year,
            SpotifyDatePrecision::Month => DatePrecision::Month,
            SpotifyDatePrecision::Day => DatePrecision::Day,
        }
    }
}

impl From<SimplifiedTrack> for TrackRecord {
    fn from(f: SimplifiedTrack) -> TrackRecord {
        TrackRecord {
            name: f.name,
            track_number: f.track_number,
            duration_ms: f.duration.num_milliseconds().unsigned_abs(),
        }
    }
}

impl From<FullAlbum> for AlbumRecord {
    fn from(f: FullAlbum) -> AlbumRecord {
        AlbumRecord {
            name: f.name,
            release_date: f.release_date,
            release_date_precision: f.release_date_precision.into(),
            tracks: TrackPage {
                items: f.tracks.items.into_iter().map(TrackRecord::from).collect(),
            },
        }
    }
}

/// Extract the album id from a detail link such as
/// `https://api.spotify.com/v1/albums/{id}?market=US`
fn album_id_from_href(href: &str) -> Result<AlbumId<'_>> {
    let segment = href
        .split(['?', '#'])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::UpstreamError(format!("album link without id: {href}")))?;
    AlbumId::from_id(segment)
        .map_err(|e| Error::UpstreamError(format!("album link {href} has no valid id: {e}")))
}

/// Catalog backed by the Spotify Web API
pub struct SpotifyClient {
    /// Underlying rspotify client
    pub spotify: ClientCredsSpotify,
}

impl SpotifyClient {
    /// Wrap an rspotify client that may not be authorized yet
    pub fn new(spotify: ClientCredsSpotify) -> Self {
        SpotifyClient { spotify }
    }

    /// Obtain an access token via the client credentials flow
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Requesting Spotify client credentials token ...");
        self.spotify.request_token().await?;
        debug!("Spotify token acquired");
        Ok(())
    }

    /// Create a `SpotifyClient` from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let creds = Credentials::from_env()
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify credentials in environment variables (RSPOTIFY_CLIENT_ID, RSPOTIFY_CLIENT_SECRET).".into()))?;

        Ok(Self::new(ClientCredsSpotify::new(creds)))
    }
}

impl Catalog for SpotifyClient {
    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile> {
        let id = ArtistId::from_id(artist_id)?;
        let artist = self.spotify.artist(id).await?;
        Ok(artist.into())
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumSummary>> {
        let id = ArtistId::from_id(artist_id)?;
        let page = self
            .spotify
            .artist_albums_manual(id, [AlbumType::Album], Some(MARKET), None, None)
            .await?;
        debug!("Artist {artist_id} has {} albums on the first page", page.items.len());
        Ok(page.items.into_iter().map(AlbumSummary::from).collect())
    }

    async fn album(&self, href: &str) -> Result<AlbumRecord> {
        let id = album_id_from_href(href)?;
        let album = self.spotify.album(id, Some(MARKET)).await?;
        Ok(album.into())
    }
}
