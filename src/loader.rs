use chrono::NaiveDate;
use log::{debug, info};

use crate::clients::{
    Catalog, LocalStorage,
    entities::{AlbumRecord, DatePrecision, TrackRecord},
    errors::{Error, Result},
    local_storage::CommitSummary,
};
use crate::model::{AlbumHandle, BandHandle, NewAlbum, NewBand, NewSong, UnitOfWork};

/// Artists loaded when no other list is configured
pub const DEFAULT_ARTIST_IDS: [&str; 5] = [
    "3WrFJ7ztbogyGnTHbHJFl2",
    "22bE4uQ6baNwSHPVcDxLCe",
    "70cRZdQywnSFp9pnc2WTCE",
    "3AA28KZvwAUcZuOKwyblJQ",
    "3jOstUTkEu2JkjvRdBA5Gu",
];

/// Everything a load run needs
pub struct Config<C> {
    /// Where artists, albums and tracks come from
    pub catalog: C,
    /// Store receiving the single commit
    pub storage: LocalStorage,
    /// Catalog artist ids, loaded in order
    pub artist_ids: Vec<String>,
}

/// Builds a [`Config`], defaulting the store and the artist list
pub struct ConfigBuilder<C> {
    catalog: Option<C>,
    storage: Option<LocalStorage>,
    artist_ids: Option<Vec<String>>,
}

impl<C: Catalog> Default for ConfigBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Catalog> ConfigBuilder<C> {
    /// Builder with nothing set
    pub fn new() -> Self {
        Self {
            catalog: None,
            storage: None,
            artist_ids: None, // DEFAULT_ARTIST_IDS
        }
    }

    /// Catalog client to load from; required
    #[must_use]
    pub fn catalog(mut self, catalog: C) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Store to commit into; defaults to [`LocalStorage::try_default`]
    #[must_use]
    pub fn storage(mut self, storage: LocalStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Artists to load instead of [`DEFAULT_ARTIST_IDS`]
    #[must_use]
    pub fn artist_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artist_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Fails with a configuration error when no catalog client was given
    pub fn build(self) -> Result<Config<C>> {
        let catalog = self
            .catalog
            .ok_or_else(|| Error::ConfigurationError("No catalog client configured".into()))?;
        let storage = match self.storage {
            Some(s) => s,
            None => LocalStorage::try_default()?,
        };
        let artist_ids = self
            .artist_ids
            .unwrap_or_else(|| DEFAULT_ARTIST_IDS.iter().map(ToString::to_string).collect());
        Ok(Config {
            catalog,
            storage,
            artist_ids,
        })
    }
}

/// `release_date` is only trusted when the catalog reports day precision
pub fn release_date(record: &AlbumRecord) -> Result<Option<NaiveDate>> {
    if record.release_date_precision != DatePrecision::Day {
        return Ok(None);
    }
    NaiveDate::parse_from_str(&record.release_date, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| {
            Error::ParseError(format!(
                "release date {:?} of {:?}: {e}",
                record.release_date, record.name
            ))
        })
}

/// Stages bands, albums and songs from the catalog and commits them once
pub struct Loader<C> {
    config: Config<C>,
}

impl<C: Catalog> Loader<C> {
    /// Loader owning the configured catalog client and store
    pub fn new(config: Config<C>) -> Self {
        Loader { config }
    }

    /// Store the loader commits into
    pub fn storage(&self) -> &LocalStorage {
        &self.config.storage
    }

    /// Release the store handle once the run is over
    pub fn into_storage(self) -> LocalStorage {
        self.config.storage
    }

    /// Load every configured artist, then commit all staged entities at once.
    ///
    /// The first failing request aborts the run; nothing staged so far reaches the store.
    pub async fn run(&mut self) -> Result<CommitSummary> {
        info!(
            "Starting load of {} artists ...",
            self.config.artist_ids.len()
        );
        let mut work = UnitOfWork::new();
        for artist_id in &self.config.artist_ids {
            self.load_artist(&mut work, artist_id).await?;
        }
        self.config.storage.commit(work)
    }

    /// Stage the artist as a band, then its albums
    pub async fn load_artist(&self, work: &mut UnitOfWork, artist_id: &str) -> Result<BandHandle> {
        let profile = self.config.catalog.artist(artist_id).await?;
        info!("Loading artist {artist_id} ({})", profile.name);
        let band = work.stage_band(NewBand { name: profile.name });
        self.load_albums(work, band, artist_id).await?;
        Ok(band)
    }

    /// Stage the solo album-type releases of an artist under `band`
    pub async fn load_albums(
        &self,
        work: &mut UnitOfWork,
        band: BandHandle,
        artist_id: &str,
    ) -> Result<()> {
        let albums = self.config.catalog.artist_albums(artist_id).await?;

        for summary in albums {
            if summary.is_collaboration() {
                debug!(
                    "Skipping collaboration release of {} artists for artist {artist_id}",
                    summary.artists.len()
                );
                continue;
            }
            let href = summary.href.as_deref().ok_or_else(|| {
                Error::UpstreamError(format!("album of artist {artist_id} has no href"))
            })?;
            let record = self.config.catalog.album(href).await?;

            debug!(
                "Staging album {:?} with {} tracks",
                record.name,
                record.tracks.items.len()
            );
            let album = work.stage_album(NewAlbum {
                release_date: release_date(&record)?,
                title: record.name,
                band,
            });
            Self::load_tracks(work, album, &record.tracks.items);
        }
        Ok(())
    }

    /// Stage every track of `track_list` as a song of `album`
    pub fn load_tracks(work: &mut UnitOfWork, album: AlbumHandle, track_list: &[TrackRecord]) {
        for track in track_list {
            work.stage_song(NewSong {
                title: track.name.clone(),
                track_num: track.track_number,
                length_seconds: track.length_seconds(),
                album,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::TrackPage;

    fn record(precision: DatePrecision, date: &str) -> AlbumRecord {
        AlbumRecord {
            name: "Superunknown".into(),
            release_date: date.into(),
            release_date_precision: precision,
            tracks: TrackPage { items: vec![] },
        }
    }

    #[test]
    fn day_precision_parses_exact_date() {
        let date = release_date(&record(DatePrecision::Day, "1995-03-14")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1995, 3, 14));
    }

    #[test]
    fn coarse_precision_leaves_date_unset() {
        assert_eq!(release_date(&record(DatePrecision::Month, "1995-03")).unwrap(), None);
        assert_eq!(release_date(&record(DatePrecision::Year, "1995")).unwrap(), None);
    }

    #[test]
    fn malformed_day_date_is_parse_error() {
        let err = release_date(&record(DatePrecision::Day, "14/03/1995")).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
