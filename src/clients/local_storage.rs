use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::clients::errors::{Error, Result};
use crate::model::{
    Album, Band, Song, UnitOfWork,
    schema::{Table, initialize_schema},
    unit_of_work::Staged,
};

/// Default store location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "music.db";

/// Rows written by one commit
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Bands inserted
    pub bands: usize,
    /// Albums inserted
    pub albums: usize,
    /// Songs inserted
    pub songs: usize,
}

/// Row counts of the whole store
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// Rows in `bands`
    pub bands: usize,
    /// Rows in `albums`
    pub albums: usize,
    /// Rows in `songs`
    pub songs: usize,
}

/// Log target of echoed SQL statements
pub const SQL_LOG_TARGET: &str = "musicdb::sql";

fn echo_statement(sql: &str) {
    debug!(target: SQL_LOG_TARGET, "{sql}");
}

/// Handle on the `SQLite` store, owned by one load run at a time
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    /// Wrap an open connection, turning foreign key enforcement on
    pub fn new(conn: Connection) -> Result<Self> {
        // SQLite leaves foreign keys off unless asked per connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(LocalStorage { conn })
    }

    /// Open the store at `path`; `:memory:` gives a private in-memory store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("Opened local storage database at {path:?}");
        Self::new(conn)
    }

    /// Private store that disappears with the handle
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    /// Open [`DEFAULT_DB_PATH`]
    pub fn try_default() -> Result<Self> {
        Self::open(DEFAULT_DB_PATH)
    }

    /// Create the tables if they are missing, see [`initialize_schema`]
    pub fn init_db(&self) -> Result<()> {
        initialize_schema(&self.conn)?;
        debug!("Successfully initialized local storage database");
        Ok(())
    }

    /// Raw connection for administration and tests
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Log every executed SQL statement under [`SQL_LOG_TARGET`]
    pub fn echo(&mut self, enabled: bool) {
        let hook: Option<fn(&str)> = if enabled { Some(echo_statement) } else { None };
        self.conn.trace(hook);
    }

    /// Insert every staged entity in one transaction.
    ///
    /// On error the transaction is rolled back and the store keeps exactly the
    /// rows it had before the call.
    pub fn commit(&mut self, mut work: UnitOfWork) -> Result<CommitSummary> {
        let Staged {
            unit,
            bands,
            albums,
            songs,
        } = work.take();

        // Resolve parents before writing anything
        let album_parents = albums
            .iter()
            .map(|album| {
                album
                    .band
                    .index_in(unit)
                    .filter(|&i| i < bands.len())
                    .ok_or_else(|| Error::StagingError(format!("album {:?}", album.title)))
            })
            .collect::<Result<Vec<_>>>()?;
        let song_parents = songs
            .iter()
            .map(|song| {
                song.album
                    .index_in(unit)
                    .filter(|&i| i < albums.len())
                    .ok_or_else(|| Error::StagingError(format!("song {:?}", song.title)))
            })
            .collect::<Result<Vec<_>>>()?;

        let tx = self.conn.transaction()?;

        let mut band_ids = Vec::with_capacity(bands.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (name) VALUES (?1);",
                Table::Band.as_str()
            ))?;
            for band in &bands {
                stmt.execute(params![band.name])?;
                band_ids.push(tx.last_insert_rowid());
            }
        }

        let mut album_ids = Vec::with_capacity(albums.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (title, release_date, band_id) VALUES (?1, ?2, ?3);",
                Table::Album.as_str()
            ))?;
            for (album, &parent) in albums.iter().zip(&album_parents) {
                stmt.execute(params![album.title, album.release_date, band_ids[parent]])?;
                album_ids.push(tx.last_insert_rowid());
            }
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (title, track_num, length_seconds, album_id) VALUES (?1, ?2, ?3, ?4);",
                Table::Song.as_str()
            ))?;
            for (song, &parent) in songs.iter().zip(&song_parents) {
                stmt.execute(params![
                    song.title,
                    song.track_num,
                    song.length_seconds,
                    album_ids[parent]
                ])?;
            }
        }

        tx.commit()?;

        let summary = CommitSummary {
            bands: bands.len(),
            albums: albums.len(),
            songs: songs.len(),
        };
        info!(
            "Committed {} bands, {} albums, {} songs",
            summary.bands, summary.albums, summary.songs
        );
        Ok(summary)
    }

    /// All bands in insertion order
    pub fn bands(&self) -> Result<Vec<Band>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} ORDER BY id;",
            Table::Band.as_str()
        ))?;
        let bands = stmt
            .query_map([], |row| {
                Ok(Band {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bands)
    }

    /// Band with exactly this name, if any
    pub fn band_by_name(&self, name: &str) -> Result<Option<Band>> {
        let query = format!(
            "SELECT id, name FROM {} WHERE name = ?1;",
            Table::Band.as_str()
        );
        let band = self
            .conn
            .query_row(&query, params![name], |row| {
                Ok(Band {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(band)
    }

    /// Albums owned by a band in insertion order
    pub fn albums_of_band(&self, band_id: i64) -> Result<Vec<Album>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title, release_date, band_id FROM {} WHERE band_id = ?1 ORDER BY id;",
            Table::Album.as_str()
        ))?;
        let albums = stmt
            .query_map(params![band_id], |row| {
                Ok(Album {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    release_date: row.get(2)?,
                    band_id: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(albums)
    }

    /// Songs of an album in track order
    pub fn songs_of_album(&self, album_id: i64) -> Result<Vec<Song>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title, track_num, length_seconds, album_id FROM {} WHERE album_id = ?1 ORDER BY track_num;",
            Table::Song.as_str()
        ))?;
        let songs = stmt
            .query_map(params![album_id], |row| {
                Ok(Song {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    track_num: row.get(2)?,
                    length_seconds: row.get(3)?,
                    album_id: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(songs)
    }

    /// Row count of every table
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: Table| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT count(*) FROM {};", table.as_str()),
                [],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(n).unwrap_or_default())
        };
        Ok(StoreCounts {
            bands: count(Table::Band)?,
            albums: count(Table::Album)?,
            songs: count(Table::Song)?,
        })
    }

    /// Manual administration: remove a band together with its albums and songs
    pub fn delete_band(&self, band_id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", Table::Band.as_str()),
            params![band_id],
        )?;
        debug!("Deleted band {band_id}: {}", deleted > 0);
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewAlbum, NewBand, NewSong};
    use chrono::NaiveDate;

    fn storage() -> LocalStorage {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.init_db().unwrap();
        storage
    }

    fn staged_band(name: &str, tracks: &[u32]) -> UnitOfWork {
        let mut work = UnitOfWork::new();
        let band = work.stage_band(NewBand { name: name.into() });
        let album = work.stage_album(NewAlbum {
            title: format!("{name} album"),
            release_date: NaiveDate::from_ymd_opt(1995, 3, 14),
            band,
        });
        for &track_num in tracks {
            work.stage_song(NewSong {
                title: format!("track {track_num}"),
                track_num,
                length_seconds: 100.5,
                album,
            });
        }
        work
    }

    #[test]
    fn commit_links_children_to_generated_ids() {
        let mut storage = storage();
        let summary = storage.commit(staged_band("Alice in Chains", &[3, 1, 2])).unwrap();
        assert_eq!(summary, CommitSummary { bands: 1, albums: 1, songs: 3 });

        let band = storage.band_by_name("Alice in Chains").unwrap().unwrap();
        let albums = storage.albums_of_band(band.id).unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].band_id, band.id);
        assert_eq!(albums[0].release_date, NaiveDate::from_ymd_opt(1995, 3, 14));

        let order: Vec<u32> = storage
            .songs_of_album(albums[0].id)
            .unwrap()
            .iter()
            .map(|s| s.track_num)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_band_name_rolls_back_whole_commit() {
        let mut storage = storage();
        storage.commit(staged_band("Mudhoney", &[1])).unwrap();
        let before = storage.counts().unwrap();

        let mut work = staged_band("Melvins", &[1, 2]);
        work.stage_band(NewBand { name: "Mudhoney".into() });
        let err = storage.commit(work).unwrap_err();

        assert!(err.is_storage());
        assert_eq!(storage.counts().unwrap(), before);
        assert!(storage.band_by_name("Melvins").unwrap().is_none());
    }

    #[test]
    fn deleting_a_band_cascades() {
        let mut storage = storage();
        storage.commit(staged_band("Screaming Trees", &[1, 2])).unwrap();
        storage.commit(staged_band("Tad", &[1])).unwrap();

        let band = storage.band_by_name("Screaming Trees").unwrap().unwrap();
        assert!(storage.delete_band(band.id).unwrap());

        assert_eq!(
            storage.counts().unwrap(),
            StoreCounts { bands: 1, albums: 1, songs: 1 }
        );
    }

    #[test]
    fn orphan_album_is_rejected_by_foreign_key() {
        let storage = storage();
        let err = storage
            .connection()
            .execute(
                "INSERT INTO albums (title, band_id) VALUES ('Orphan', 42);",
                [],
            )
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY"));
    }

    #[test]
    fn handle_from_another_unit_is_rejected_before_writing() {
        let mut storage = storage();
        let mut other = UnitOfWork::new();
        other.stage_band(NewBand { name: "A".into() });
        let foreign = other.stage_band(NewBand { name: "B".into() });

        let mut work = UnitOfWork::new();
        work.stage_band(NewBand { name: "C".into() });
        work.stage_album(NewAlbum {
            title: "Misfiled".into(),
            release_date: None,
            band: foreign,
        });

        let err = storage.commit(work).unwrap_err();
        assert!(matches!(err, Error::StagingError(_)));
        assert!(err.is_storage());
        assert_eq!(storage.counts().unwrap(), StoreCounts::default());
    }

    #[test]
    fn in_range_foreign_album_handle_is_rejected() {
        let mut storage = storage();
        let mut other = UnitOfWork::new();
        let foreign_band = other.stage_band(NewBand { name: "L7".into() });
        let foreign_album = other.stage_album(NewAlbum {
            title: "Bricks Are Heavy".into(),
            release_date: None,
            band: foreign_band,
        });

        // index 0 exists in both units
        let mut work = staged_band("Babes in Toyland", &[1]);
        work.stage_song(NewSong {
            title: "Bruise Violet".into(),
            track_num: 2,
            length_seconds: 120.0,
            album: foreign_album,
        });

        assert!(matches!(storage.commit(work), Err(Error::StagingError(_))));
        assert!(storage.band_by_name("Babes in Toyland").unwrap().is_none());
    }

    #[test]
    fn echo_keeps_storage_usable() {
        let mut storage = storage();
        storage.echo(true);
        storage.commit(staged_band("Green River", &[1, 2])).unwrap();
        storage.echo(false);

        let band = storage.band_by_name("Green River").unwrap().unwrap();
        let albums = storage.albums_of_band(band.id).unwrap();
        assert_eq!(storage.songs_of_album(albums[0].id).unwrap().len(), 2);
    }

    #[test]
    fn empty_commit_writes_nothing() {
        let mut storage = storage();
        let summary = storage.commit(UnitOfWork::new()).unwrap();
        assert_eq!(summary, CommitSummary::default());
        assert_eq!(storage.counts().unwrap(), StoreCounts::default());
    }
}
