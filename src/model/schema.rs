use log::debug;
use rusqlite::Connection;

use crate::clients::errors::{Error, Result};

/// Tables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `bands`
    Band,
    /// `albums`, children of `bands`
    Album,
    /// `songs`, children of `albums`
    Song,
}

impl Table {
    /// Parents come before children
    pub const ALL: [Table; 3] = [Table::Band, Table::Album, Table::Song];

    /// Table name in SQL
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Band => "bands",
            Table::Album => "albums",
            Table::Song => "songs",
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Band => &["id", "name"],
            Table::Album => &["id", "title", "release_date", "band_id"],
            Table::Song => &["id", "title", "track_num", "length_seconds", "album_id"],
        }
    }

    fn create_statement(self) -> String {
        match self {
            Table::Band => format!(
                "CREATE TABLE IF NOT EXISTS {band} (
                    id INTEGER PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE
                );",
                band = Table::Band.as_str()
            ),
            Table::Album => format!(
                "CREATE TABLE IF NOT EXISTS {album} (
                    id INTEGER PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    release_date DATE,
                    band_id INTEGER NOT NULL REFERENCES {band} (id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS albums_band_id_index ON {album} (band_id);",
                album = Table::Album.as_str(),
                band = Table::Band.as_str()
            ),
            Table::Song => format!(
                "CREATE TABLE IF NOT EXISTS {song} (
                    id INTEGER PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    track_num INTEGER NOT NULL CHECK (track_num >= 0),
                    length_seconds REAL NOT NULL,
                    album_id INTEGER NOT NULL REFERENCES {album} (id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS songs_album_track_index ON {song} (album_id, track_num);",
                song = Table::Song.as_str(),
                album = Table::Album.as_str()
            ),
        }
    }
}

fn existing_columns(conn: &Connection, table: Table) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.as_str()))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Create the bands, albums and songs tables if they are missing.
///
/// Safe to call on an initialized store. A pre-existing table whose columns
/// differ from the expected layout yields [`Error::SchemaConflict`].
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for table in Table::ALL {
        conn.execute_batch(&table.create_statement())?;

        let found = existing_columns(conn, table)?;
        let expected = table.columns();
        if found.len() != expected.len() || found.iter().zip(expected).any(|(f, e)| f != e) {
            return Err(Error::SchemaConflict(format!(
                "table {} has columns {found:?}, expected {expected:?}",
                table.as_str()
            )));
        }
    }

    debug!("Schema initialized");
    Ok(())
}
