/// Persisted band, album and song rows
pub mod entities;
/// Table definitions and schema initialization
pub mod schema;
/// Staged entities awaiting a single commit
pub mod unit_of_work;

pub use entities::{Album, Band, Song};
pub use schema::initialize_schema;
pub use unit_of_work::{AlbumHandle, BandHandle, NewAlbum, NewBand, NewSong, UnitOfWork};
