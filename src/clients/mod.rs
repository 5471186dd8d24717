/// Catalog API seam used by the loader
pub mod catalog;
/// Records returned by the catalog API
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Local storage using `SQLite`
pub mod local_storage;
/// Spotify catalog client
pub mod spotify;

pub use catalog::Catalog;
pub use local_storage::LocalStorage;
pub use spotify::SpotifyClient;
