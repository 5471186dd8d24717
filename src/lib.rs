//! Musicdb - Populate a local music database from the Spotify catalog
//!
//! This library defines a bands/albums/songs schema backed by `SQLite` and a
//! loader that stages artists, their studio albums and track lists fetched
//! from the catalog API, committing everything at once.

/// Client modules for interacting with external services and local storage
pub mod clients;
/// Ingestion of catalog artists into the local store
pub mod loader;
/// Schema and entities of the local store
pub mod model;
