use serde::{Deserialize, Serialize};

/// `GET /artists/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArtistProfile {
    /// Display name
    pub name: String,
}

/// Artist credited on an album summary
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArtistRef {
    /// Display name
    pub name: String,
}

/// One item of `GET /artists/{id}/albums`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlbumSummary {
    /// Every credited artist
    pub artists: Vec<ArtistRef>,
    /// Detail link of the full album record
    pub href: Option<String>,
}

impl AlbumSummary {
    /// Releases credited to more than one artist
    pub fn is_collaboration(&self) -> bool {
        self.artists.len() > 1
    }
}

/// `GET /artists/{id}/albums`, first page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlbumPage {
    /// Album summaries
    pub items: Vec<AlbumSummary>,
}

/// How much of `release_date` the catalog knows
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    /// `YYYY`
    Year,
    /// `YYYY-MM`
    Month,
    /// `YYYY-MM-DD`
    Day,
}

/// One track of an album record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackRecord {
    /// Display name
    pub name: String,
    /// Position on its disc, starting at 1
    pub track_number: u32,
    /// Length in milliseconds
    pub duration_ms: u64,
}

impl TrackRecord {
    /// Duration in seconds
    pub fn length_seconds(&self) -> f64 {
        // durations are far below 2^52 ms
        #[allow(clippy::cast_precision_loss)]
        let ms = self.duration_ms as f64;
        ms / 1000.0
    }
}

/// Embedded track list of an album record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackPage {
    /// Tracks in catalog order
    pub items: Vec<TrackRecord>,
}

/// Full album record, fetched through an album summary's `href`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlbumRecord {
    /// Album title
    pub name: String,
    /// Only as precise as `release_date_precision`
    pub release_date: String,
    /// Precision of `release_date`
    pub release_date_precision: DatePrecision,
    /// Embedded track list
    pub tracks: TrackPage,
}
