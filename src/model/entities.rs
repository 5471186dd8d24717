use chrono::NaiveDate;

/// A musical artist or group
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Store-generated key
    pub id: i64,
    /// Unique across the store
    pub name: String,
}

/// A release owned by exactly one band
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    /// Store-generated key
    pub id: i64,
    /// Title as reported by the catalog
    pub title: String,
    /// Set only when the catalog reported the date with day precision
    pub release_date: Option<NaiveDate>,
    /// Owning band
    pub band_id: i64,
}

/// A track owned by exactly one album
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Store-generated key
    pub id: i64,
    /// Title as reported by the catalog
    pub title: String,
    /// Ordering key within the album
    pub track_num: u32,
    /// Duration in seconds
    pub length_seconds: f64,
    /// Owning album
    pub album_id: i64,
}
