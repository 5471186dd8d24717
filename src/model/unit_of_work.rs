use chrono::NaiveDate;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIT: AtomicU64 = AtomicU64::new(0);

/// A staged band, valid only in the unit of work that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandHandle {
    unit: u64,
    index: usize,
}

/// A staged album, valid only in the unit of work that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumHandle {
    unit: u64,
    index: usize,
}

/// Band waiting for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewBand {
    /// Display name
    pub name: String,
}

/// Album waiting for insertion, owned by a staged band
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlbum {
    /// Title as reported by the catalog
    pub title: String,
    /// Day-precision release date, if known
    pub release_date: Option<NaiveDate>,
    /// Handle from the same unit of work
    pub band: BandHandle,
}

/// Song waiting for insertion, owned by a staged album
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    /// Title as reported by the catalog
    pub title: String,
    /// Track number within the album
    pub track_num: u32,
    /// Duration in seconds
    pub length_seconds: f64,
    /// Handle from the same unit of work
    pub album: AlbumHandle,
}

/// Contents of a unit of work handed over to the store
pub(crate) struct Staged {
    pub unit: u64,
    pub bands: Vec<NewBand>,
    pub albums: Vec<NewAlbum>,
    pub songs: Vec<NewSong>,
}

/// Entities waiting for a single commit.
///
/// Parents are referenced through the handles returned when they were staged,
/// so nothing needs a store-generated id until commit time. Every unit carries
/// its own id and rejects handles issued by another unit. Dropping a unit of
/// work without committing it discards everything it holds.
#[derive(Debug)]
pub struct UnitOfWork {
    id: u64,
    bands: Vec<NewBand>,
    albums: Vec<NewAlbum>,
    songs: Vec<NewSong>,
}

impl Default for UnitOfWork {
    fn default() -> Self {
        Self {
            id: NEXT_UNIT.fetch_add(1, Ordering::Relaxed),
            bands: Vec::new(),
            albums: Vec::new(),
            songs: Vec::new(),
        }
    }
}

impl UnitOfWork {
    /// Empty unit with a fresh id
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a band; the handle identifies it to staged albums
    pub fn stage_band(&mut self, band: NewBand) -> BandHandle {
        self.bands.push(band);
        BandHandle {
            unit: self.id,
            index: self.bands.len() - 1,
        }
    }

    /// Queue an album; the handle identifies it to staged songs
    pub fn stage_album(&mut self, album: NewAlbum) -> AlbumHandle {
        self.albums.push(album);
        AlbumHandle {
            unit: self.id,
            index: self.albums.len() - 1,
        }
    }

    /// Queue a song
    pub fn stage_song(&mut self, song: NewSong) {
        self.songs.push(song);
    }

    /// `None` for a handle issued by another unit
    pub fn band(&self, handle: BandHandle) -> Option<&NewBand> {
        handle.index_in(self.id).and_then(|i| self.bands.get(i))
    }

    /// `None` for a handle issued by another unit
    pub fn album(&self, handle: AlbumHandle) -> Option<&NewAlbum> {
        handle.index_in(self.id).and_then(|i| self.albums.get(i))
    }

    /// Staged bands in staging order
    pub fn bands(&self) -> &[NewBand] {
        &self.bands
    }

    /// Staged albums in staging order
    pub fn albums(&self) -> &[NewAlbum] {
        &self.albums
    }

    /// Staged songs in staging order
    pub fn songs(&self) -> &[NewSong] {
        &self.songs
    }

    /// Nothing staged
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty() && self.albums.is_empty() && self.songs.is_empty()
    }

    /// Hand the staged entities over for insertion, leaving this unit empty
    pub(crate) fn take(&mut self) -> Staged {
        Staged {
            unit: self.id,
            bands: std::mem::take(&mut self.bands),
            albums: std::mem::take(&mut self.albums),
            songs: std::mem::take(&mut self.songs),
        }
    }
}

impl BandHandle {
    pub(crate) fn index_in(self, unit: u64) -> Option<usize> {
        (self.unit == unit).then_some(self.index)
    }
}

impl AlbumHandle {
    pub(crate) fn index_in(self, unit: u64) -> Option<usize> {
        (self.unit == unit).then_some(self.index)
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.is_empty() {
            debug!(
                "Discarding uncommitted work: {} bands, {} albums, {} songs",
                self.bands.len(),
                self.albums.len(),
                self.songs.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_point_at_staged_entities() {
        let mut work = UnitOfWork::new();
        let first = work.stage_band(NewBand { name: "Pearl Jam".into() });
        let second = work.stage_band(NewBand { name: "Soundgarden".into() });
        let album = work.stage_album(NewAlbum {
            title: "Ten".into(),
            release_date: None,
            band: first,
        });
        work.stage_song(NewSong {
            title: "Once".into(),
            track_num: 1,
            length_seconds: 231.0,
            album,
        });

        assert_eq!(work.band(second).unwrap().name, "Soundgarden");
        assert_eq!(work.album(album).unwrap().band, first);
        assert_eq!(work.songs().len(), 1);
    }

    #[test]
    fn take_empties_the_unit() {
        let mut work = UnitOfWork::new();
        work.stage_band(NewBand { name: "Nirvana".into() });
        assert!(!work.is_empty());

        let staged = work.take();
        assert_eq!(staged.bands.len(), 1);
        assert!(staged.albums.is_empty() && staged.songs.is_empty());
        assert!(work.is_empty());
    }

    #[test]
    fn handles_do_not_cross_units() {
        let mut work = UnitOfWork::new();
        let mut other = UnitOfWork::new();
        let own = work.stage_band(NewBand { name: "Hole".into() });
        let foreign = other.stage_band(NewBand { name: "L7".into() });

        assert_eq!(own.index_in(work.id), Some(0));
        assert_eq!(foreign.index_in(work.id), None);
        assert!(work.band(foreign).is_none());
        assert_eq!(other.band(foreign).unwrap().name, "L7");
    }
}
