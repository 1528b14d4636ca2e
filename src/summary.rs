use std::ops::AddAssign;
use log::info;

/// counters for one album run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlbumSummary {
    pub tracks_split: usize,
    pub tracks_converted: usize,
    pub tracks_skipped: usize,
    pub tracks_failed: usize,
    pub splits_failed: usize,
    pub cues_unresolved: usize,
    pub files_converted: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub images_converted: usize,
    pub images_failed: usize,
    pub files_copied: usize,
    pub files_ignored: usize,
    pub copies_failed: usize,
    /// images and copies whose destination already existed
    pub others_skipped: usize,
}

impl AlbumSummary {
    pub fn total_failed(&self) -> usize {
        self.tracks_failed + self.splits_failed + self.files_failed + self.images_failed + self.copies_failed
    }

    /// files written during this run, across every stage
    pub fn total_written(&self) -> usize {
        self.tracks_converted + self.files_converted + self.images_converted + self.files_copied
    }

    pub fn log_report(&self) {
        info!("Cue tracks: {} split, {} converted, {} already present, {} failed ({} split failure(s), {} unresolved sheet(s))",
            self.tracks_split, self.tracks_converted, self.tracks_skipped, self.tracks_failed,
            self.splits_failed, self.cues_unresolved);
        info!("Audio files: {} converted, {} already present, {} failed",
            self.files_converted, self.files_skipped, self.files_failed);
        info!("Images: {} converted, {} failed", self.images_converted, self.images_failed);
        info!("Other files: {} copied, {} ignored, {} already present, {} failed",
            self.files_copied, self.files_ignored, self.others_skipped, self.copies_failed);
    }
}

impl AddAssign for AlbumSummary {
    fn add_assign(&mut self, other: Self) {
        self.tracks_split += other.tracks_split;
        self.tracks_converted += other.tracks_converted;
        self.tracks_skipped += other.tracks_skipped;
        self.tracks_failed += other.tracks_failed;
        self.splits_failed += other.splits_failed;
        self.cues_unresolved += other.cues_unresolved;
        self.files_converted += other.files_converted;
        self.files_skipped += other.files_skipped;
        self.files_failed += other.files_failed;
        self.images_converted += other.images_converted;
        self.images_failed += other.images_failed;
        self.files_copied += other.files_copied;
        self.files_ignored += other.files_ignored;
        self.copies_failed += other.copies_failed;
        self.others_skipped += other.others_skipped;
    }
}

/// album-level outcome of a batch run plus the per-file totals of every album
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub albums_found: usize,
    pub albums_succeeded: usize,
    pub albums_failed: usize,
    pub files: AlbumSummary,
}

impl BatchSummary {
    pub fn log_report(&self) {
        info!("Albums: {} found, {} succeeded, {} failed",
            self.albums_found, self.albums_succeeded, self.albums_failed);
        self.files.log_report();
    }
}
