use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};
use walkdir::WalkDir;
use crate::config::{self, ARTWORK_EXTENSION, TARGET_AUDIO_EXTENSION, TARGET_IMAGE_EXTENSION};
use crate::cue::{self, CueSheet};
use crate::errors::ConverterError;
use crate::filter::ExtensionFilter;
use crate::paths;
use crate::summary::AlbumSummary;
use crate::tools::{AudioEncoder, CueSplitter, ImageEncoder};
use crate::utils::{self, extension_or_empty, sanitize_file_name};

/// input and output roots of one album, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumContext {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl AlbumContext {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }
}

/// runs the per-album pipeline against a set of external tools
pub struct Converter<'a> {
    audio: &'a dyn AudioEncoder,
    image: &'a dyn ImageEncoder,
    splitter: &'a dyn CueSplitter,
    filter: &'a ExtensionFilter,
}

impl<'a> Converter<'a> {
    pub fn new(
        audio: &'a dyn AudioEncoder,
        image: &'a dyn ImageEncoder,
        splitter: &'a dyn CueSplitter,
        filter: &'a ExtensionFilter,
    ) -> Self {
        Self { audio, image, splitter, filter }
    }

    /// converts one album: cue sheets first, then loose audio files, then everything else
    ///
    /// Only a missing input root or an output root that cannot be created is
    /// returned as an error; every per-file problem ends up in the summary.
    pub fn convert_album(&self, album: &AlbumContext) -> Result<AlbumSummary, ConverterError> {
        if !album.input_root.is_dir() {
            return Err(ConverterError::InputMissing(album.input_root.clone()));
        }
        fs::create_dir_all(&album.output_root).map_err(|e| ConverterError::OutputCreate {
            path: album.output_root.clone(),
            source: e,
        })?;

        info!("Converting {:?} into {:?}", album.input_root, album.output_root);
        let mut summary = AlbumSummary::default();

        let nested = nested_output(album);
        let consumed = self.convert_cue_sheets(album, nested.as_deref(), &mut summary);

        let (audio_files, sidecars): (Vec<PathBuf>, Vec<PathBuf>) = album_files(album, nested.as_deref())
            .into_iter()
            .partition(|p| config::is_lossless(&extension_or_empty(p)));

        self.convert_audio_files(album, &audio_files, &consumed, &mut summary);
        self.dispose_sidecars(album, &sidecars, &mut summary);

        summary.log_report();
        Ok(summary)
    }

    /// splits and encodes every cue sheet, returning the solid files they consumed
    fn convert_cue_sheets(
        &self,
        album: &AlbumContext,
        nested: Option<&Path>,
        summary: &mut AlbumSummary,
    ) -> HashSet<PathBuf> {
        let mut consumed = HashSet::new();

        for cue_path in cue::find_cue_sheets(&album.input_root) {
            if nested.is_some_and(|dir| cue_path.starts_with(dir)) {
                continue;
            }
            let sheet = match CueSheet::open(&cue_path) {
                Ok(sheet) => sheet,
                Err(e) => {
                    warn!("Skipping cue sheet: {}", e);
                    summary.cues_unresolved += 1;
                    continue;
                }
            };

            let Some(source) = cue::resolve_audio_source(&sheet) else {
                warn!("No audio file found for cue sheet {:?}, skipping it", cue_path);
                summary.cues_unresolved += 1;
                continue;
            };
            info!("Cue sheet {:?} describes {:?}", cue_path, source);
            consumed.insert(canonical(&source));

            let relative_dir = paths::to_relative(&cue_path, &album.input_root)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let destination_dir = paths::to_destination(&relative_dir, &album.output_root, None);

            let expected = sheet.track_count();
            if expected > 0
                && (1..=expected).all(|n| cue_track_destination(&sheet, &destination_dir, n).exists())
            {
                info!("All {} tracks of {:?} already exist, not splitting", expected, cue_path);
                summary.tracks_skipped += expected;
                continue;
            }

            self.split_and_encode(&sheet, &source, &destination_dir, summary);
        }

        consumed
    }

    fn split_and_encode(
        &self,
        sheet: &CueSheet,
        source: &Path,
        destination_dir: &Path,
        summary: &mut AlbumSummary,
    ) {
        // removed on drop, so the split files never outlive this sheet
        let scratch = match tempfile::Builder::new().prefix("albumconv-split-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Cannot create a scratch directory for {:?}: {}", sheet.path, e);
                summary.splits_failed += 1;
                return;
            }
        };

        match self.splitter.split(&sheet.path, source, scratch.path()) {
            Ok(tracks) => {
                if tracks.is_empty() {
                    warn!("Splitting {:?} produced no tracks", sheet.path);
                }
                summary.tracks_split += tracks.len();
                for (index, track) in tracks.iter().enumerate() {
                    let destination = cue_track_destination(sheet, destination_dir, index + 1);
                    if destination.exists() {
                        info!("{:?} already exists, skipping", destination);
                        summary.tracks_skipped += 1;
                        continue;
                    }
                    if self.encode_audio_to(track, &destination) {
                        summary.tracks_converted += 1;
                    } else {
                        summary.tracks_failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!("Failed to split {:?}: {}", sheet.path, e);
                summary.splits_failed += 1;
            }
        }

        if let Err(e) = scratch.close() {
            warn!("Could not remove scratch directory for {:?}: {}", sheet.path, e);
        }
    }

    fn convert_audio_files(
        &self,
        album: &AlbumContext,
        files: &[PathBuf],
        consumed: &HashSet<PathBuf>,
        summary: &mut AlbumSummary,
    ) {
        for file in files {
            if consumed.contains(&canonical(file)) {
                debug!("{:?} was converted through its cue sheet", file);
                continue;
            }

            let relative = paths::to_relative(file, &album.input_root);
            let destination = paths::to_destination(&relative, &album.output_root, Some(TARGET_AUDIO_EXTENSION));
            if destination.exists() {
                info!("{:?} already exists, skipping", destination);
                summary.files_skipped += 1;
                continue;
            }

            match utils::ensure_audio_payload(file) {
                Ok(()) => {}
                Err(ConverterError::UnsupportedInput(reason)) => {
                    warn!("Not converting: {}", reason);
                    continue;
                }
                Err(e) => {
                    error!("Cannot read {:?}: {}", file, e);
                    summary.files_failed += 1;
                    continue;
                }
            }

            if self.encode_audio_to(file, &destination) {
                summary.files_converted += 1;
            } else {
                summary.files_failed += 1;
            }
        }
    }

    fn dispose_sidecars(&self, album: &AlbumContext, files: &[PathBuf], summary: &mut AlbumSummary) {
        for file in files {
            let extension = extension_or_empty(file);
            if self.filter.is_ignored(&extension) {
                debug!("Ignoring {:?}", file);
                summary.files_ignored += 1;
                continue;
            }

            let relative = paths::to_relative(file, &album.input_root);
            if extension == ARTWORK_EXTENSION {
                let destination = paths::to_destination(&relative, &album.output_root, Some(TARGET_IMAGE_EXTENSION));
                if destination.exists() {
                    info!("{:?} already exists, skipping", destination);
                    summary.others_skipped += 1;
                } else if self.encode_image_to(file, &destination) {
                    summary.images_converted += 1;
                } else {
                    summary.images_failed += 1;
                }
            } else {
                let destination = paths::to_destination(&relative, &album.output_root, None);
                if destination.exists() {
                    info!("{:?} already exists, skipping", destination);
                    summary.others_skipped += 1;
                } else if copy_to(file, &destination) {
                    summary.files_copied += 1;
                } else {
                    summary.copies_failed += 1;
                }
            }
        }
    }

    fn encode_audio_to(&self, source: &Path, destination: &Path) -> bool {
        info!("Converting {:?} -> {:?}", source, destination);
        let result = ensure_parent(destination).and_then(|()| self.audio.encode_audio(source, destination));
        report(result, source)
    }

    fn encode_image_to(&self, source: &Path, destination: &Path) -> bool {
        info!("Converting image {:?} -> {:?}", source, destination);
        let result = ensure_parent(destination).and_then(|()| self.image.encode_image(source, destination));
        report(result, source)
    }
}

fn copy_to(source: &Path, destination: &Path) -> bool {
    info!("Copying {:?} -> {:?}", source, destination);
    let result = ensure_parent(destination)
        .and_then(|()| fs::copy(source, destination).map(|_| ()).map_err(ConverterError::from));
    if result.is_err() {
        discard_partial(destination);
    }
    report(result, source)
}

/// a truncated destination would be taken for finished work on the next run
fn discard_partial(destination: &Path) {
    if destination.exists() {
        if let Err(e) = fs::remove_file(destination) {
            warn!("Could not remove partial output {:?}: {}", destination, e);
        }
    }
}

fn report(result: Result<(), ConverterError>, source: &Path) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Failed on {:?}: {}", source, e);
            false
        }
    }
}

fn ensure_parent(destination: &Path) -> Result<(), ConverterError> {
    match destination.parent() {
        Some(dir) => fs::create_dir_all(dir).map_err(|e| ConverterError::OutputCreate {
            path: dir.to_path_buf(),
            source: e,
        }),
        None => Ok(()),
    }
}

/// `NN - Title.mp3` for the track at 1-based `position` in split order
fn cue_track_destination(sheet: &CueSheet, destination_dir: &Path, position: usize) -> PathBuf {
    let title = u32::try_from(position)
        .ok()
        .and_then(|n| sheet.track_title(n))
        .map(|t| sanitize_file_name(&t))
        .unwrap_or_else(|| format!("Track {:02}", position));
    destination_dir.join(format!("{:02} - {}.{}", position, title, TARGET_AUDIO_EXTENSION))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// the output root as seen from inside the input tree, when the user nested one in the other
fn nested_output(album: &AlbumContext) -> Option<PathBuf> {
    let input = canonical(&album.input_root);
    let output = canonical(&album.output_root);
    match output.strip_prefix(&input) {
        Ok(rel) if !rel.as_os_str().is_empty() => Some(album.input_root.join(rel)),
        _ => None,
    }
}

/// every file of the album, sorted, leaving out the nested output tree
fn album_files(album: &AlbumContext, nested: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(&album.input_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| nested != Some(e.path()))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}
