use std::fs;
use std::path::{Path, PathBuf};
use log::{error, info, warn};
use crate::errors::ConverterError;
use crate::orchestrator::{AlbumContext, Converter};
use crate::summary::BatchSummary;

/// converts every immediate subdirectory of `input_root` as its own album
///
/// Albums go to `output_root/<artist>/<album>`, the artist being the name of
/// `input_root`. An album counts as succeeded only when it finished with no
/// failed file; a failing album never stops the ones after it.
pub fn run_batch(
    converter: &Converter<'_>,
    input_root: &Path,
    output_root: &Path,
) -> Result<BatchSummary, ConverterError> {
    if !input_root.is_dir() {
        return Err(ConverterError::InputMissing(input_root.to_path_buf()));
    }

    let artist_root = match input_root.file_name() {
        Some(artist) => output_root.join(artist),
        None => {
            warn!("{:?} has no name to use as artist, albums go straight into {:?}", input_root, output_root);
            output_root.to_path_buf()
        }
    };

    let albums = album_dirs(input_root, output_root)?;
    let mut summary = BatchSummary {
        albums_found: albums.len(),
        ..BatchSummary::default()
    };
    info!("Found {} album(s) in {:?}", albums.len(), input_root);

    for (position, album_dir) in albums.iter().enumerate() {
        let Some(name) = album_dir.file_name() else {
            continue;
        };
        let album = AlbumContext::new(album_dir, artist_root.join(name));
        info!("[{}/{}] Album {:?}", position + 1, albums.len(), name);

        match converter.convert_album(&album) {
            Ok(album_summary) => {
                summary.files += album_summary;
                if album_summary.total_failed() == 0 {
                    summary.albums_succeeded += 1;
                } else {
                    warn!("Album {:?} finished with {} failure(s)", name, album_summary.total_failed());
                    summary.albums_failed += 1;
                }
            }
            Err(e) => {
                error!("Album {:?} failed: {}", name, e);
                summary.albums_failed += 1;
            }
        }
    }

    summary.log_report();
    Ok(summary)
}

/// immediate subdirectories, sorted by name, minus any that hold the output tree
fn album_dirs(input_root: &Path, output_root: &Path) -> Result<Vec<PathBuf>, ConverterError> {
    let output = fs::canonicalize(output_root).unwrap_or_else(|_| output_root.to_path_buf());

    let mut dirs = Vec::new();
    for entry in fs::read_dir(input_root)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", input_root, e);
                continue;
            }
        };
        if !path.is_dir() {
            continue;
        }
        let resolved = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if output.starts_with(&resolved) {
            info!("Skipping {:?}, it holds the output tree", path);
            continue;
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}
