use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// suffix of the output root derived when none is given
const DEFAULT_OUTPUT_SUFFIX: &str = " (mp3)";

/// whether the input root is one album or a directory of albums
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Single,
    Batch,
}

impl RunMode {
    pub fn from_flag(batch: bool) -> Self {
        if batch { RunMode::Batch } else { RunMode::Single }
    }
}

/// `<input_root> (mp3)`, next to the input
pub fn default_output_root(input_root: &Path) -> PathBuf {
    let mut name = OsString::from(input_root.as_os_str());
    name.push(DEFAULT_OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// output directory for the album at `input_root` in single mode
///
/// An explicit root gets `<artist>/<album>` appended, artist and album being
/// the names of the input's parent and of the input itself. Without one the
/// album goes to the default root as is, with no artist/album splice.
pub fn single_album_output(input_root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(root) => {
            let mut output = root.to_path_buf();
            if let Some(artist) = input_root.parent().and_then(Path::file_name) {
                output.push(artist);
            }
            if let Some(album) = input_root.file_name() {
                output.push(album);
            }
            output
        }
        None => default_output_root(input_root),
    }
}

/// root handed to the batch driver, which nests `<artist>/<album>` itself
pub fn batch_output_root(input_root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_root(input_root))
}

/// output root for `mode`
pub fn resolve_output_root(mode: RunMode, input_root: &Path, explicit: Option<&Path>) -> PathBuf {
    match mode {
        RunMode::Single => single_album_output(input_root, explicit),
        RunMode::Batch => batch_output_root(input_root, explicit),
    }
}
