use std::env;
use std::path::PathBuf;
use crate::tools::{ImageOptions, TranscodeOptions};

/// lossless source formats that are transcoded
pub const LOSSLESS_EXTENSIONS: [&str; 5] = ["flac", "wav", "ape", "m4a", "wv"];

/// extension of every transcoded audio file
pub const TARGET_AUDIO_EXTENSION: &str = "mp3";

/// artwork format that gets re-encoded instead of copied
pub const ARTWORK_EXTENSION: &str = "png";
pub const TARGET_IMAGE_EXTENSION: &str = "jpg";

/// file name of the extension blacklist looked up next to the executable
pub const DEFAULT_BLACKLIST_NAME: &str = "ignored-extensions.txt";

pub fn is_lossless(extension: &str) -> bool {
    LOSSLESS_EXTENSIONS.contains(&extension)
}

/// runtime settings resolved from the command line
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub ffmpeg_binary: PathBuf,
    pub shnsplit_binary: PathBuf,
    pub blacklist_path: PathBuf,
    pub audio: TranscodeOptions,
    pub image: ImageOptions,
}

impl ConverterConfig {
    pub fn new(ffmpeg_binary: PathBuf, shnsplit_binary: PathBuf, blacklist_path: Option<PathBuf>) -> Self {
        Self {
            ffmpeg_binary,
            shnsplit_binary,
            blacklist_path: blacklist_path.unwrap_or_else(default_blacklist_path),
            audio: TranscodeOptions::default(),
            image: ImageOptions::default(),
        }
    }
}

/// blacklist beside the running binary, or in the working directory if that cannot be determined
pub fn default_blacklist_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_BLACKLIST_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BLACKLIST_NAME))
}
