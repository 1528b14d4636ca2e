// Test support shared by the unit tests: in-process stand-ins for ffmpeg and shnsplit

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use crate::errors::ConverterError;
use crate::tools::{AudioEncoder, CueSplitter, ImageEncoder};

pub const TWO_TRACK_CUE: &str = r#"PERFORMER "Artist"
TITLE "Album"
FILE "album.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Intro"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Main/Theme"
    INDEX 01 02:10:00
"#;

/// writes `contents` to `path`, creating parent directories
pub fn write(path: &Path, contents: impl AsRef<[u8]>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Encoders copy their input byte for byte and fail on inputs starting with `FAIL`.
/// The splitter writes a fixed number of tracks into the directory it is given.
pub struct FakeTools {
    tracks: usize,
    fail_split: bool,
    encoded: RefCell<Vec<PathBuf>>,
    split_calls: Cell<usize>,
    last_split_dir: RefCell<Option<PathBuf>>,
}

impl FakeTools {
    pub fn new(tracks: usize) -> Self {
        Self {
            tracks,
            fail_split: false,
            encoded: RefCell::new(Vec::new()),
            split_calls: Cell::new(0),
            last_split_dir: RefCell::new(None),
        }
    }

    pub fn failing_split() -> Self {
        Self { fail_split: true, ..Self::new(0) }
    }

    /// inputs handed to either encoder, in call order
    pub fn encoded(&self) -> Vec<PathBuf> {
        self.encoded.borrow().clone()
    }

    pub fn split_calls(&self) -> usize {
        self.split_calls.get()
    }

    pub fn last_split_dir(&self) -> Option<PathBuf> {
        self.last_split_dir.borrow().clone()
    }

    fn fake_encode(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        self.encoded.borrow_mut().push(input_path.to_path_buf());
        let bytes = fs::read(input_path)?;
        if bytes.starts_with(b"FAIL") {
            return Err(ConverterError::ToolFailed {
                tool: "fake".to_string(),
                status: Some(1),
                stderr: "refusing to encode".to_string(),
            });
        }
        fs::write(output_path, bytes)?;
        Ok(())
    }
}

impl AudioEncoder for FakeTools {
    fn encode_audio(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        self.fake_encode(input_path, output_path)
    }
}

impl ImageEncoder for FakeTools {
    fn encode_image(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        self.fake_encode(input_path, output_path)
    }
}

impl CueSplitter for FakeTools {
    fn split(
        &self,
        _cue_path: &Path,
        _audio_path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConverterError> {
        self.split_calls.set(self.split_calls.get() + 1);
        *self.last_split_dir.borrow_mut() = Some(output_dir.to_path_buf());
        if self.fail_split {
            return Err(ConverterError::ToolFailed {
                tool: "fake-split".to_string(),
                status: Some(2),
                stderr: "bad cue".to_string(),
            });
        }
        (1..=self.tracks)
            .map(|n| -> Result<PathBuf, ConverterError> {
                let track = output_dir.join(format!("{:02}.wav", n));
                fs::write(&track, b"RIFF split")?;
                Ok(track)
            })
            .collect()
    }
}
