pub mod ffmpeg;
pub mod shnsplit;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use log::{debug, error};
use crate::errors::ConverterError;

/// options for the lossy audio encode
#[derive(Debug, Clone)]
pub struct TranscodeOptions {
    /// ffmpeg audio encoder name
    pub output_codec: String,
    /// constant output bitrate in kbps
    pub bitrate_kbps: u32,
    /// copy every tag of the source into the destination
    pub preserve_metadata: bool,
    /// ID3v2 minor version written to the destination
    pub id3v2_version: u8,
    /// also append an ID3v1 tag for players that only read v1
    pub write_id3v1: bool,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            output_codec: "libmp3lame".to_string(),
            bitrate_kbps: 320,
            preserve_metadata: true,
            id3v2_version: 3,
            write_id3v1: true,
        }
    }
}

/// options for the artwork re-encode
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// ffmpeg `-q:v` scale, 2 is near the top of the jpeg quality range
    pub quality: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self { quality: 2 }
    }
}

/// encodes one lossless source file into the target lossy format
pub trait AudioEncoder {
    fn encode_audio(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError>;
}

/// re-encodes one piece of artwork into the target image format
pub trait ImageEncoder {
    fn encode_image(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError>;
}

/// cuts a solid audio file into per-track files following a cue sheet
pub trait CueSplitter {
    /// returns the produced files in track order
    fn split(
        &self,
        cue_path: &Path,
        audio_path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConverterError>;
}

/// runs an external tool to completion, turning launch failures and non-zero exits into errors
pub(crate) fn run_tool(tool: &str, command: &mut Command) -> Result<Output, ConverterError> {
    debug!("Executing {}: {:?}", tool, command);

    let output = command.output().map_err(|e| ConverterError::ToolLaunch {
        tool: tool.to_string(),
        source: e,
    })?;

    if output.status.success() {
        debug!("{} stdout:\n{}", tool, String::from_utf8_lossy(&output.stdout));
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("{} stderr:\n{}", tool, stderr);
        Err(ConverterError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.code(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_320_cbr_mp3_with_tags() {
        let options = TranscodeOptions::default();
        assert_eq!(options.output_codec, "libmp3lame");
        assert_eq!(options.bitrate_kbps, 320);
        assert!(options.preserve_metadata);
        assert_eq!(options.id3v2_version, 3);
        assert!(options.write_id3v1);
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let mut command = Command::new("/nonexistent/definitely-not-a-tool");
        assert!(matches!(
            run_tool("ghost", &mut command),
            Err(ConverterError::ToolLaunch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_tool_failure() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo broken >&2; exit 3");
        match run_tool("sh", &mut command) {
            Err(ConverterError::ToolFailed { status, stderr, .. }) => {
                assert_eq!(status, Some(3));
                assert!(stderr.contains("broken"));
            }
            other => panic!("unexpected result: {:?}", other.map(|o| o.status)),
        }
    }
}
