use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use log::{info, warn};
use crate::errors::ConverterError;
use crate::tools::{run_tool, AudioEncoder, ImageEncoder, ImageOptions, TranscodeOptions};

/// audio and artwork encoder driving the ffmpeg CLI
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    audio: TranscodeOptions,
    image: ImageOptions,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>, audio: TranscodeOptions, image: ImageOptions) -> Self {
        Self {
            binary: binary.into(),
            audio,
            image,
        }
    }

    fn base_command(&self, input_path: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("-hide_banner").arg("-nostdin");
        command.arg("-i").arg(input_path);
        command
    }

    pub(crate) fn audio_command(&self, input_path: &Path, output_path: &Path) -> Command {
        let options = &self.audio;
        let mut command = self.base_command(input_path);

        // embedded cover art would otherwise be carried along as a video stream
        command.arg("-map").arg("0:a");

        if options.preserve_metadata {
            command.arg("-map_metadata").arg("0");
        }

        command.arg("-c:a").arg(&options.output_codec);
        command.arg("-b:a").arg(format!("{}k", options.bitrate_kbps));
        command.arg("-id3v2_version").arg(options.id3v2_version.to_string());
        if options.write_id3v1 {
            command.arg("-write_id3v1").arg("1");
        }

        command.arg("-y");
        command.arg(output_path);
        command
    }

    pub(crate) fn image_command(&self, input_path: &Path, output_path: &Path) -> Command {
        let mut command = self.base_command(input_path);
        command.arg("-frames:v").arg("1");
        command.arg("-q:v").arg(self.image.quality.to_string());
        command.arg("-y");
        command.arg(output_path);
        command
    }

    fn execute(&self, mut command: Command, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        match run_tool("ffmpeg", &mut command) {
            Ok(_) => {
                info!("FFmpeg successfully converted {:?} to {:?}", input_path, output_path);
                Ok(())
            }
            Err(e) => {
                // a half-written file would be taken for finished work on the next run
                if output_path.exists() {
                    if let Err(remove_err) = fs::remove_file(output_path) {
                        warn!("Could not remove partial output {:?}: {}", output_path, remove_err);
                    }
                }
                Err(e)
            }
        }
    }
}

impl AudioEncoder for FfmpegEncoder {
    fn encode_audio(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        info!("FFmpeg encoder: Converting {:?} to {:?} with options: {:?}", input_path, output_path, self.audio);
        let command = self.audio_command(input_path, output_path);
        self.execute(command, input_path, output_path)
    }
}

impl ImageEncoder for FfmpegEncoder {
    fn encode_image(&self, input_path: &Path, output_path: &Path) -> Result<(), ConverterError> {
        info!("FFmpeg encoder: Converting image {:?} to {:?}", input_path, output_path);
        let command = self.image_command(input_path, output_path);
        self.execute(command, input_path, output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(OsStr::to_string_lossy)
            .map(|s| s.into_owned())
            .collect()
    }

    fn encoder() -> FfmpegEncoder {
        FfmpegEncoder::new("ffmpeg", TranscodeOptions::default(), ImageOptions::default())
    }

    #[test]
    fn audio_command_carries_bitrate_codec_and_tags() {
        let command = encoder().audio_command(Path::new("in.flac"), Path::new("out.mp3"));
        assert_eq!(command.get_program(), "ffmpeg");
        assert_eq!(
            args(&command),
            [
                "-hide_banner", "-nostdin", "-i", "in.flac", "-map", "0:a", "-map_metadata", "0",
                "-c:a", "libmp3lame", "-b:a", "320k", "-id3v2_version", "3", "-write_id3v1", "1",
                "-y", "out.mp3",
            ]
        );
    }

    #[test]
    fn metadata_flags_follow_options() {
        let options = TranscodeOptions {
            preserve_metadata: false,
            write_id3v1: false,
            ..TranscodeOptions::default()
        };
        let encoder = FfmpegEncoder::new("/opt/ffmpeg", options, ImageOptions::default());
        let args = args(&encoder.audio_command(Path::new("a.wav"), Path::new("a.mp3")));
        assert!(!args.iter().any(|a| a == "-map_metadata"));
        assert!(!args.iter().any(|a| a == "-write_id3v1"));
    }

    #[test]
    fn image_command_writes_single_high_quality_frame() {
        let command = encoder().image_command(Path::new("cover.png"), Path::new("cover.jpg"));
        assert_eq!(
            args(&command),
            ["-hide_banner", "-nostdin", "-i", "cover.png", "-frames:v", "1", "-q:v", "2", "-y", "cover.jpg"]
        );
    }

    #[test]
    fn launch_failure_leaves_no_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.mp3");
        std::fs::write(&out, b"partial").unwrap();
        let encoder = FfmpegEncoder::new(
            tmp.path().join("no-such-ffmpeg"),
            TranscodeOptions::default(),
            ImageOptions::default(),
        );
        assert!(encoder.encode_audio(Path::new("in.flac"), &out).is_err());
        assert!(!out.exists());
    }
}
