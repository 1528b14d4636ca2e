use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use log::{debug, info};
use crate::errors::ConverterError;
use crate::tools::{run_tool, CueSplitter};

/// intermediate format of split tracks, the encoder reads it back immediately
const SPLIT_FORMAT: &str = "wav";

/// cue splitter driving `shnsplit` from shntool
#[derive(Debug, Clone)]
pub struct ShnSplitter {
    binary: PathBuf,
}

impl ShnSplitter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub(crate) fn command(&self, cue_path: &Path, audio_path: &Path, output_dir: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("-q");
        command.arg("-f").arg(cue_path);
        command.arg("-o").arg(SPLIT_FORMAT);
        command.arg("-d").arg(output_dir);
        command.arg("-t").arg("%n");
        command.arg(audio_path);
        command
    }
}

/// split products in track order; shnsplit writes a leading pregap as track 00, which is not a track
pub(crate) fn collect_tracks(output_dir: &Path) -> Result<Vec<PathBuf>, ConverterError> {
    let mut tracks: Vec<PathBuf> = fs::read_dir(output_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.file_stem().and_then(|s| s.to_str()) != Some("00"))
        .collect();
    // numeric stems sort by value so a 100th split product cannot land before 99
    tracks.sort_by_key(|p| {
        let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        (stem.parse::<u32>().unwrap_or(u32::MAX), p.clone())
    });
    Ok(tracks)
}

impl CueSplitter for ShnSplitter {
    fn split(
        &self,
        cue_path: &Path,
        audio_path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConverterError> {
        info!("shnsplit: Splitting {:?} using {:?}", audio_path, cue_path);

        let mut command = self.command(cue_path, audio_path, output_dir);
        run_tool("shnsplit", &mut command)?;

        let tracks = collect_tracks(output_dir)?;
        debug!("shnsplit produced {} track(s) in {:?}", tracks.len(), output_dir);
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn command_names_cue_format_and_directory() {
        let splitter = ShnSplitter::new("shnsplit");
        let command = splitter.command(Path::new("a.cue"), Path::new("a.flac"), Path::new("/tmp/x"));
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["-q", "-f", "a.cue", "-o", "wav", "-d", "/tmp/x", "-t", "%n", "a.flac"]);
    }

    #[test]
    fn tracks_are_sorted_and_pregap_dropped() {
        let tmp = TempDir::new().unwrap();
        for name in ["10.wav", "02.wav", "00.wav", "01.wav"] {
            fs::write(tmp.path().join(name), b"RIFF").unwrap();
        }
        let tracks = collect_tracks(tmp.path()).unwrap();
        let names: Vec<_> = tracks
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["01.wav", "02.wav", "10.wav"]);
    }

    #[test]
    fn track_numbers_past_99_sort_by_value() {
        let tmp = TempDir::new().unwrap();
        for name in ["100.wav", "99.wav", "98.wav"] {
            fs::write(tmp.path().join(name), b"RIFF").unwrap();
        }
        let tracks = collect_tracks(tmp.path()).unwrap();
        let names: Vec<_> = tracks
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["98.wav", "99.wav", "100.wav"]);
    }
}
