use infer::{MatcherType, Type};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::ConverterError;

/// characters that cannot appear in a file name on at least one common filesystem
const HOSTILE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// reads beginning of file to determine type
pub fn infer_file_type(path: &Path) -> Result<Option<Type>, ConverterError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();

    reader.take(4096).read_to_end(&mut buffer)?;

    Ok(infer::get(&buffer))
}

/// rejects files whose leading bytes identify them as something other than audio
/// unknown signatures are let through, the encoder is the final judge
pub fn ensure_audio_payload(path: &Path) -> Result<(), ConverterError> {
    match infer_file_type(path)? {
        Some(kind) if !matches!(kind.matcher_type(), MatcherType::Audio | MatcherType::Video) => {
            Err(ConverterError::UnsupportedInput(format!(
                "{} looks like {} rather than audio",
                path.display(),
                kind.mime_type()
            )))
        }
        _ => Ok(()),
    }
}

/// extracts the file extension from a path as a lowercase string
pub fn get_file_extension(path: &Path) -> Result<String, ConverterError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
        .ok_or_else(|| ConverterError::Path(format!("File path has no extension: {:?}", path)))
}

/// lowercase extension, or an empty string for extensionless files
pub fn extension_or_empty(path: &Path) -> String {
    get_file_extension(path).unwrap_or_default()
}

/// replaces characters that are not allowed in file names with underscores
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if HOSTILE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(get_file_extension(Path::new("/a/B.FLAC")).unwrap(), "flac");
        assert!(get_file_extension(Path::new("/a/README")).is_err());
        assert_eq!(extension_or_empty(Path::new("/a/README")), "");
    }

    #[test]
    fn sanitize_replaces_every_hostile_char() {
        assert_eq!(sanitize_file_name("Main/Theme"), "Main_Theme");
        assert_eq!(sanitize_file_name(r#"a\b:c*d?e"f<g>h|i"#), "a_b_c_d_e_f_g_h_i");
        assert_eq!(sanitize_file_name("Plain Title"), "Plain Title");
    }

    #[test]
    fn png_payload_is_not_audio() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fake.flac");
        fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]).unwrap();
        assert!(matches!(
            ensure_audio_payload(&path),
            Err(ConverterError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn unknown_and_flac_payloads_pass() {
        let tmp = TempDir::new().unwrap();
        let unknown = tmp.path().join("unknown.wav");
        fs::write(&unknown, b"FAKE").unwrap();
        assert!(ensure_audio_payload(&unknown).is_ok());

        let flac = tmp.path().join("real.flac");
        fs::write(&flac, b"fLaC\0\0\0\x22").unwrap();
        assert!(ensure_audio_payload(&flac).is_ok());
    }
}
