use std::fs;
use std::path::{Component, Path, PathBuf};
use log::debug;

/// path of `absolute` relative to `root`, both resolved through symlinks first
///
/// Files that do not sit under `root` (or whose relative form would climb out
/// of it) are flattened to their bare file name, so they land directly in the
/// output root instead of failing.
pub fn to_relative(absolute: &Path, root: &Path) -> PathBuf {
    let resolved_file = fs::canonicalize(absolute).unwrap_or_else(|_| absolute.to_path_buf());
    let resolved_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    match resolved_file.strip_prefix(&resolved_root) {
        Ok(rel)
            if !rel.as_os_str().is_empty()
                && rel.components().all(|c| matches!(c, Component::Normal(_))) =>
        {
            rel.to_path_buf()
        }
        _ => {
            debug!("{:?} is outside {:?}, flattening to its file name", absolute, root);
            absolute
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default()
        }
    }
}

/// re-roots `relative` under `output_root`, swapping the extension when `new_extension` is given
pub fn to_destination(relative: &Path, output_root: &Path, new_extension: Option<&str>) -> PathBuf {
    let destination = output_root.join(relative);
    match new_extension {
        Some(ext) => destination.with_extension(ext),
        None => destination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn nested_file_maps_with_new_extension() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir_all(root.join("a/b")).unwrap();
        let file = root.join("a/b/c.flac");
        fs::write(&file, b"x").unwrap();

        let rel = to_relative(&file, &root);
        assert_eq!(rel, PathBuf::from("a/b/c.flac"));
        assert_eq!(
            to_destination(&rel, Path::new("/out"), Some("mp3")),
            PathBuf::from("/out/a/b/c.mp3")
        );
    }

    #[test]
    fn copy_keeps_extension() {
        assert_eq!(
            to_destination(Path::new("scans/back.tif"), Path::new("/out"), None),
            PathBuf::from("/out/scans/back.tif")
        );
    }

    #[test]
    fn outside_file_flattens_to_basename() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        let elsewhere = tmp.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        let file = elsewhere.join("c.flac");
        fs::write(&file, b"x").unwrap();

        let rel = to_relative(&file, &root);
        assert_eq!(rel, PathBuf::from("c.flac"));
        assert_eq!(
            to_destination(&rel, Path::new("/out"), None),
            PathBuf::from("/out/c.flac")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_still_relativizes() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        fs::create_dir_all(real.join("disc1")).unwrap();
        let file = real.join("disc1/01.wav");
        fs::write(&file, b"x").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(to_relative(&link.join("disc1/01.wav"), &real), PathBuf::from("disc1/01.wav"));
        assert_eq!(to_relative(&file, &link), PathBuf::from("disc1/01.wav"));
    }
}
