use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, warn};
use walkdir::WalkDir;
use crate::errors::ConverterError;
use crate::utils::extension_or_empty;

pub const CUE_EXTENSION: &str = "cue";

/// extensions tried, in order, when a sheet's FILE entry does not point at anything
pub const FALLBACK_AUDIO_EXTENSIONS: [&str; 4] = ["flac", "wav", "ape", "m4a"];

/// a cue sheet loaded into memory
#[derive(Debug, Clone)]
pub struct CueSheet {
    pub path: PathBuf,
    text: String,
}

impl CueSheet {
    /// reads a sheet from disk; non UTF-8 bytes are replaced rather than rejected
    pub fn open(path: &Path) -> Result<Self, ConverterError> {
        let bytes = fs::read(path)
            .map_err(|e| ConverterError::CueParse(format!("cannot read {:?}: {}", path, e)))?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
        Ok(Self::from_text(path, text))
    }

    pub fn from_text(path: &Path, text: String) -> Self {
        Self { path: path.to_path_buf(), text }
    }

    /// directory holding the sheet
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// the audio file named by the first FILE line, quoted or bare
    pub fn file_reference(&self) -> Option<String> {
        self.text.lines().find_map(|line| {
            let rest = strip_keyword(line, "FILE")?;
            let reference = if let Some(quoted) = rest.strip_prefix('"') {
                quoted.split('"').next().unwrap_or_default().to_string()
            } else {
                // bare form: FILE name.wav WAVE, the trailing token is the file type
                let mut tokens: Vec<&str> = rest.split_whitespace().collect();
                if tokens.len() > 1 {
                    tokens.pop();
                }
                tokens.join(" ")
            };
            (!reference.is_empty()).then_some(reference)
        })
    }

    /// number of AUDIO tracks in the first FILE block, which is what the splitter cuts
    ///
    /// Data tracks (`TRACK 03 MODE1/2352`) and tracks of later FILE entries
    /// never come out of a split, so they are not counted.
    pub fn track_count(&self) -> usize {
        let mut files_seen = 0;
        let mut count = 0;
        for line in self.text.lines() {
            if strip_keyword(line, "FILE").is_some() {
                files_seen += 1;
                if files_seen > 1 {
                    break;
                }
            } else if let Some(rest) = strip_keyword(line, "TRACK") {
                let is_audio = rest
                    .split_whitespace()
                    .nth(1)
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("AUDIO"));
                if is_audio {
                    count += 1;
                }
            }
        }
        count
    }

    /// TITLE of the TRACK block numbered `track_number`, matching `01` and `1` alike
    pub fn track_title(&self, track_number: u32) -> Option<String> {
        let mut in_track = false;
        for line in self.text.lines() {
            if let Some(rest) = strip_keyword(line, "TRACK") {
                if in_track {
                    return None;
                }
                in_track = rest
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse::<u32>().ok())
                    == Some(track_number);
                continue;
            }
            if in_track {
                if let Some(rest) = strip_keyword(line, "TITLE") {
                    let title = match rest.strip_prefix('"') {
                        Some(quoted) => quoted.split('"').next().unwrap_or_default(),
                        None => rest,
                    }
                    .trim();
                    return (!title.is_empty()).then(|| title.to_string());
                }
            }
        }
        None
    }
}

/// returns the remainder of `line` when it starts with `keyword` (any case) followed by whitespace
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let line = line.trim_start();
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// every cue sheet below `root`, sorted so repeated scans agree
pub fn find_cue_sheets(root: &Path) -> Vec<PathBuf> {
    let mut sheets: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| extension_or_empty(p) == CUE_EXTENSION)
        .collect();
    sheets.sort();
    debug!("Found {} cue sheet(s) under {:?}", sheets.len(), root);
    sheets
}

/// locates the solid audio file a sheet describes
pub fn resolve_audio_source(sheet: &CueSheet) -> Option<PathBuf> {
    let dir = sheet.dir();

    if let Some(reference) = sheet.file_reference() {
        let beside = dir.join(&reference);
        if beside.is_file() {
            return Some(beside);
        }
        let as_given = PathBuf::from(&reference);
        if as_given.is_file() {
            return Some(as_given);
        }
        // sheets written on Windows often carry a full path with backslashes
        if let Some(base) = reference.rsplit(['\\', '/']).next() {
            let by_name = dir.join(base);
            if by_name.is_file() {
                return Some(by_name);
            }
        }
        debug!("FILE entry {:?} of {:?} does not exist, trying siblings", reference, sheet.path);
    }

    let mut siblings: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            warn!("Cannot list {:?} while resolving {:?}: {}", dir, sheet.path, e);
            return None;
        }
    };
    siblings.sort();

    FALLBACK_AUDIO_EXTENSIONS.iter().find_map(|wanted| {
        siblings
            .iter()
            .find(|p| extension_or_empty(p) == *wanted)
            .cloned()
    })
}
