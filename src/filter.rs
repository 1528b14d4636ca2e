use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use log::{debug, info};
use crate::errors::ConverterError;

/// set of file extensions that are left out of the output tree
#[derive(Debug, Default, Clone)]
pub struct ExtensionFilter {
    ignored: HashSet<String>,
}

impl ExtensionFilter {
    /// loads the blacklist from a line-oriented file; a missing file yields an empty filter
    pub fn load(path: &Path) -> Result<Self, ConverterError> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No extension blacklist at {:?}, nothing will be filtered", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let filter = Self::from_reader(BufReader::new(file))?;
        info!("Loaded {} ignored extension(s) from {:?}", filter.len(), path);
        Ok(filter)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ConverterError> {
        let mut ignored = HashSet::new();
        for line in reader.lines() {
            let token: String = line?.chars().filter(|c| !c.is_whitespace()).collect();
            if token.is_empty() || token.starts_with('#') {
                continue;
            }
            let token = token.trim_start_matches('.').to_lowercase();
            debug!("Ignoring extension '{}'", token);
            ignored.insert(token);
        }
        Ok(Self { ignored })
    }

    pub fn is_ignored(&self, extension: &str) -> bool {
        let needle = extension.trim().trim_start_matches('.').to_lowercase();
        !needle.is_empty() && self.ignored.contains(&needle)
    }

    pub fn len(&self) -> usize {
        self.ignored.len()
    }
}
