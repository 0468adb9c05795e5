//! Flat-file persistence for the channel list, prefix overrides and user
//! locations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::chat::{normalize_channel, normalize_user};
use crate::config::FilePaths;
use crate::error::Error;

/// A saved user location, stored as `{ "city": "..." }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LocationRecord {
    pub city: String,
}

/// File-backed store. Holds paths only; every call hits the disk.
#[derive(Clone, Debug)]
pub struct FileStore {
    channels_path: PathBuf,
    prefixes_path: PathBuf,
    locations_path: PathBuf,
}

impl FileStore {
    pub fn new(paths: &FilePaths) -> Self {
        Self {
            channels_path: paths.channels.clone(),
            prefixes_path: paths.prefixes.clone(),
            locations_path: paths.locations.clone(),
        }
    }

    /// Load the channel list. A missing file is an empty list.
    pub fn load_channels(&self) -> Result<Vec<String>, Error> {
        let Some(content) = read_optional(&self.channels_path)? else {
            return Ok(Vec::new());
        };

        let mut channels: Vec<String> = Vec::new();
        for line in content.lines() {
            let name = normalize_channel(line);
            if !name.is_empty() && !channels.contains(&name) {
                channels.push(name);
            }
        }
        Ok(channels)
    }

    pub fn save_channels(&self, channels: &[String]) -> Result<(), Error> {
        write_file(&self.channels_path, &channels.join("\n"))?;
        tracing::debug!(
            "Saved {} channels to {}",
            channels.len(),
            self.channels_path.display()
        );
        Ok(())
    }

    /// Load per-channel prefix overrides, keyed by normalized channel name.
    pub fn load_prefixes(&self) -> Result<HashMap<String, String>, Error> {
        let Some(content) = read_optional(&self.prefixes_path)? else {
            return Ok(HashMap::new());
        };
        let raw: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(raw
            .into_iter()
            .map(|(channel, prefix)| (normalize_channel(&channel), prefix))
            .filter(|(channel, prefix)| !channel.is_empty() && !prefix.is_empty())
            .collect())
    }

    pub fn save_prefixes(&self, prefixes: &HashMap<String, String>) -> Result<(), Error> {
        let sorted: BTreeMap<&String, &String> = prefixes.iter().collect();
        write_file(&self.prefixes_path, &serde_json::to_string_pretty(&sorted)?)
    }

    /// Load saved user locations, keyed by lowercase user name.
    pub fn load_locations(&self) -> Result<HashMap<String, LocationRecord>, Error> {
        let Some(content) = read_optional(&self.locations_path)? else {
            return Ok(HashMap::new());
        };
        let raw: HashMap<String, LocationRecord> = serde_json::from_str(&content)?;
        Ok(raw
            .into_iter()
            .map(|(user, record)| (normalize_user(&user), record))
            .collect())
    }

    pub fn save_locations(&self, locations: &HashMap<String, LocationRecord>) -> Result<(), Error> {
        let sorted: BTreeMap<&String, &LocationRecord> = locations.iter().collect();
        write_file(&self.locations_path, &serde_json::to_string_pretty(&sorted)?)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, Error> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Persistence(format!("read {}: {}", path.display(), e))),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Persistence(format!("create {}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, content)
        .map_err(|e| Error::Persistence(format!("write {}: {}", path.display(), e)))
}
