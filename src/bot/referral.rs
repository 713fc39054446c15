use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Pending referral mappings: visitor id -> referrer id.
///
/// Persisted as a JSON object so pending referrals survive a restart.
/// An entry lives until the visitor verifies; removal happens whether or
/// not the referrer notification went through.
pub struct ReferralMap {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl ReferralMap {
    /// Load the map from `path`, starting empty when the file is missing
    /// or unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!("Failed to parse referral file {}: {err}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    /// Record that `visitor` arrived through `referrer`'s link. Last write
    /// wins if the visitor restarts with a different token.
    pub fn insert(&mut self, visitor: i64, referrer: &str) {
        self.entries
            .insert(visitor.to_string(), referrer.to_string());
        self.persist();
    }

    pub fn get(&self, visitor: i64) -> Option<&str> {
        self.entries.get(&visitor.to_string()).map(String::as_str)
    }

    /// Drop the entry for `visitor` once their verification completed.
    pub fn remove(&mut self, visitor: i64) {
        if self.entries.remove(&visitor.to_string()).is_some() {
            self.persist();
        }
    }

    fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize referral map: {err}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = fs::create_dir_all(parent);
            }
        }
        if let Err(err) = fs::write(&self.path, json) {
            log::error!("Failed to write referral file {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_before_verification() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = ReferralMap::load(dir.path().join("referrals.json"));

        map.insert(7, "42");
        map.insert(7, "43");
        assert_eq!(map.get(7), Some("43"));
    }

    #[test]
    fn entries_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");

        let mut map = ReferralMap::load(&path);
        map.insert(7, "42");

        let reloaded = ReferralMap::load(&path);
        assert_eq!(reloaded.get(7), Some("42"));
    }

    #[test]
    fn remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");

        let mut map = ReferralMap::load(&path);
        map.insert(7, "42");
        map.remove(7);
        assert_eq!(map.get(7), None);

        let reloaded = ReferralMap::load(&path);
        assert_eq!(reloaded.get(7), None);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = ReferralMap::load(dir.path().join("absent.json"));
        assert_eq!(map.get(1), None);
    }
}
