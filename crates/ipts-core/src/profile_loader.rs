use crate::error::ProfileError;
use crate::profile::{FilterProfile, builtin_profiles};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct ProfileLoader {
    search_dirs: Vec<PathBuf>,
}

impl ProfileLoader {
    /// Loader searching `profiles/` and `/etc/iptscrub/profiles`
    pub fn new() -> Self {
        Self::with_dirs(vec![
            PathBuf::from("profiles"),
            PathBuf::from("/etc/iptscrub/profiles"),
        ])
    }

    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Load filter profile from YAML file
    pub fn load_profile(&self, path: &Path) -> Result<FilterProfile, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        FilterProfile::from_yaml(&content).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load all filter profiles from a directory
    pub fn load_profiles_from_dir(
        &self,
        dir: &Path,
    ) -> Result<BTreeMap<String, FilterProfile>, ProfileError> {
        let mut profiles = BTreeMap::new();

        if !dir.exists() {
            return Ok(profiles);
        }

        let read_err = |source: std::io::Error| ProfileError::Read {
            path: dir.to_path_buf(),
            source,
        };

        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("yaml")
                || path.extension().and_then(|s| s.to_str()) == Some("yml")
            {
                match self.load_profile(&path) {
                    Ok(profile) => {
                        tracing::debug!(profile = %profile.name, path = ?path, "loaded profile");
                        profiles.insert(profile.name.clone(), profile);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load profile from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(profiles)
    }

    /// Built-in profiles, overridden by any same-named profile on disk.
    /// Later search directories take precedence over earlier ones.
    pub fn load_default_profiles(&self) -> BTreeMap<String, FilterProfile> {
        let mut profiles: BTreeMap<String, FilterProfile> = builtin_profiles()
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        for dir in &self.search_dirs {
            match self.load_profiles_from_dir(dir) {
                Ok(loaded) => profiles.extend(loaded),
                Err(e) => tracing::warn!("Skipping profile directory {:?}: {}", dir, e),
            }
        }

        profiles
    }

    /// Look up a profile by name among built-in and on-disk profiles
    pub fn find(&self, name: &str) -> Result<FilterProfile, ProfileError> {
        self.load_default_profiles()
            .remove(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new()
    }
}
