use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable that takes precedence over the stored API key
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

const TMDB_API_KEY: &str = "tmdb_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_tmdb_api_key(&self) -> Option<&String> {
        self.get(TMDB_API_KEY)
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set(TMDB_API_KEY.to_string(), key.trim().to_string());
    }

    pub fn remove_tmdb_api_key(&mut self) {
        self.remove(TMDB_API_KEY);
    }

    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}

fn usable_key(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "YOUR_API_KEY" {
        None
    } else {
        Some(value.to_string())
    }
}

/// API key from `TMDB_API_KEY`, falling back to the credential store
pub fn resolve_tmdb_api_key(store: &CredentialStore) -> Option<String> {
    std::env::var(TMDB_API_KEY_ENV)
        .ok()
        .and_then(|v| usable_key(&v))
        .or_else(|| store.get_tmdb_api_key().and_then(|v| usable_key(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_tmdb_api_key("  abc123  ".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_tmdb_api_key(), Some(&"abc123".to_string()));
    }

    #[test]
    fn test_credential_store_remove() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set("key1".to_string(), "value1".to_string());
        store.set_tmdb_api_key("value2".to_string());

        store.remove("key1");
        assert_eq!(store.get("key1"), None);
        store.remove_tmdb_api_key();
        assert_eq!(store.get_tmdb_api_key(), None);
        assert!(store.get_all_keys().is_empty());
    }

    #[test]
    fn test_placeholder_key_is_not_usable() {
        assert_eq!(usable_key("YOUR_API_KEY"), None);
        assert_eq!(usable_key("   "), None);
        assert_eq!(usable_key(" k "), Some("k".to_string()));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert!(store.get_tmdb_api_key().is_none());
    }
}
