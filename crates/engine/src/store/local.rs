//! On-device fallback store.
//!
//! Used when no database is configured. Each entity collection serializes as
//! a JSON array under a versioned key, one file per user and collection:
//! `<root>/<user>/freights.v1.json`. A missing or empty file loads as an
//! empty collection. Dates round-trip as ISO-8601 strings via serde.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, user_id: &str, key: &str) -> ResultEngine<PathBuf> {
        // User ids come from the authenticated session, but refuse path
        // separators anyway.
        if user_id.is_empty() || user_id.contains(['/', '\\', '.']) {
            return Err(EngineError::InvalidId(format!(
                "invalid user id: {user_id}"
            )));
        }
        Ok(self.root.join(user_id).join(key))
    }

    /// Rewrites a whole collection snapshot.
    pub fn write_collection<T: Serialize>(
        &self,
        user_id: &str,
        key: &str,
        items: &[T],
    ) -> ResultEngine<()> {
        let path = self.collection_path(user_id, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(items)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a collection snapshot; missing or empty files are an empty
    /// collection, not an error.
    pub fn read_collection<T: DeserializeOwned>(
        &self,
        user_id: &str,
        key: &str,
    ) -> ResultEngine<Vec<T>> {
        let path = self.collection_path(user_id, key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Users are the subdirectories of the root.
    pub fn user_ids(&self) -> ResultEngine<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut users = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                users.push(name.to_string());
            }
        }
        users.sort();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freights::tests::freight;

    #[test]
    fn collections_round_trip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let load = freight(100_000, 10_000);

        store
            .write_collection("carol", "freights.v1.json", &[load.clone()])
            .unwrap();
        let back: Vec<crate::freights::Freight> =
            store.read_collection("carol", "freights.v1.json").unwrap();
        assert_eq!(back, vec![load]);
    }

    #[test]
    fn missing_key_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let loads: Vec<crate::freights::Freight> =
            store.read_collection("carol", "freights.v1.json").unwrap();
        assert!(loads.is_empty());
    }

    #[test]
    fn user_listing_follows_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .write_collection::<crate::freights::Freight>("bob", "freights.v1.json", &[])
            .unwrap();
        store
            .write_collection::<crate::freights::Freight>("alice", "freights.v1.json", &[])
            .unwrap();
        assert_eq!(store.user_ids().unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn hostile_user_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(
            store
                .write_collection::<crate::freights::Freight>("../up", "freights.v1.json", &[])
                .is_err()
        );
    }
}
