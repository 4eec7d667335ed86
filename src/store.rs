//! Persistence for trigger registrations.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinearError, Result};
use crate::trigger::WebhookStore;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub webhook_id: String,
}

/// Registrations held for the life of the process.
#[derive(Default, Debug)]
pub struct MemoryStore {
    records: HashMap<String, Registration>,
}

impl WebhookStore for MemoryStore {
    fn webhook_id(&self, key: &str) -> Option<String> {
        self.records.get(key).map(|r| r.webhook_id.clone())
    }

    fn set_webhook_id(&mut self, key: &str, webhook_id: &str) -> Result<()> {
        self.records.insert(
            key.to_string(),
            Registration {
                webhook_id: webhook_id.to_string(),
            },
        );
        Ok(())
    }

    fn clear_webhook_id(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}

/// Registrations in a JSON file, `{ "<key>": { "webhookId": "..." } }`,
/// rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: BTreeMap<String, Registration>,
}

impl FileStore {
    /// Load `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| LinearError::StoreParse {
                path: path.clone(),
                source: e,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let write_error = |e| LinearError::StoreWrite {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let contents = serde_json::to_string_pretty(&self.records).map_err(|e| {
            LinearError::StoreParse {
                path: self.path.clone(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, contents).map_err(write_error)
    }
}

impl WebhookStore for FileStore {
    fn webhook_id(&self, key: &str) -> Option<String> {
        self.records.get(key).map(|r| r.webhook_id.clone())
    }

    fn set_webhook_id(&mut self, key: &str, webhook_id: &str) -> Result<()> {
        self.records.insert(
            key.to_string(),
            Registration {
                webhook_id: webhook_id.to_string(),
            },
        );
        self.save()
    }

    fn clear_webhook_id(&mut self, key: &str) -> Result<()> {
        if self.records.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}
