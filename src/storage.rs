use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{TaskRecord, ThemePreference};

const TASKS_KEY: &str = "tasks";
const THEME_KEY: &str = "theme";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// Durable string-keyed storage backed by one JSON file per key under a
/// single root directory. The `"tasks"` key holds the record array in
/// display order; the `"theme"` key holds the preference string.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn load_tasks(&self) -> Result<Vec<TaskRecord>, StorageError> {
        self.load_json(TASKS_KEY)
    }

    pub fn save_tasks(&self, records: &[TaskRecord]) -> Result<(), StorageError> {
        self.write_atomic(TASKS_KEY, &records)
    }

    pub fn load_theme(&self) -> Result<ThemePreference, StorageError> {
        self.load_json(THEME_KEY)
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<(), StorageError> {
        self.write_atomic(THEME_KEY, &theme)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let mut file = File::open(self.key_path(key))?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    // Write-then-rename keeps a crash or a full disk from leaving a torn
    // file behind; the previous value survives until the rename lands.
    fn write_atomic<T: Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}
