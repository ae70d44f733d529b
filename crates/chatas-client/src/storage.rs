//! Persisted session snapshot.
//!
//! The logged-in [`User`] is kept under a single key
//! ([`SESSION_STORAGE_KEY`]) in a small JSON document. Absence of the key
//! means "logged out". Credentials are never written.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use chatas_shared::constants::SESSION_STORAGE_KEY;
use chatas_shared::User;

use crate::error::Result;

/// Where the session snapshot lives between runs.
pub trait SessionStore {
    /// The saved user, `Ok(None)` when nothing is saved. Malformed data is
    /// reported as an error; the session decides what to do with it.
    fn load(&self) -> Result<Option<User>>;
    fn save(&mut self, user: &User) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

type Document = BTreeMap<String, Value>;

fn parse_document(raw: &str) -> Result<Document> {
    Ok(serde_json::from_str(raw)?)
}

fn user_from(document: &Document) -> Result<Option<User>> {
    match document.get(SESSION_STORAGE_KEY) {
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// JSON file on disk, by default `session.json` in the platform config dir.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Document>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(parse_document(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(document)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<User>> {
        match self.read_document()? {
            Some(document) => user_from(&document),
            None => Ok(None),
        }
    }

    fn save(&mut self, user: &User) -> Result<()> {
        // other keys in the file are preserved; an unreadable file is replaced
        let mut document = self.read_document().ok().flatten().unwrap_or_default();
        document.insert(SESSION_STORAGE_KEY.to_string(), serde_json::to_value(user)?);
        self.write_document(&document)
    }

    fn clear(&mut self) -> Result<()> {
        let Some(mut document) = self.read_document().ok().flatten() else {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        };
        document.remove(SESSION_STORAGE_KEY);
        self.write_document(&document)
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// In-memory store holding the raw serialized document.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    raw: Option<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary serialized document, well-formed or not.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<User>> {
        match self.raw {
            Some(ref raw) => user_from(&parse_document(raw)?),
            None => Ok(None),
        }
    }

    fn save(&mut self, user: &User) -> Result<()> {
        let mut document = Document::new();
        document.insert(SESSION_STORAGE_KEY.to_string(), serde_json::to_value(user)?);
        self.raw = Some(serde_json::to_string(&document)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.raw = None;
        Ok(())
    }
}
