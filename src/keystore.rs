//! Storage for the demo wallet's private key
//!
//! The key is loaded and saved through an explicit [`KeyStore`] handed to the
//! CLI, never read from ambient global state.

use ethers::core::rand::thread_rng;
use ethers::signers::{LocalWallet, Signer};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("key store io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed key file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

pub trait KeyStore {
    fn load(&self) -> Result<Option<LocalWallet>, KeyStoreError>;
    fn save(&self, wallet: &LocalWallet) -> Result<(), KeyStoreError>;
}

#[derive(Serialize, Deserialize)]
struct KeyFile {
    private_key: String,
}

/// Key kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> KeyStoreError {
        KeyStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<LocalWallet>, KeyStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };

        let file: KeyFile = serde_json::from_str(&content)?;
        parse_private_key(&file.private_key).map(Some)
    }

    fn save(&self, wallet: &LocalWallet) -> Result<(), KeyStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let content = serde_json::to_string_pretty(&KeyFile {
            private_key: export_private_key(wallet),
        })?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| self.io_err(e))?;

        // mode only applies on creation, an existing file keeps its own
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_err(e))?;
        }

        file.write_all(content.as_bytes()).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// Process-local store, nothing touches disk
#[derive(Default)]
pub struct MemoryKeyStore {
    key: Mutex<Option<String>>,
}

impl KeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<LocalWallet>, KeyStoreError> {
        let key = self.key.lock().unwrap_or_else(|e| e.into_inner()).clone();
        key.map(|k| parse_private_key(&k)).transpose()
    }

    fn save(&self, wallet: &LocalWallet) -> Result<(), KeyStoreError> {
        *self.key.lock().unwrap_or_else(|e| e.into_inner()) = Some(export_private_key(wallet));
        Ok(())
    }
}

/// Accepts `0x` followed by 64 hex characters
pub fn parse_private_key(key: &str) -> Result<LocalWallet, KeyStoreError> {
    let key = key.trim();
    if !key.starts_with("0x") || key.len() != 66 {
        return Err(KeyStoreError::InvalidKey(
            "expected 0x followed by 64 hex characters".to_string(),
        ));
    }
    key.parse::<LocalWallet>()
        .map_err(|e| KeyStoreError::InvalidKey(e.to_string()))
}

pub fn export_private_key(wallet: &LocalWallet) -> String {
    format!("0x{}", hex::encode(wallet.signer().to_bytes()))
}

/// Load the stored wallet, or create and persist a fresh one
pub fn load_or_generate<K: KeyStore + ?Sized>(store: &K) -> Result<LocalWallet, KeyStoreError> {
    if let Some(wallet) = store.load()? {
        return Ok(wallet);
    }

    let wallet = LocalWallet::new(&mut thread_rng());
    store.save(&wallet)?;
    info!(address = ?wallet.address(), "Generated new wallet");
    Ok(wallet)
}
