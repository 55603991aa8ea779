//! Stable per-installation device identity.
//!
//! Every event is attributed to the device that recorded it. The id must
//! survive restarts but is not secret, so it lives in a small JSON file
//! next to the store.

use crate::error::CoreResult;
use crate::types::DeviceId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of this installation's device id.
pub trait DeviceIdentity: Send + Sync {
    /// Returns the stable device id, creating one on first use.
    fn device_uuid(&self) -> CoreResult<DeviceId>;

    /// Discards the current identity and mints a fresh one.
    ///
    /// Existing events keep their original attribution; only events
    /// recorded after the reset carry the new id.
    fn reset_identity(&self) -> CoreResult<DeviceId>;
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityFile {
    device_id: DeviceId,
}

/// File-backed identity, one JSON file per installation.
///
/// A missing or unreadable file is not an error: the identity is
/// regenerated and persisted, and the old attribution survives only in
/// already-recorded events.
#[derive(Debug)]
pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    /// Creates an identity backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Option<DeviceId> {
        let bytes = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice::<IdentityFile>(&bytes) {
            Ok(file) => Some(file.device_id),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "device identity file corrupt, regenerating");
                None
            }
        }
    }

    fn persist(&self, device_id: DeviceId) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(&IdentityFile { device_id })?;

        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// The file this identity is stored in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceIdentity for FileIdentity {
    fn device_uuid(&self) -> CoreResult<DeviceId> {
        if let Some(existing) = self.load() {
            return Ok(existing);
        }
        let fresh = DeviceId::new();
        self.persist(fresh)?;
        tracing::debug!(device = %fresh, "minted new device identity");
        Ok(fresh)
    }

    fn reset_identity(&self) -> CoreResult<DeviceId> {
        let fresh = DeviceId::new();
        self.persist(fresh)?;
        Ok(fresh)
    }
}

/// Identity test double that always returns the same id.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    device_id: DeviceId,
}

impl FixedIdentity {
    /// Creates an identity that always reports `device_id`.
    pub fn new(device_id: DeviceId) -> Self {
        Self { device_id }
    }
}

impl DeviceIdentity for FixedIdentity {
    fn device_uuid(&self) -> CoreResult<DeviceId> {
        Ok(self.device_id)
    }

    fn reset_identity(&self) -> CoreResult<DeviceId> {
        Ok(self.device_id)
    }
}
