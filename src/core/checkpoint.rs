//! Resumable run state.
//!
//! After every completed step the bootstrap writes `.aro-bootstrap.state.toml`
//! so an interrupted run can pick up where it stopped instead of creating a
//! second service principal or re-binding roles. The file never holds the
//! client secret. It is removed once the variables file has been written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::azure::AccountContext;
use crate::core::config::RunConfig;
use crate::core::fs;
use crate::error::{Result, StateError};

/// Bootstrap stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Validate,
    Account,
    Providers,
    ResourceGroup,
    Identity,
    Roles,
    PlatformIdentity,
    PullSecret,
    Emit,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Validate,
        Step::Account,
        Step::Providers,
        Step::ResourceGroup,
        Step::Identity,
        Step::Roles,
        Step::PlatformIdentity,
        Step::PullSecret,
        Step::Emit,
    ];

    /// Human-readable label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Validate => "validate configuration",
            Step::Account => "read account context",
            Step::Providers => "register resource providers",
            Step::ResourceGroup => "ensure resource group",
            Step::Identity => "create service principal",
            Step::Roles => "assign roles",
            Step::PlatformIdentity => "resolve ARO resource provider identity",
            Step::PullSecret => "load pull secret",
            Step::Emit => "write variables file",
        }
    }

    /// Steps whose cloud side effects must not be repeated on resume.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Step::Identity | Step::Roles)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata section of the checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    /// [`RunConfig::fingerprint`] of the run that wrote this file.
    pub fingerprint: String,
    pub prefix: String,
    pub updated_at: String,
}

/// Service principal created by an earlier attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub display_name: String,
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// On-disk progress of a bootstrap run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub completed: Vec<Step>,
    /// Roles already bound to the service principal.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_object_id: Option<String>,
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityRecord>,
    #[serde(skip)]
    path: PathBuf,
}

impl Checkpoint {
    /// Empty checkpoint for `config`, not yet written.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            completed: Vec::new(),
            roles: Vec::new(),
            rp_object_id: None,
            meta: Meta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                fingerprint: config.fingerprint(),
                prefix: config.prefix.clone(),
                updated_at: now(),
            },
            account: None,
            identity: None,
            path: config.checkpoint_path(),
        }
    }

    /// Read the checkpoint at `path` without checking its fingerprint.
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut checkpoint: Self = toml::from_str(&contents).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        checkpoint.path = path.to_path_buf();
        Ok(Some(checkpoint))
    }

    /// Load the checkpoint for `config`, or start a new one.
    ///
    /// With `fresh`, any existing checkpoint is deleted first. A checkpoint
    /// for a different configuration that never got as far as creating a
    /// cloud object is replaced.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Mismatch` if a checkpoint that owns cloud
    /// objects exists for a different configuration, or a read/parse error.
    pub fn load_or_new(config: &RunConfig, fresh: bool) -> Result<Self> {
        let path = config.checkpoint_path();

        if fresh {
            debug!(path = %path.display(), "discarding checkpoint");
            remove_file(&path)?;
            return Ok(Self::new(config));
        }

        match Self::read(&path)? {
            Some(existing) if existing.meta.fingerprint == config.fingerprint() => {
                debug!(
                    path = %path.display(),
                    completed = existing.completed.len(),
                    "resuming from checkpoint"
                );
                Ok(existing)
            }
            Some(stale) if !stale.owns_cloud_objects() => {
                debug!(path = %path.display(), "replacing checkpoint with no cloud objects");
                Ok(Self::new(config))
            }
            Some(_) => Err(StateError::Mismatch(path).into()),
            None => Ok(Self::new(config)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_complete(&self, step: Step) -> bool {
        self.completed.contains(&step)
    }

    /// Whether an earlier attempt created a service principal or bound a
    /// role. Only then does a resume have anything to protect.
    pub fn owns_cloud_objects(&self) -> bool {
        self.identity.is_some() || !self.roles.is_empty()
    }

    /// Whether anything beyond validation has been recorded.
    pub fn is_resumed(&self) -> bool {
        self.completed.iter().any(|s| *s != Step::Validate)
    }

    /// Mark `step` done and persist.
    pub fn complete(&mut self, step: Step) -> Result<()> {
        if !self.completed.contains(&step) {
            self.completed.push(step);
            self.completed.sort();
        }
        self.save()
    }

    /// Write the checkpoint with owner-only permissions.
    ///
    /// The first write also lists the file in `.gitignore` next to it.
    pub fn save(&mut self) -> Result<()> {
        self.meta.updated_at = now();
        let contents = toml::to_string_pretty(self).map_err(StateError::Serialize)?;
        debug!(path = %self.path.display(), "saving checkpoint");

        let first_write = !self.path.exists();
        fs::write_private(&self.path, contents.as_bytes())?;
        if first_write {
            if let Some(name) = self.path.file_name().and_then(|n| n.to_str()) {
                fs::ensure_gitignore(fs::parent_dir(&self.path), &[name])?;
            }
        }
        Ok(())
    }

    /// Delete the checkpoint file if present.
    pub fn remove(&self) -> Result<()> {
        remove_file(&self.path)
    }

    /// Delete whatever file is at `path`, readable or not.
    pub fn discard(path: &Path) -> Result<()> {
        remove_file(path)
    }
}

fn remove_file(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
