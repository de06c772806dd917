//! `az` CLI backend.
//!
//! Runs one `az` process per operation and parses its JSON output.
//!
//! ## Requirements
//!
//! - `az` CLI must be installed and on `PATH` (or named via `ARO_AZ`)
//! - `az login` must have been run
//! - The signed-in account needs rights to register providers, create
//!   resource groups, create app registrations and assign roles

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{AccountContext, Cloud, NewCredential};
use crate::error::{AzureError, Result};

/// Azure backend driving the `az` CLI.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: PathBuf,
}

#[derive(Deserialize)]
struct AccountShow {
    id: String,
    name: String,
    #[serde(rename = "tenantId")]
    tenant_id: String,
}

#[derive(Deserialize)]
struct SpCredential {
    #[serde(rename = "appId")]
    app_id: String,
    password: Zeroizing<String>,
}

#[derive(Deserialize)]
struct DirectoryObject {
    id: Option<String>,
}

impl AzCli {
    /// Locate the `az` executable.
    ///
    /// `program` may be a bare name looked up on `PATH` or a path.
    ///
    /// # Errors
    ///
    /// Returns `AzureError::CliNotFound` if it cannot be found.
    pub fn locate(program: &str) -> Result<Self> {
        let program = which::which(program)
            .map_err(|e| AzureError::CliNotFound(format!("{}: {}", program, e)))?;
        debug!(program = %program.display(), "using az");
        Ok(Self { program })
    }

    /// Run `az` with `args` and return stdout.
    ///
    /// `label` names the operation in errors, e.g. `group create`.
    fn run(&self, label: &str, args: &[&str]) -> Result<Vec<u8>> {
        debug!(args = ?args, "running az");

        let output = Command::new(&self.program)
            .args(args)
            .arg("--only-show-errors")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(AzureError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(command = label, status = ?output.status.code(), "az failed");
            return Err(AzureError::CommandFailed {
                command: label.to_string(),
                stderr,
            }
            .into());
        }

        trace!(command = label, stdout_len = output.stdout.len(), "az succeeded");
        Ok(output.stdout)
    }

    /// Run `az` and parse its stdout as JSON.
    fn json<T: DeserializeOwned>(&self, label: &str, args: &[&str]) -> Result<T> {
        let stdout = Zeroizing::new(self.run(label, args)?);
        serde_json::from_slice(&stdout).map_err(|e| {
            AzureError::UnexpectedOutput {
                command: label.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Reject empty identifiers that `az` sometimes prints as `""` or `null`.
fn non_empty(label: &str, field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() && v != "null" => Ok(v),
        _ => Err(AzureError::UnexpectedOutput {
            command: label.to_string(),
            reason: format!("missing {}", field),
        }
        .into()),
    }
}

impl Cloud for AzCli {
    fn account(&self) -> Result<AccountContext> {
        let label = "account show";
        let account: AccountShow = self
            .json(label, &["account", "show", "--output", "json"])
            .map_err(|e| match e {
                crate::error::Error::Azure(AzureError::CommandFailed { stderr, .. }) => {
                    AzureError::NotAuthenticated(stderr).into()
                }
                other => other,
            })?;

        Ok(AccountContext {
            subscription_id: non_empty(label, "id", Some(account.id))?,
            subscription_name: account.name,
            tenant_id: non_empty(label, "tenantId", Some(account.tenant_id))?,
        })
    }

    fn register_provider(&self, namespace: &str) -> Result<()> {
        self.run(
            "provider register",
            &["provider", "register", "--namespace", namespace, "--wait"],
        )?;
        Ok(())
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        self.json("group exists", &["group", "exists", "--name", name])
    }

    fn create_group(&self, name: &str, location: &str) -> Result<()> {
        self.run(
            "group create",
            &[
                "group", "create", "--name", name, "--location", location, "--output", "json",
            ],
        )?;
        Ok(())
    }

    fn create_service_principal(&self, display_name: &str) -> Result<NewCredential> {
        let label = "ad sp create-for-rbac";
        let created: SpCredential = self.json(
            label,
            &[
                "ad",
                "sp",
                "create-for-rbac",
                "--name",
                display_name,
                "--output",
                "json",
            ],
        )?;
        credential(label, created)
    }

    fn reset_credential(&self, app_id: &str) -> Result<NewCredential> {
        let label = "ad sp credential reset";
        let reset: SpCredential = self.json(
            label,
            &[
                "ad", "sp", "credential", "reset", "--id", app_id, "--output", "json",
            ],
        )?;
        credential(label, reset)
    }

    fn service_principal_object_id(&self, app_id: &str) -> Result<String> {
        let label = "ad sp show";
        let object: DirectoryObject =
            self.json(label, &["ad", "sp", "show", "--id", app_id, "--output", "json"])?;
        non_empty(label, "id", object.id)
    }

    fn assign_role(&self, role: &str, object_id: &str, scope: &str) -> Result<()> {
        self.run(
            "role assignment create",
            &[
                "role",
                "assignment",
                "create",
                "--assignee-object-id",
                object_id,
                "--assignee-principal-type",
                "ServicePrincipal",
                "--role",
                role,
                "--scope",
                scope,
                "--output",
                "json",
            ],
        )?;
        Ok(())
    }

    fn find_service_principal(&self, display_name: &str) -> Result<String> {
        let objects: Vec<DirectoryObject> = self.json(
            "ad sp list",
            &[
                "ad",
                "sp",
                "list",
                "--display-name",
                display_name,
                "--output",
                "json",
            ],
        )?;

        objects
            .into_iter()
            .next()
            .and_then(|o| o.id)
            .filter(|id| !id.is_empty() && id != "null")
            .ok_or_else(|| AzureError::ServicePrincipalNotFound(display_name.to_string()).into())
    }
}

fn credential(label: &str, raw: SpCredential) -> Result<NewCredential> {
    if raw.password.is_empty() {
        return Err(AzureError::UnexpectedOutput {
            command: label.to_string(),
            reason: "missing password".to_string(),
        }
        .into());
    }
    Ok(NewCredential {
        app_id: non_empty(label, "appId", Some(raw.app_id))?,
        client_secret: raw.password,
    })
}
