//! Generated variables file.
//!
//! Renders everything the Terraform stage needs as flat `key = "value"`
//! lines in four sections:
//!
//! ```text
//! # Terraform variables
//! # Sensitive Terraform variables
//! # Environment variables for the remote Terraform workspace
//! # Secrets for the CI secret store
//! ```
//!
//! The file holds the client secret in plain text. It is written 0600 and
//! added to `.gitignore`; nothing here sends it anywhere else.

use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::azure::AccountContext;
use crate::core::config::RunConfig;
use crate::core::fs;
use crate::error::{ConfigError, Result};

/// Credential of the service principal created for the cluster.
pub struct ServicePrincipalCredential {
    pub display_name: String,
    pub app_id: String,
    pub client_secret: Zeroizing<String>,
    pub object_id: String,
}

impl std::fmt::Debug for ServicePrincipalCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipalCredential")
            .field("display_name", &self.display_name)
            .field("app_id", &self.app_id)
            .field("client_secret", &"<redacted>")
            .field("object_id", &self.object_id)
            .finish()
    }
}

/// Read the pull secret, if there is one.
///
/// Returns `Ok(None)` when the default path does not exist. An explicitly
/// configured path that vanished since validation is an error.
pub fn load_pull_secret(config: &RunConfig) -> Result<Option<Zeroizing<String>>> {
    let path = config.pull_secret.path();
    if !path.is_file() {
        if config.pull_secret.is_explicit() {
            return Err(ConfigError::PullSecretMissing(path.to_path_buf()).into());
        }
        debug!(path = %path.display(), "no pull secret");
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PullSecretRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = Zeroizing::new(raw);
    debug!(path = %path.display(), len = raw.len(), "loaded pull secret");
    Ok(Some(Zeroizing::new(raw.trim().to_string())))
}

/// Everything that ends up in the variables file.
pub struct Variables<'a> {
    pub config: &'a RunConfig,
    pub account: &'a AccountContext,
    pub credential: &'a ServicePrincipalCredential,
    pub rp_object_id: &'a str,
    /// Empty when no pull secret was found.
    pub pull_secret: &'a str,
    pub generated_at: String,
}

impl Variables<'_> {
    /// Render the file contents.
    pub fn render(&self) -> Zeroizing<String> {
        let config = self.config;
        let cred = self.credential;
        let account = self.account;
        let mut out = Zeroizing::new(String::new());

        line(&mut out, "# Generated by aro-bootstrap. Do not commit this file.");
        let _ = writeln!(out, "# generated_at: {}", self.generated_at);
        let _ = writeln!(
            out,
            "# subscription: {} ({})",
            account.subscription_name, account.subscription_id
        );

        section(&mut out, "Terraform variables");
        assign(&mut out, "location", &config.location);
        assign(&mut out, "resource_group_name", &config.resource_group());
        assign(&mut out, "aro_name_prefix", &config.prefix);
        assign(&mut out, "domain", &config.domain);
        assign(&mut out, "vnet_address_space", &config.vnet_cidr);
        assign(&mut out, "master_subnet_cidr", &config.master_cidr);
        assign(&mut out, "worker_subnet_cidr", &config.worker_cidr);

        section(&mut out, "Sensitive Terraform variables");
        assign(&mut out, "aro_client_id", &cred.app_id);
        assign(&mut out, "aro_client_secret", &cred.client_secret);
        assign(&mut out, "aro_client_object_id", &cred.object_id);
        assign(&mut out, "aro_rp_object_id", self.rp_object_id);
        assign(&mut out, "pull_secret", self.pull_secret);

        section(&mut out, "Environment variables for the remote Terraform workspace");
        assign(&mut out, "ARM_CLIENT_ID", &cred.app_id);
        assign(&mut out, "ARM_CLIENT_SECRET", &cred.client_secret);
        assign(&mut out, "ARM_SUBSCRIPTION_ID", &account.subscription_id);
        assign(&mut out, "ARM_TENANT_ID", &account.tenant_id);

        section(&mut out, "Secrets for the CI secret store");
        assign(&mut out, "AZURE_CLIENT_ID", &cred.app_id);
        assign(&mut out, "AZURE_CLIENT_SECRET", &cred.client_secret);
        assign(&mut out, "AZURE_SUBSCRIPTION_ID", &account.subscription_id);
        assign(&mut out, "AZURE_TENANT_ID", &account.tenant_id);
        assign(&mut out, "PULL_SECRET", self.pull_secret);

        out
    }

    /// Render and write to `config.output`, then make sure git ignores it.
    ///
    /// # Returns
    ///
    /// The path written.
    pub fn write(&self) -> Result<PathBuf> {
        let path = self.config.output.clone();
        let contents = self.render();
        fs::write_private(&path, contents.as_bytes())?;
        debug!(path = %path.display(), "wrote variables file");

        let dir = fs::parent_dir(&path);
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            fs::ensure_gitignore(dir, &[name])?;
        }
        Ok(path)
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn section(out: &mut String, title: &str) {
    out.push('\n');
    let _ = writeln!(out, "# {}", title);
}

fn assign(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{} = \"{}\"", key, quote(value));
}

/// Escape a value for a double-quoted HCL string on a single line.
pub fn quote(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
