//! Azure control-plane access.
//!
//! The bootstrap steps talk to Azure only through the [`Cloud`] trait.
//! [`AzCli`] implements it by shelling out to the `az` CLI; tests use an
//! in-memory fake.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cloud` trait
//! 2. Add the implementation in a new file next to `cli.rs`
//! 3. Re-export from this module

mod cli;
#[cfg(test)]
pub(crate) mod fake;

pub use cli::AzCli;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::Result;

/// Identity of the logged-in Azure session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub subscription_id: String,
    pub subscription_name: String,
    pub tenant_id: String,
}

/// Client id and secret returned when a service principal is created or
/// its password is reset.
pub struct NewCredential {
    pub app_id: String,
    pub client_secret: Zeroizing<String>,
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("app_id", &self.app_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Operations the bootstrap needs from the Azure control plane.
///
/// Every call is blocking. Implementations report failures as
/// `AzureError`.
pub trait Cloud {
    /// Current subscription and tenant. Fails when not logged in.
    fn account(&self) -> Result<AccountContext>;

    /// Register a resource provider namespace and wait for it to be ready.
    fn register_provider(&self, namespace: &str) -> Result<()>;

    fn group_exists(&self, name: &str) -> Result<bool>;

    fn create_group(&self, name: &str, location: &str) -> Result<()>;

    /// Create an application identity with a client secret.
    fn create_service_principal(&self, display_name: &str) -> Result<NewCredential>;

    /// Replace the client secret of an existing service principal.
    fn reset_credential(&self, app_id: &str) -> Result<NewCredential>;

    /// Directory object id of a service principal, by application id.
    ///
    /// May fail for a short while after creation.
    fn service_principal_object_id(&self, app_id: &str) -> Result<String>;

    fn assign_role(&self, role: &str, object_id: &str, scope: &str) -> Result<()>;

    /// Object id of the first service principal with this display name.
    fn find_service_principal(&self, display_name: &str) -> Result<String>;
}
