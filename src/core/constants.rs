//! Constants used throughout aro-bootstrap.
//!
//! Centralizes names that the Azure control plane and the downstream
//! Terraform stage expect verbatim.

/// Maximum length of the name prefix and domain label.
pub const NAME_MAX_LEN: usize = 15;

/// Default name prefix when `ARO_PREFIX` is unset.
pub const DEFAULT_PREFIX: &str = "aro";

/// Default Azure region.
pub const DEFAULT_LOCATION: &str = "eastus";

/// Pull secret looked up when no path is given.
pub const DEFAULT_PULL_SECRET: &str = "pull-secret.txt";

/// Generated variables file.
pub const DEFAULT_OUTPUT: &str = "aro.secrets.tfvars";

/// Default VNet address space.
pub const DEFAULT_VNET_CIDR: &str = "10.0.0.0/22";

/// Default control-plane subnet.
pub const DEFAULT_MASTER_CIDR: &str = "10.0.0.0/23";

/// Default worker subnet.
pub const DEFAULT_WORKER_CIDR: &str = "10.0.2.0/23";

/// Checkpoint file name inside the state directory.
pub const CHECKPOINT_FILE: &str = ".aro-bootstrap.state.toml";

/// Resource providers that must be registered before ARO can be created.
pub const RESOURCE_PROVIDERS: &[&str] = &[
    "Microsoft.RedHatOpenShift",
    "Microsoft.Compute",
    "Microsoft.Storage",
    "Microsoft.Authorization",
];

/// Roles granted to the cluster service principal on the resource group.
pub const ROLES: &[&str] = &["Contributor", "User Access Administrator"];

/// Display name of the first-party ARO resource provider identity.
pub const ARO_RP_DISPLAY_NAME: &str = "Azure Red Hat OpenShift RP";

/// Length of the random suffix on the service principal display name.
pub const SP_SUFFIX_LEN: usize = 6;
