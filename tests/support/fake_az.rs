//! Fake `az` executable.
//!
//! Written once per test binary and shared by every test; per-test state
//! lives in the environment of the spawned command.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Account returned by `az account show`.
pub const SUBSCRIPTION_ID: &str = "sub-123";
pub const TENANT_ID: &str = "tenant-456";
pub const APP_ID: &str = "app-789";
pub const CREATED_SECRET: &str = "pw-created";
pub const RESET_SECRET: &str = "pw-reset";
pub const OBJECT_ID: &str = "obj-789";
pub const RP_OBJECT_ID: &str = "rp-000";

const SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_AZ_LOG"

if [ -n "$FAKE_AZ_FAIL" ]; then
  case "$*" in
    "$FAKE_AZ_FAIL"*) echo "ERROR: injected failure" >&2; exit 1 ;;
  esac
fi

case "$1 $2" in
  "account show")
    if [ -n "$FAKE_AZ_LOGGED_OUT" ]; then
      echo "ERROR: Please run 'az login' to setup account." >&2
      exit 1
    fi
    echo '{"id":"sub-123","name":"Dev Subscription","tenantId":"tenant-456","user":{"name":"ops"}}'
    ;;
  "provider register") ;;
  "group exists")
    if [ -n "$FAKE_AZ_GROUP_EXISTS" ]; then echo true; else echo false; fi
    ;;
  "group create") echo '{"name":"rg","properties":{"provisioningState":"Succeeded"}}' ;;
  "ad sp")
    case "$3" in
      create-for-rbac) echo '{"appId":"app-789","displayName":"sp","password":"pw-created","tenant":"tenant-456"}' ;;
      credential) echo '{"appId":"app-789","password":"pw-reset","tenant":"tenant-456"}' ;;
      show) echo '{"id":"obj-789","appId":"app-789"}' ;;
      list)
        if [ -n "$FAKE_AZ_NO_RP" ]; then echo '[]'; else echo '[{"id":"rp-000","displayName":"Azure Red Hat OpenShift RP"}]'; fi
        ;;
      *) echo "unexpected: $*" >&2; exit 2 ;;
    esac
    ;;
  "role assignment") echo '{"id":"assignment"}' ;;
  *) echo "unexpected: $*" >&2; exit 2 ;;
esac
"#;

static FAKE_AZ: OnceLock<(TempDir, PathBuf)> = OnceLock::new();

/// Path to the shared fake `az` script.
pub fn path() -> &'static Path {
    &FAKE_AZ
        .get_or_init(|| {
            let dir = TempDir::new().expect("failed to create fake az dir");
            let path = dir.path().join("az");
            std::fs::write(&path, SCRIPT).expect("failed to write fake az");
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                    .expect("failed to chmod fake az");
            }
            (dir, path)
        })
        .1
}
