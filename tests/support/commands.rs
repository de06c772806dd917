//! Command helper methods for Test.

use super::{fake_az, Test};
use assert_cmd::Command;
use std::process::Output;

/// Variables that would leak the developer's own settings into a test.
const ISOLATED_VARS: &[&str] = &[
    "ARO_PREFIX",
    "ARO_DOMAIN",
    "ARO_LOCATION",
    "ARO_PULL_SECRET",
    "ARO_VNET_CIDR",
    "ARO_MASTER_CIDR",
    "ARO_WORKER_CIDR",
    "ARO_OUTPUT",
    "ARO_STATE_DIR",
    "ARO_OBJECT_ID_ATTEMPTS",
    "ARO_BOOTSTRAP_LOG",
    "FAKE_AZ_FAIL",
    "FAKE_AZ_LOGGED_OUT",
    "FAKE_AZ_GROUP_EXISTS",
    "FAKE_AZ_NO_RP",
];

impl Test {
    /// Create an aro-bootstrap command wired to the fake `az`.
    ///
    /// Returns a Command configured with:
    /// - current directory set to the test project directory
    /// - `ARO_AZ` pointing at the fake script, logging to `az.log`
    /// - colours off and object-id polling sped up
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("aro-bootstrap").expect("failed to find binary");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path());
        cmd.env("ARO_AZ", fake_az::path());
        cmd.env("FAKE_AZ_LOG", self.path("az.log"));
        cmd.env("ARO_OBJECT_ID_DELAY_MS", "1");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Shortcut for `aro-bootstrap run` with extra arguments.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("run")
            .args(args)
            .output()
            .expect("failed to run aro-bootstrap run")
    }

    /// `aro-bootstrap run` with one `FAKE_AZ_*` switch set.
    pub fn run_with(&self, var: &str, value: &str, args: &[&str]) -> Output {
        self.cmd()
            .env(var, value)
            .arg("run")
            .args(args)
            .output()
            .expect("failed to run aro-bootstrap run")
    }

    /// Shortcut for `aro-bootstrap validate`.
    pub fn validate(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("validate")
            .args(args)
            .output()
            .expect("failed to run aro-bootstrap validate")
    }

    /// Shortcut for `aro-bootstrap status`.
    pub fn status(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("status")
            .args(args)
            .output()
            .expect("failed to run aro-bootstrap status")
    }

    /// Shortcut for `aro-bootstrap reset`.
    pub fn reset(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("reset")
            .args(args)
            .output()
            .expect("failed to run aro-bootstrap reset")
    }
}
