//! Tests for `aro-bootstrap run`.

use crate::support::fake_az::*;
use crate::support::*;

#[test]
fn test_run_scenario_without_pull_secret() {
    let t = Test::new();

    let output = t.run(&["--prefix", "aro-dev-001", "--location", "canadacentral"]);
    assert_success(&output);
    assert_stdout_contains(&output, "without registry pull credentials");
    assert_stdout_contains(&output, "aro-dev-001-rg");

    let vars = t.read("aro.secrets.tfvars");
    assert!(vars.contains("domain = \"aro-dev-001\""));
    assert!(vars.contains("location = \"canadacentral\""));
    assert!(vars.contains("pull_secret = \"\""));
    assert!(vars.contains("resource_group_name = \"aro-dev-001-rg\""));
    assert!(vars.contains(&format!("aro_client_id = \"{}\"", APP_ID)));
    assert!(vars.contains(&format!("aro_client_secret = \"{}\"", CREATED_SECRET)));
    assert!(vars.contains(&format!("aro_client_object_id = \"{}\"", OBJECT_ID)));
    assert!(vars.contains(&format!("aro_rp_object_id = \"{}\"", RP_OBJECT_ID)));
    assert!(vars.contains(&format!("ARM_SUBSCRIPTION_ID = \"{}\"", SUBSCRIPTION_ID)));
    assert!(vars.contains(&format!("AZURE_TENANT_ID = \"{}\"", TENANT_ID)));

    assert!(!t.checkpoint_exists(), "checkpoint should be removed after success");
}

#[test]
fn test_run_call_sequence() {
    let t = Test::new();

    assert_success(&t.run(&["--prefix", "aro"]));

    let calls = t.az_calls();
    let order: Vec<&str> = calls
        .iter()
        .map(|c| {
            let words: Vec<&str> = c.splitn(4, ' ').collect();
            match words.as_slice() {
                ["account", "show", ..] => "account",
                ["provider", "register", ..] => "provider",
                ["group", "exists", ..] => "group exists",
                ["group", "create", ..] => "group create",
                ["ad", "sp", "create-for-rbac", ..] => "sp create",
                ["ad", "sp", "show", ..] => "sp show",
                ["role", "assignment", ..] => "role",
                ["ad", "sp", "list", ..] => "rp lookup",
                _ => "other",
            }
        })
        .collect();

    assert_eq!(
        order,
        vec![
            "account",
            "provider",
            "provider",
            "provider",
            "provider",
            "group exists",
            "group create",
            "sp create",
            "sp show",
            "role",
            "role",
            "rp lookup",
        ]
    );

    assert!(calls.iter().any(|c| c.contains("--namespace Microsoft.RedHatOpenShift --wait")));
    assert!(calls
        .iter()
        .any(|c| c.contains("--role Contributor --scope /subscriptions/sub-123/resourceGroups/aro-rg")));
    assert!(calls
        .iter()
        .any(|c| c.contains("--role User Access Administrator --scope /subscriptions/sub-123/resourceGroups/aro-rg")));
    assert!(calls
        .iter()
        .any(|c| c.starts_with("ad sp create-for-rbac --name aro-sp-")));
}

#[test]
fn test_run_with_pull_secret() {
    let t = Test::new();
    t.write("pull-secret.txt", "{\"auths\":{\"cloud.openshift.com\":{\"auth\":\"abc\"}}}\n");

    let output = t.run(&["--prefix", "aro"]);
    assert_success(&output);
    assert_stdout_excludes(&output, "without registry pull credentials");

    let vars = t.read("aro.secrets.tfvars");
    assert!(vars.contains(
        r#"pull_secret = "{\"auths\":{\"cloud.openshift.com\":{\"auth\":\"abc\"}}}""#
    ));
    assert!(vars.contains(r#"PULL_SECRET = "{\"auths\""#));
}

#[test]
fn test_run_env_configuration() {
    let t = Test::new();
    t.write("custom.json", "{}");

    let output = t
        .cmd()
        .env("ARO_PREFIX", "envprefix")
        .env("ARO_DOMAIN", "envdomain")
        .env("ARO_LOCATION", "westeurope")
        .env("ARO_PULL_SECRET", "custom.json")
        .env("ARO_OUTPUT", "out.tfvars")
        .arg("run")
        .output()
        .unwrap();
    assert_success(&output);

    let vars = t.read("out.tfvars");
    assert!(vars.contains("aro_name_prefix = \"envprefix\""));
    assert!(vars.contains("domain = \"envdomain\""));
    assert!(vars.contains("location = \"westeurope\""));
    assert!(vars.contains("pull_secret = \"{}\""));
    assert!(t.read(".gitignore").lines().any(|l| l == "out.tfvars"));
}

#[test]
fn test_run_existing_group_is_warning() {
    let t = Test::new();

    let output = t.run_with("FAKE_AZ_GROUP_EXISTS", "1", &["--prefix", "aro"]);
    assert_success(&output);
    assert_stdout_contains(&output, "already exists");
    assert_eq!(t.az_count("group create"), 0);
}

#[test]
fn test_run_twice_reuses_group() {
    let t = Test::new();

    assert_success(&t.run(&["--prefix", "aro"]));
    let output = t.run_with("FAKE_AZ_GROUP_EXISTS", "1", &["--prefix", "aro"]);
    assert_success(&output);

    assert_eq!(t.az_count("group exists"), 2);
    assert_eq!(t.az_count("group create"), 1);
}

#[test]
fn test_run_bad_prefix_makes_no_az_calls() {
    let t = Test::new();

    let output = t.run(&["--prefix", "-bad-"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "hyphen");
    assert!(t.az_calls().is_empty());
    assert!(!t.path("aro.secrets.tfvars").exists());
}

#[test]
fn test_run_prefix_too_long() {
    let t = Test::new();

    let output = t.run(&["--prefix", "this-prefix-is-too-long"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "too long");
    assert!(t.az_calls().is_empty());
}

#[test]
fn test_run_missing_explicit_pull_secret() {
    let t = Test::new();

    let output = t.run(&["--prefix", "aro", "--pull-secret", "nope.json"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "pull secret file not found");
    assert!(t.az_calls().is_empty());
}

#[test]
fn test_run_not_logged_in() {
    let t = Test::new();

    let output = t.run_with("FAKE_AZ_LOGGED_OUT", "1", &["--prefix", "aro"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not logged in");
    assert_stderr_contains(&output, "az login");
    assert_eq!(t.az_calls().len(), 1);
    assert_eq!(t.az_count("account show"), 1);
}

#[test]
fn test_run_provider_failure_aborts() {
    let t = Test::new();

    let output = t.run_with(
        "FAKE_AZ_FAIL",
        "provider register --namespace Microsoft.Compute",
        &["--prefix", "aro"],
    );
    assert_failure(&output);
    assert_stderr_contains(&output, "provider register failed");
    assert_eq!(t.az_count("provider register"), 2);
    assert_eq!(t.az_count("group"), 0);
}

#[test]
fn test_run_missing_platform_identity() {
    let t = Test::new();

    let output = t.run_with("FAKE_AZ_NO_RP", "1", &["--prefix", "aro"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "Azure Red Hat OpenShift RP");
    assert!(!t.path("aro.secrets.tfvars").exists());
}

#[test]
fn test_run_missing_az_binary() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("ARO_AZ", t.path("no-such-az"))
        .args(["run", "--prefix", "aro"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "az CLI not found");
}

#[test]
fn test_run_output_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::new();
    assert_success(&t.run(&["--prefix", "aro"]));

    let mode = std::fs::metadata(t.path("aro.secrets.tfvars"))
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o600);
    assert!(t
        .read(".gitignore")
        .lines()
        .any(|l| l == "aro.secrets.tfvars"));
}
