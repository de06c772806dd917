//! Status command.
//!
//! Shows what an interrupted run already did.

use crate::cli::output;
use crate::core::checkpoint::{Checkpoint, Step};
use crate::core::config::RunConfig;
use crate::error::Result;

/// Print checkpoint progress for `config`.
pub fn execute(config: RunConfig) -> Result<()> {
    let path = config.checkpoint_path();
    let Some(checkpoint) = Checkpoint::read(&path)? else {
        output::info("no bootstrap in progress");
        return Ok(());
    };

    output::section("Bootstrap Status");
    output::kv("checkpoint", output::path(path.display()));
    output::kv("prefix", &checkpoint.meta.prefix);
    output::kv("updated", &checkpoint.meta.updated_at);
    if let Some(account) = &checkpoint.account {
        output::kv("subscription", &account.subscription_name);
    }
    if let Some(identity) = &checkpoint.identity {
        output::kv("principal", &identity.display_name);
        output::kv("client id", &identity.app_id);
    }
    output::blank();

    for step in Step::ALL {
        if checkpoint.is_complete(step) && !step.is_idempotent() {
            output::success(&format!("{} (kept on resume)", step.label()));
        } else if checkpoint.is_complete(step) {
            output::success(step.label());
        } else {
            output::info(step.label());
        }
    }

    if !checkpoint.roles.is_empty() || checkpoint.rp_object_id.is_some() {
        output::blank();
    }
    if !checkpoint.roles.is_empty() {
        output::kv("roles", checkpoint.roles.join(", "));
    }
    if let Some(rp) = &checkpoint.rp_object_id {
        output::kv("ARO RP", rp);
    }

    output::blank();
    if checkpoint.meta.fingerprint == config.fingerprint() {
        output::info("run aro-bootstrap run to resume");
    } else {
        output::warn("checkpoint was written for a different configuration");
        output::info("run aro-bootstrap run --fresh to start over");
    }

    Ok(())
}
