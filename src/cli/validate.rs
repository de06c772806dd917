//! Validate command.
//!
//! Checks the configuration exactly as `run` would, without calling Azure.

use crate::cli::output;
use crate::core::config::RunConfig;
use crate::error::Result;

/// Validate configuration and print the resolved values.
pub fn execute(config: RunConfig) -> Result<()> {
    config.validate()?;

    output::section("Configuration");
    output::kv("prefix", &config.prefix);
    output::kv("domain", &config.domain);
    output::kv("location", &config.location);
    output::kv("resource group", config.resource_group());
    output::kv("vnet", &config.vnet_cidr);
    output::kv("master subnet", &config.master_cidr);
    output::kv("worker subnet", &config.worker_cidr);
    output::kv("output", output::path(config.output.display()));
    output::blank();

    let pull_secret = config.pull_secret.path();
    if pull_secret.is_file() {
        output::success(&format!("pull secret {}", pull_secret.display()));
    } else {
        output::warn(&format!(
            "{} not found; cluster will be built without registry pull credentials",
            pull_secret.display()
        ));
    }
    output::success("configuration valid");

    Ok(())
}
