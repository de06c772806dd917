//! Run command.
//!
//! Executes every bootstrap step against the logged-in Azure account and
//! writes the variables file.

use tracing::info;

use crate::cli::output;
use crate::core::azure::AzCli;
use crate::core::bootstrap;
use crate::core::checkpoint::Checkpoint;
use crate::core::config::RunConfig;
use crate::error::Result;

/// Run the bootstrap.
pub fn execute(config: RunConfig, fresh: bool) -> Result<()> {
    // Bad input must fail before az is even looked up.
    config.validate()?;

    let mut checkpoint = Checkpoint::load_or_new(&config, fresh)?;
    let cloud = AzCli::locate(&config.az)?;
    info!(prefix = %config.prefix, location = %config.location, fresh, "starting bootstrap");

    output::header(&format!("Bootstrapping {}", config.resource_group()));
    output::blank();

    let mut console = output::Console;
    let outcome = bootstrap::run(&cloud, &config, &mut checkpoint, &mut console)?;

    output::section("Done");
    output::kv("subscription", &outcome.subscription_name);
    output::kv("resource group", &outcome.resource_group);
    output::kv("principal", &outcome.service_principal);
    output::kv("client id", &outcome.app_id);
    output::kv("variables", output::path(outcome.output.display()));
    output::kv(
        "pull secret",
        if outcome.pull_secret { "included" } else { "none" },
    );
    output::blank();
    output::info(&format!(
        "{} contains secrets and is git-ignored; copy its values into Terraform and CI",
        outcome.output.display()
    ));

    Ok(())
}
