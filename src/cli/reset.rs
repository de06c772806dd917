//! Reset command.
//!
//! Deletes the checkpoint. Cloud objects an interrupted run created are
//! left in place and listed so they can be removed by hand.

use crate::cli::output;
use crate::core::checkpoint::Checkpoint;
use crate::core::config::RunConfig;
use crate::error::{Error, Result, StateError};

/// Remove the checkpoint for `config`.
///
/// An unreadable checkpoint is removed too, without listing leftovers.
pub fn execute(config: RunConfig) -> Result<()> {
    let path = config.checkpoint_path();
    let checkpoint = match Checkpoint::read(&path) {
        Ok(Some(checkpoint)) => checkpoint,
        Ok(None) => {
            output::info("no checkpoint to remove");
            return Ok(());
        }
        Err(e @ Error::State(StateError::Parse { .. })) => {
            Checkpoint::discard(&path)?;
            output::success(&format!("removed {}", path.display()));
            output::warn(&e.to_string());
            output::warn(
                "leftover Azure objects could not be listed; check the resource group and app registrations by hand",
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    checkpoint.remove()?;
    output::success(&format!("removed {}", path.display()));

    if let Some(identity) = &checkpoint.identity {
        output::warn(&format!(
            "service principal {} still exists in Azure",
            identity.display_name
        ));
        output::info(&format!("delete it with: az ad sp delete --id {}", identity.app_id));
    }
    if !checkpoint.roles.is_empty() {
        output::warn(&format!(
            "role assignments on {} were not removed: {}",
            config.resource_group(),
            checkpoint.roles.join(", ")
        ));
    }

    Ok(())
}
