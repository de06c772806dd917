//! Command-line interface.

pub mod completions;
pub mod output;
pub mod reset;
pub mod run;
pub mod status;
pub mod validate;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::{PullSecretSource, RunConfig};
use crate::core::constants;
use crate::core::retry::RetryConfig;

/// aro-bootstrap - prepare an Azure subscription for Azure Red Hat OpenShift.
#[derive(Parser)]
#[command(
    name = "aro-bootstrap",
    about = "Prepare an Azure subscription for an Azure Red Hat OpenShift cluster",
    version,
    after_help = "Writes the variables file consumed by the Terraform stage."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Run every bootstrap step and write the variables file
    Run {
        #[command(flatten)]
        config: ConfigArgs,
        /// Ignore any checkpoint left by an earlier run
        #[arg(long)]
        fresh: bool,
    },

    /// Check the configuration without calling Azure
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show progress recorded by an interrupted run
    Status {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Delete the checkpoint of an interrupted run
    Reset {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Run configuration flags. Each falls back to an `ARO_*` variable.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Name prefix for every Azure resource (a-z, 0-9, '-', max 15)
    #[arg(long, env = "ARO_PREFIX", default_value = constants::DEFAULT_PREFIX)]
    pub prefix: String,

    /// Cluster domain label [default: the prefix]
    #[arg(long, env = "ARO_DOMAIN")]
    pub domain: Option<String>,

    /// Azure region
    #[arg(short, long, env = "ARO_LOCATION", default_value = constants::DEFAULT_LOCATION)]
    pub location: String,

    /// Red Hat pull secret file [default: pull-secret.txt, optional]
    #[arg(long, env = "ARO_PULL_SECRET")]
    pub pull_secret: Option<PathBuf>,

    /// VNet address space
    #[arg(long, env = "ARO_VNET_CIDR", default_value = constants::DEFAULT_VNET_CIDR)]
    pub vnet_cidr: String,

    /// Control-plane subnet
    #[arg(long, env = "ARO_MASTER_CIDR", default_value = constants::DEFAULT_MASTER_CIDR)]
    pub master_cidr: String,

    /// Worker subnet
    #[arg(long, env = "ARO_WORKER_CIDR", default_value = constants::DEFAULT_WORKER_CIDR)]
    pub worker_cidr: String,

    /// Generated variables file
    #[arg(short, long, env = "ARO_OUTPUT", default_value = constants::DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// az executable
    #[arg(long = "az", env = "ARO_AZ", default_value = "az")]
    pub az: String,

    /// Directory for the resume checkpoint
    #[arg(long, env = "ARO_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,

    /// Lookups of a new service principal before giving up
    #[arg(long, env = "ARO_OBJECT_ID_ATTEMPTS", default_value_t = 8)]
    pub object_id_attempts: u32,

    /// Initial delay between those lookups, in milliseconds
    #[arg(long, env = "ARO_OBJECT_ID_DELAY_MS", default_value_t = 2000)]
    pub object_id_delay_ms: u64,
}

impl ConfigArgs {
    /// Resolve defaults into a [`RunConfig`]. Does not validate.
    pub fn into_config(self) -> RunConfig {
        let domain = self.domain.unwrap_or_else(|| self.prefix.clone());
        let pull_secret = match self.pull_secret {
            Some(path) => PullSecretSource::Explicit(path),
            None => PullSecretSource::Default(PathBuf::from(constants::DEFAULT_PULL_SECRET)),
        };
        let object_id_retry = RetryConfig {
            initial_delay: Duration::from_millis(self.object_id_delay_ms),
            ..RetryConfig::with_max_attempts(self.object_id_attempts)
        };

        RunConfig {
            prefix: self.prefix,
            domain,
            location: self.location,
            pull_secret,
            vnet_cidr: self.vnet_cidr,
            master_cidr: self.master_cidr,
            worker_cidr: self.worker_cidr,
            output: self.output,
            az: self.az,
            state_dir: self.state_dir,
            object_id_retry,
        }
    }
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Run { config, fresh } => run::execute(config.into_config(), fresh),
        Validate { config } => validate::execute(config.into_config()),
        Status { config } => status::execute(config.into_config()),
        Reset { config } => reset::execute(config.into_config()),
        Completions { shell } => completions::execute(shell),
    }
}
