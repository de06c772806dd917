//! Run configuration.
//!
//! A [`RunConfig`] is assembled once from CLI flags (which fall back to
//! `ARO_*` environment variables and then to defaults) and validated
//! before any cloud call is made.

use sha2::{Digest, Sha256};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::core::constants;
use crate::core::retry::RetryConfig;
use crate::core::validation;
use crate::error::{ConfigError, Result};

/// Where the pull secret comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullSecretSource {
    /// Path given by the operator; the file must exist.
    Explicit(PathBuf),
    /// Default path; a missing file only produces a warning.
    Default(PathBuf),
}

impl PullSecretSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Default(p) => p,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Validated-on-demand configuration for one bootstrap run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub prefix: String,
    pub domain: String,
    pub location: String,
    pub pull_secret: PullSecretSource,
    pub vnet_cidr: String,
    pub master_cidr: String,
    pub worker_cidr: String,
    /// Generated variables file.
    pub output: PathBuf,
    /// `az` executable name or path.
    pub az: String,
    /// Directory holding the checkpoint file.
    pub state_dir: PathBuf,
    /// Backoff used while waiting for a new directory object.
    pub object_id_retry: RetryConfig,
}

impl RunConfig {
    /// Configuration with every default applied for the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            domain: prefix.clone(),
            prefix,
            location: constants::DEFAULT_LOCATION.to_string(),
            pull_secret: PullSecretSource::Default(PathBuf::from(constants::DEFAULT_PULL_SECRET)),
            vnet_cidr: constants::DEFAULT_VNET_CIDR.to_string(),
            master_cidr: constants::DEFAULT_MASTER_CIDR.to_string(),
            worker_cidr: constants::DEFAULT_WORKER_CIDR.to_string(),
            output: PathBuf::from(constants::DEFAULT_OUTPUT),
            az: "az".to_string(),
            state_dir: PathBuf::from("."),
            object_id_retry: RetryConfig::default(),
        }
    }

    /// Resource group that holds the cluster, `<prefix>-rg`.
    pub fn resource_group(&self) -> String {
        format!("{}-rg", self.prefix)
    }

    /// Path to the checkpoint file.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.state_dir.join(constants::CHECKPOINT_FILE)
    }

    /// Validate every field, failing on the first violation.
    ///
    /// Checks, in order: prefix, domain, location, explicit pull secret
    /// existence, network ranges.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for malformed names and `ConfigError` for
    /// a missing pull secret or bad network layout.
    pub fn validate(&self) -> Result<()> {
        debug!(prefix = %self.prefix, domain = %self.domain, location = %self.location, "validating config");

        validation::validate_name("prefix", &self.prefix)?;
        validation::validate_name("domain", &self.domain)?;
        validation::validate_location(&self.location)?;

        if let PullSecretSource::Explicit(path) = &self.pull_secret {
            if !path.is_file() {
                return Err(ConfigError::PullSecretMissing(path.clone()).into());
            }
        }

        self.validate_network()?;
        Ok(())
    }

    fn validate_network(&self) -> Result<()> {
        let vnet = Ipv4Cidr::parse("vnet_cidr", &self.vnet_cidr)?;
        let master = Ipv4Cidr::parse("master_cidr", &self.master_cidr)?;
        let worker = Ipv4Cidr::parse("worker_cidr", &self.worker_cidr)?;

        for (field, subnet) in [("master subnet", &master), ("worker subnet", &worker)] {
            if !vnet.contains(subnet) {
                return Err(ConfigError::SubnetOutsideVnet {
                    field,
                    subnet: subnet.to_string(),
                    vnet: vnet.to_string(),
                }
                .into());
            }
        }

        if master.overlaps(&worker) {
            return Err(ConfigError::SubnetOverlap {
                master: master.to_string(),
                worker: worker.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Stable hash of the fields that decide which cloud objects a run
    /// touches. A checkpoint is only resumed when this matches.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.prefix.as_str(),
            self.domain.as_str(),
            self.location.as_str(),
            self.vnet_cidr.as_str(),
            self.master_cidr.as_str(),
            self.worker_cidr.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// An IPv4 network in CIDR notation with no host bits set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Cidr {
    addr: Ipv4Addr,
    len: u8,
}

impl Ipv4Cidr {
    fn parse(field: &'static str, value: &str) -> Result<Self> {
        value.parse::<Self>().map_err(|reason| {
            ConfigError::InvalidCidr {
                field,
                value: value.to_string(),
                reason,
            }
            .into()
        })
    }

    fn mask(&self) -> u32 {
        if self.len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.len))
        }
    }

    fn start(&self) -> u32 {
        u32::from(self.addr)
    }

    fn end(&self) -> u32 {
        self.start() | !self.mask()
    }

    /// Whether `other` lies entirely within this network.
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.len >= self.len && other.start() & self.mask() == self.start()
    }

    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }
}

impl FromStr for Ipv4Cidr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| "expected address/prefix-length".to_string())?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|e| format!("bad address: {}", e))?;
        let len: u8 = len
            .parse()
            .map_err(|_| format!("bad prefix length '{}'", len))?;
        if len > 32 {
            return Err(format!("prefix length {} exceeds 32", len));
        }

        let cidr = Self { addr, len };
        if u32::from(addr) & !cidr.mask() != 0 {
            return Err("host bits are set".to_string());
        }
        Ok(cidr)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}
