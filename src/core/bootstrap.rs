//! Bootstrap orchestration.
//!
//! Runs the stages in [`Step::ALL`] order against a [`Cloud`]. Each stage
//! either succeeds and hands its output to the next, or aborts the run.
//! Progress is recorded in a [`Checkpoint`] after every stage; a later run
//! with the same configuration skips the non-idempotent stages it already
//! finished (service principal creation, individual role bindings).

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::azure::{AccountContext, Cloud};
use crate::core::checkpoint::{Checkpoint, IdentityRecord, Step};
use crate::core::config::RunConfig;
use crate::core::constants;
use crate::core::retry::retry_with_backoff_if;
use crate::core::variables::{self, ServicePrincipalCredential, Variables};
use crate::error::{AzureError, Error, Result, StateError};

/// Receives progress from the bootstrap.
///
/// The CLI prints these as coloured status lines; tests record them.
pub trait Reporter {
    fn step(&mut self, step: Step);
    fn info(&mut self, msg: &str);
    fn success(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
}

/// State shared by every stage after the account has been read.
#[derive(Debug)]
pub struct RunContext<'a> {
    pub config: &'a RunConfig,
    pub account: AccountContext,
    pub resource_group: String,
}

impl RunContext<'_> {
    /// ARM id of the resource group, used as role assignment scope.
    pub fn scope(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.account.subscription_id, self.resource_group
        )
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct Outcome {
    pub output: PathBuf,
    pub resource_group: String,
    pub service_principal: String,
    pub app_id: String,
    pub subscription_name: String,
    pub resumed: bool,
    pub pull_secret: bool,
}

/// Run every stage.
///
/// `config` is validated first; no cloud call is made if it is invalid.
///
/// # Errors
///
/// The first failing stage's error. The checkpoint is kept so a re-run
/// resumes after the last completed stage.
pub fn run(
    cloud: &dyn Cloud,
    config: &RunConfig,
    checkpoint: &mut Checkpoint,
    reporter: &mut dyn Reporter,
) -> Result<Outcome> {
    let resumed = checkpoint.is_resumed();
    if resumed {
        reporter.info(&format!(
            "resuming from {} ({} of {} steps done)",
            checkpoint.path().display(),
            checkpoint.completed.len(),
            Step::ALL.len()
        ));
    }

    reporter.step(Step::Validate);
    config.validate()?;
    reporter.success(&format!(
        "prefix {}, domain {}, location {}",
        config.prefix, config.domain, config.location
    ));
    checkpoint.complete(Step::Validate)?;

    reporter.step(Step::Account);
    let account = read_account(cloud, checkpoint)?;
    reporter.success(&format!(
        "subscription {} ({}), tenant {}",
        account.subscription_name, account.subscription_id, account.tenant_id
    ));
    checkpoint.complete(Step::Account)?;

    let ctx = RunContext {
        config,
        resource_group: config.resource_group(),
        account,
    };

    reporter.step(Step::Providers);
    register_providers(cloud, reporter)?;
    checkpoint.complete(Step::Providers)?;

    reporter.step(Step::ResourceGroup);
    ensure_resource_group(cloud, &ctx, reporter)?;
    checkpoint.complete(Step::ResourceGroup)?;

    reporter.step(Step::Identity);
    let credential = provision_identity(cloud, &ctx, checkpoint, reporter)?;
    checkpoint.complete(Step::Identity)?;

    reporter.step(Step::Roles);
    assign_roles(cloud, &ctx, &credential, checkpoint, reporter)?;
    checkpoint.complete(Step::Roles)?;

    reporter.step(Step::PlatformIdentity);
    let rp_object_id = cloud.find_service_principal(constants::ARO_RP_DISPLAY_NAME)?;
    reporter.success(&format!("{} is {}", constants::ARO_RP_DISPLAY_NAME, rp_object_id));
    checkpoint.rp_object_id = Some(rp_object_id.clone());
    checkpoint.complete(Step::PlatformIdentity)?;

    reporter.step(Step::PullSecret);
    let pull_secret = variables::load_pull_secret(config)?;
    match &pull_secret {
        Some(_) => reporter.success(&format!(
            "loaded {}",
            config.pull_secret.path().display()
        )),
        None => reporter.warn(&format!(
            "{} not found; cluster will be built without registry pull credentials",
            config.pull_secret.path().display()
        )),
    }
    checkpoint.complete(Step::PullSecret)?;

    reporter.step(Step::Emit);
    let vars = Variables {
        config,
        account: &ctx.account,
        credential: &credential,
        rp_object_id: &rp_object_id,
        pull_secret: pull_secret.as_ref().map(|s| s.as_str()).unwrap_or(""),
        generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    };
    let output = vars.write()?;
    reporter.success(&format!("wrote {}", output.display()));

    // Nothing left to resume.
    checkpoint.remove()?;
    info!(output = %output.display(), "bootstrap complete");

    Ok(Outcome {
        output,
        resource_group: ctx.resource_group.clone(),
        service_principal: credential.display_name.clone(),
        app_id: credential.app_id.clone(),
        subscription_name: ctx.account.subscription_name.clone(),
        resumed,
        pull_secret: pull_secret.is_some(),
    })
}

/// Read the session's account. When resuming a run that already created
/// cloud objects, the subscription must match the checkpoint.
fn read_account(cloud: &dyn Cloud, checkpoint: &mut Checkpoint) -> Result<AccountContext> {
    let account = cloud.account()?;
    if let Some(previous) = &checkpoint.account {
        if checkpoint.owns_cloud_objects()
            && previous.subscription_id != account.subscription_id
        {
            debug!(
                previous = %previous.subscription_id,
                current = %account.subscription_id,
                "subscription changed since checkpoint"
            );
            return Err(StateError::Mismatch(checkpoint.path().to_path_buf()).into());
        }
    }
    checkpoint.account = Some(account.clone());
    Ok(account)
}

/// Register every required provider, stopping at the first failure.
pub fn register_providers(cloud: &dyn Cloud, reporter: &mut dyn Reporter) -> Result<()> {
    for namespace in constants::RESOURCE_PROVIDERS {
        debug!(namespace, "registering provider");
        cloud.register_provider(namespace)?;
        reporter.success(&format!("{} registered", namespace));
    }
    Ok(())
}

/// Create the resource group unless it already exists.
///
/// An existing group is reported as a warning and left untouched.
///
/// # Returns
///
/// `true` if the group was created by this call.
pub fn ensure_resource_group(
    cloud: &dyn Cloud,
    ctx: &RunContext<'_>,
    reporter: &mut dyn Reporter,
) -> Result<bool> {
    if cloud.group_exists(&ctx.resource_group)? {
        reporter.warn(&format!(
            "resource group {} already exists, reusing it",
            ctx.resource_group
        ));
        return Ok(false);
    }

    cloud.create_group(&ctx.resource_group, &ctx.config.location)?;
    reporter.success(&format!(
        "created resource group {} in {}",
        ctx.resource_group, ctx.config.location
    ));
    Ok(true)
}

/// Create the cluster service principal, or reuse the one from the
/// checkpoint with a freshly issued secret.
fn provision_identity(
    cloud: &dyn Cloud,
    ctx: &RunContext<'_>,
    checkpoint: &mut Checkpoint,
    reporter: &mut dyn Reporter,
) -> Result<ServicePrincipalCredential> {
    let (record, secret) = match checkpoint.identity.clone() {
        Some(record) => {
            let reset = cloud.reset_credential(&record.app_id)?;
            reporter.info(&format!(
                "reusing service principal {} from checkpoint, issued a new client secret",
                record.display_name
            ));
            (record, reset.client_secret)
        }
        None => {
            let display_name = service_principal_name(&ctx.config.prefix);
            let created = cloud.create_service_principal(&display_name)?;
            let record = IdentityRecord {
                display_name,
                app_id: created.app_id,
                object_id: None,
            };
            // Persist before the lookup so a failed lookup never leads to a
            // second service principal.
            checkpoint.identity = Some(record.clone());
            checkpoint.save()?;
            reporter.success(&format!(
                "created service principal {} (app id {})",
                record.display_name, record.app_id
            ));
            (record, created.client_secret)
        }
    };

    let object_id = match record.object_id.clone() {
        Some(id) => id,
        None => {
            let app_id = record.app_id.clone();
            let retry = &ctx.config.object_id_retry;
            let id = retry_with_backoff_if(
                retry,
                "service principal object id",
                Error::is_not_yet_visible,
                || cloud.service_principal_object_id(&app_id),
            )
            .map_err(|e| {
                if !e.is_not_yet_visible() {
                    return e;
                }
                debug!(error = %e, "giving up on object id lookup");
                AzureError::ObjectIdUnavailable {
                    app_id: app_id.clone(),
                    attempts: retry.max_attempts,
                }
                .into()
            })?;
            if let Some(identity) = checkpoint.identity.as_mut() {
                identity.object_id = Some(id.clone());
            }
            checkpoint.save()?;
            id
        }
    };
    debug!(object_id = %object_id, "service principal visible in directory");

    Ok(ServicePrincipalCredential {
        display_name: record.display_name,
        app_id: record.app_id,
        client_secret: secret,
        object_id,
    })
}

/// Bind every role in [`constants::ROLES`] on the resource group.
///
/// Roles already recorded in the checkpoint are skipped. Aborts on the
/// first failure without undoing earlier bindings.
fn assign_roles(
    cloud: &dyn Cloud,
    ctx: &RunContext<'_>,
    credential: &ServicePrincipalCredential,
    checkpoint: &mut Checkpoint,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let scope = ctx.scope();
    for role in constants::ROLES {
        if checkpoint.roles.iter().any(|r| r == role) {
            reporter.info(&format!("{} already assigned", role));
            continue;
        }
        cloud.assign_role(role, &credential.object_id, &scope)?;
        checkpoint.roles.push(role.to_string());
        checkpoint.save()?;
        reporter.success(&format!("assigned {} on {}", role, ctx.resource_group));
    }
    Ok(())
}

/// Display name `<prefix>-sp-<random>` for a new service principal.
pub fn service_principal_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|b| (b as char).to_ascii_lowercase())
        .take(constants::SP_SUFFIX_LEN)
        .collect();
    format!("{}-sp-{}", prefix, suffix)
}
