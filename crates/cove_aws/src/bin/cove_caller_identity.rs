use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;
use clap::Parser;
use cove_aws::{session_sdk_config, OrganizationsDirectory, StsCredentialIssuer};
use cove_core::config::{DEFAULT_PARTITION, DEFAULT_WORKERS};
use cove_core::{AccountSession, CoveConfig, RunnerKind};
use cove_runner::{export_to_csv, export_to_json, Cove};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cove-caller-identity",
    about = "Run sts:GetCallerIdentity in every member account of an organization",
    long_about = "Assumes a role in each target account and reports the identity seen there.\n\
                  Without --target-ids every active member account except the caller's own is targeted."
)]
struct Cli {
    /// Comma-separated account ids to target
    #[arg(long, env = "COVE_TARGET_IDS", value_delimiter = ',')]
    target_ids: Vec<String>,
    /// Comma-separated account ids to skip (12 characters each)
    #[arg(long, env = "COVE_IGNORE_IDS", value_delimiter = ',')]
    ignore_ids: Vec<String>,
    /// Role to assume in each account
    #[arg(long, env = "COVE_ROLE_NAME")]
    role_name: Option<String>,
    /// Session name for the assumed role (defaults to the role name)
    #[arg(long, env = "COVE_ROLE_SESSION_NAME")]
    role_session_name: Option<String>,
    #[arg(long, env = "COVE_PARTITION", default_value = DEFAULT_PARTITION)]
    partition: String,
    /// Abort on the first failing account
    #[arg(long)]
    raise_exception: bool,
    /// Skip organizations:DescribeAccount enrichment
    #[arg(long)]
    no_org_master: bool,
    /// Worker count for both session and operation stages
    #[arg(long, env = "COVE_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// pooled, sequential or streaming
    #[arg(long, env = "COVE_RUNNER", default_value_t = RunnerKind::Pooled)]
    runner: RunnerKind,
    /// Show progress bars on stderr
    #[arg(long)]
    progress: bool,
    /// Named profile for the base credentials
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,
    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
    #[arg(long)]
    output_json: Option<PathBuf>,
    #[arg(long)]
    output_csv: Option<PathBuf>,
}

impl Cli {
    fn cove_config(&self) -> CoveConfig {
        let mut config = CoveConfig::default()
            .with_partition(self.partition.clone())
            .with_raise_exception(self.raise_exception)
            .with_org_master(!self.no_org_master)
            .with_workers(self.workers, self.workers)
            .with_runner(self.runner)
            .with_progress(self.progress);
        if !self.target_ids.is_empty() {
            config = config.with_target_ids(self.target_ids.iter().cloned());
        }
        if !self.ignore_ids.is_empty() {
            config = config.with_ignore_ids(self.ignore_ids.iter().cloned());
        }
        if let Some(role_name) = &self.role_name {
            config = config.with_role_name(role_name.clone());
        }
        if let Some(role_session_name) = &self.role_session_name {
            config = config.with_role_session_name(role_session_name.clone());
        }
        config
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CallerIdentity {
    account: Option<String>,
    arn: Option<String>,
    user_id: Option<String>,
}

fn caller_identity(
    session: &AccountSession,
    base: &SdkConfig,
    runtime: &Handle,
) -> Result<CallerIdentity, String> {
    let client = aws_sdk_sts::Client::new(&session_sdk_config(session, base));
    runtime.block_on(async move {
        client
            .get_caller_identity()
            .send()
            .await
            .map(|output| CallerIdentity {
                account: output.account().map(str::to_string),
                arn: output.arn().map(str::to_string),
                user_id: output.user_id().map(str::to_string),
            })
            .map_err(|error| DisplayErrorContext(&error).to_string())
    })
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Built by hand so the calling thread stays outside the runtime and may block on it.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &cli.profile {
        loader = loader.profile_name(profile);
    }
    let base = runtime.block_on(loader.load());

    let directory = Arc::new(OrganizationsDirectory::from_config(&base, handle.clone()));
    let issuer = Arc::new(StsCredentialIssuer::from_config(&base, handle.clone()));
    let cove = Cove::new(cli.cove_config(), directory, issuer);

    let output = cove.run(|session| caller_identity(session, &base, &handle))?;

    if let Some(path) = &cli.output_json {
        export_to_json(&output, path)?;
        info!(path = %path.display(), "Wrote JSON output");
    }
    if let Some(path) = &cli.output_csv {
        export_to_csv(&output, path)?;
        info!(path = %path.display(), "Wrote CSV output");
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "cove-caller-identity failed");
            ExitCode::FAILURE
        }
    }
}
