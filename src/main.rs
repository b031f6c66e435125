use std::collections::HashMap;

use clap::{Args, Parser, Subcommand};

mod aws;
mod cli;
mod config;
mod error;
mod remote;
mod runner;
mod session;
mod ssh;
mod state;
#[cfg(test)]
mod testing;
mod ui;

pub use error::{Result, SsmSshError};

#[derive(Parser)]
#[command(name = "ssm-ssh")]
#[command(about = "Temporary SSH access to EC2 instances over SSM Session Manager")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key, authorize it on the instance and configure ssh
    Setup {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Revoke the key on the instance and delete it locally
    Cleanup {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

/// Action inputs; when running under GitHub Actions they default to the
/// step's `with:` values.
#[derive(Args)]
struct InputArgs {
    /// Target instance id (e.g. i-1234567890abcdef0)
    #[arg(long)]
    ec2_instance_id: Option<String>,

    /// User whose authorized_keys receives the key
    #[arg(long)]
    remote_user: Option<String>,

    /// AWS region (default: AWS_REGION, then AWS_DEFAULT_REGION)
    #[arg(long)]
    aws_region: Option<String>,
}

impl Commands {
    fn inputs(&self) -> &InputArgs {
        match self {
            Commands::Setup { inputs } | Commands::Cleanup { inputs } => inputs,
        }
    }
}

impl InputArgs {
    /// Inputs given as flags, keyed by action input name
    fn overrides(&self) -> HashMap<String, String> {
        [
            (config::EC2_INSTANCE_ID, &self.ec2_instance_id),
            (config::REMOTE_USER, &self.remote_user),
            (config::AWS_REGION, &self.aws_region),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
        .collect()
    }
}

/// Initialize logging for internal diagnostics (stderr, `RUST_LOG` aware)
fn init_logging(debug: bool) {
    let default_filter = if debug { "ssm_ssh=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let runner = runner::detect(cli.command.inputs().overrides(), cli.verbose);
    init_logging(runner.is_debug());

    match cli.command {
        Commands::Setup { .. } => {
            cli::commands::setup::execute(runner.as_ref()).await?;
        }
        Commands::Cleanup { .. } => {
            cli::commands::cleanup::execute(runner.as_ref()).await;
        }
    }

    if runner.has_failed() {
        std::process::exit(1);
    }
    Ok(())
}
