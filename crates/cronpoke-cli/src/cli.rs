//! CLI definitions for the `cronpoke` binary.
//!
//! Uses clap derive macros. Every configuration flag has an environment
//! variable fallback, so a deployment can run `cronpoke run` with no
//! arguments at all and configure everything through the environment.

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use std::sync::Arc;

use cronpoke_core::config::TriggerConfig;

/// Fire an authenticated HTTP POST on a cron schedule.
#[derive(Parser)]
#[command(name = "cronpoke", version, about, long_about = None)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scheduler until interrupted, firing one trigger per tick.
    Run {
        /// Cron expression controlling when the trigger fires (5- or 6-field).
        #[arg(long, env = "CRON_TIMER")]
        schedule: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fire a single trigger immediately and exit.
    Once {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Where the trigger is sent and how it authenticates.
///
/// Base URL and API key are deliberately optional here: their absence is a
/// per-tick condition (logged and skipped), not a parse error, so the
/// daemon keeps running on an incomplete environment.
#[derive(Args)]
pub struct TargetArgs {
    /// Base URL of the target service.
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Path appended verbatim to the base URL.
    #[arg(long, env = "ENDPOINT_PATH", default_value = "")]
    pub endpoint_path: String,

    /// Shared-secret credential sent as the x-api-key header.
    #[arg(long, env = "SCHEDULER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl TargetArgs {
    /// Build the trigger configuration. Absent values become empty strings;
    /// the runner reports them per tick.
    pub fn into_config(self, schedule: String) -> Arc<TriggerConfig> {
        Arc::new(TriggerConfig {
            schedule,
            base_url: self.base_url.unwrap_or_default(),
            endpoint_path: self.endpoint_path,
            api_key: SecretString::from(self.api_key.unwrap_or_default()),
        })
    }
}
