use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

/// Collects billing data from Azure and produces summarized cost reports
#[derive(Parser, Debug)]
#[command(name = "azcosts", version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Displays subscriptions available to the current user
    Subscription(SubscriptionArgs),
    /// Collects data from Azure and persists it into the local store
    Collect(CollectArgs),
    /// Produces a summarized output of the billing data
    Generate(GenerateArgs),
    /// Displays the billing periods collected for each subscription
    Status,
}

#[derive(Args, Debug)]
pub struct SubscriptionArgs {
    /// Full or partial name to filter by; lists everything when omitted
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["subscription", "name"])))]
pub struct CollectArgs {
    /// Id (guid) of the subscription to collect costs for
    #[arg(long)]
    pub subscription: Option<String>,

    /// Full or partial subscription name, when the id is not known
    #[arg(long)]
    pub name: Option<String>,

    /// Year of the billing period [default: current year]
    #[arg(long)]
    pub year: Option<i32>,

    /// Month of the billing period [default: current month]
    #[arg(long)]
    pub month: Option<u32>,

    /// Collect only the given period instead of every period up to now
    #[arg(long)]
    pub single: bool,

    /// Re-collect periods that are already stored
    #[arg(long)]
    pub overwrite: bool,

    /// Discard all stored data before collecting
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output format: text, csv, json or excel [default: from config]
    #[arg(long)]
    pub format: Option<String>,

    /// Write the report to stdout
    #[arg(long, conflicts_with = "path")]
    pub stdout: bool,

    /// File to write the report to when not using stdout
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Number of months to report over [default: from config]
    #[arg(long)]
    pub months: Option<u32>,
}
