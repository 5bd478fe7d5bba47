mod args;
mod config;
mod dirs;
mod picker;

use std::error::Error;
use std::io;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use costs_app::services::render_listings;
use costs_app::{
    AppError, AppPaths, AppState, CollectOptions, OutputTarget, ReportFormat, ReportOptions,
    SubscriptionChoice, SubscriptionSelector, ensure_app_data_dir,
};
use costs_collect::AzureClient;
use costs_core::BillingPeriod;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, CollectArgs, Command, GenerateArgs, SubscriptionArgs};
use crate::config::CliConfig;

const DEFAULT_LOG_FILTER: &str = "azcosts=info,costs_app=info,costs_collect=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    let config = config::load_or_create(&data_dir).map_err(io::Error::other)?;
    if config.created {
        info!(path = %config.file.display(), "created default config");
    }

    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths)?;
    debug!(path = %paths.db_path.display(), "using cost store");
    let app_state = AppState::new(paths.db_path);

    match cli.command {
        Command::Subscription(args) => list_subscriptions(&app_state, args).await?,
        Command::Collect(args) => collect(&app_state, args).await?,
        Command::Generate(args) => generate(&app_state, &config.config, args)?,
        Command::Status => {
            let db = app_state.initialize(false)?;
            print!("{}", app_state.services.status.render(&db)?);
            db.close()?;
        }
    }
    Ok(())
}

async fn list_subscriptions(app_state: &AppState, args: SubscriptionArgs) -> Result<(), AppError> {
    let db = app_state.initialize(false)?;
    let client = AzureClient::new()?;
    let listings = app_state
        .services
        .subscriptions
        .list(&db, &client, args.name.as_deref())
        .await?;
    print!("{}", render_listings(&listings));
    db.close()?;
    Ok(())
}

async fn collect(app_state: &AppState, args: CollectArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let current = BillingPeriod::containing(now);
    let options = CollectOptions {
        subscription: SubscriptionSelector::from_flags(args.subscription, args.name)?,
        year: args.year.unwrap_or_else(|| current.year()),
        month: args.month.unwrap_or_else(|| current.month()),
        single: args.single,
        overwrite: args.overwrite,
        truncate: args.truncate,
    };
    // Reject bad periods before touching the store.
    options.periods(now)?;

    let mut db = app_state.initialize(options.truncate)?;
    let client = AzureClient::new()?;
    let subscription_id = match &options.subscription {
        SubscriptionSelector::Id(id) => id.clone(),
        SubscriptionSelector::Name(filter) => {
            match app_state
                .services
                .collect
                .resolve_subscription(&client, filter)
                .await?
            {
                SubscriptionChoice::Single(subscription) => subscription.id,
                SubscriptionChoice::Ambiguous(choices) => {
                    let stdin = io::stdin();
                    let picked = picker::pick_subscription(&choices, stdin.lock(), io::stdout())?;
                    picked
                        .map(|subscription| subscription.id.clone())
                        .ok_or_else(|| AppError::InvalidInput("no subscription selected".to_string()))?
                }
            }
        }
    };

    let stats = app_state
        .services
        .collect
        .run(&mut db, &client, &subscription_id, &options, now)
        .await?;
    db.close()?;
    if stats.periods_collected.is_empty() {
        info!(
            subscription = %subscription_id,
            "all requested periods were already collected, use --overwrite to collect them again"
        );
    }
    Ok(())
}

fn generate(app_state: &AppState, config: &CliConfig, args: GenerateArgs) -> Result<(), AppError> {
    let format: ReportFormat = args
        .format
        .as_deref()
        .unwrap_or(config.default_format.as_str())
        .parse()?;
    let options = ReportOptions {
        format,
        target: OutputTarget::from_flags(args.stdout, args.path)?,
        months: args.months.unwrap_or(config.default_months),
    };
    options.validate()?;

    let db = app_state.initialize(false)?;
    app_state.services.report.generate(&db, &options)?;
    db.close()?;
    if let OutputTarget::File(path) = &options.target {
        info!(path = %path.display(), format = %options.format, "report written");
    }
    Ok(())
}
