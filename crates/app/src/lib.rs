pub mod app;
pub mod config;
pub mod error;
pub mod formats;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{CollectOptions, OutputTarget, ReportFormat, ReportOptions, SubscriptionSelector};
pub use error::{AppError, Result};
pub use formats::{CostReport, ReportFormatter, formatter_for};
pub use services::{AppServices, SubscriptionChoice, SubscriptionListing};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::ids::normalize_subscription_id;
pub use util::time::resolve_billing_period;
