mod collect;
mod report;
mod status;
mod subscriptions;

pub use collect::{CollectService, SubscriptionChoice};
pub use report::ReportService;
pub use status::StatusService;
pub use status::render_status;
pub use subscriptions::{SubscriptionListing, SubscriptionService, render_listings};

/// Service registry for command-level operations. Every service works on the
/// store handle the command opened.
#[derive(Clone, Debug, Default)]
pub struct AppServices {
    pub collect: CollectService,
    pub report: ReportService,
    pub status: StatusService,
    pub subscriptions: SubscriptionService,
}

impl AppServices {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Pads or cuts `value` to a fixed-width column.
fn column(value: &str, width: usize) -> String {
    format!("{:<width$}", crate::formats::truncate_chars(value, width))
}
