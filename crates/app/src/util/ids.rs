use uuid::Uuid;

use crate::error::{AppError, Result};

/// Validates a subscription id and returns it in lowercase hyphenated form.
pub fn normalize_subscription_id(value: &str) -> Result<String> {
    let parsed = Uuid::parse_str(value.trim()).map_err(|_| {
        AppError::InvalidInput("invalid subscription id, must be a valid guid".to_string())
    })?;
    Ok(parsed.hyphenated().to_string())
}
