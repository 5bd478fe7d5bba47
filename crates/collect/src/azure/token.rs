use std::env;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

use super::MANAGEMENT_ENDPOINT;
use crate::types::{CollectError, Result};

const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";

/// Bearer token for the management API, resolved once per client.
#[derive(Debug, Default)]
pub struct TokenProvider {
    fixed: Option<String>,
    cached: OnceCell<String>,
}

impl TokenProvider {
    /// Uses `AZURE_ACCESS_TOKEN` when set, otherwise asks the Azure CLI.
    pub fn from_env() -> Self {
        let fixed = env::var(ACCESS_TOKEN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            fixed,
            cached: OnceCell::new(),
        }
    }

    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            fixed: Some(token.into()),
            cached: OnceCell::new(),
        }
    }

    pub async fn token(&self) -> Result<String> {
        if let Some(token) = &self.fixed {
            return Ok(token.clone());
        }
        self.cached
            .get_or_try_init(azure_cli_token)
            .await
            .cloned()
    }
}

async fn azure_cli_token() -> Result<String> {
    debug!("requesting access token from the azure cli");
    let output = Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            MANAGEMENT_ENDPOINT,
            "--query",
            "accessToken",
            "--output",
            "tsv",
        ])
        .output()
        .await
        .map_err(|err| CollectError::Token(format!("unable to run az: {err}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CollectError::Token(stderr.trim().to_string()));
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(CollectError::Token("az returned an empty token".to_string()));
    }
    Ok(token)
}
