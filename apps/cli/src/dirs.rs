use std::path::PathBuf;

const DATA_DIR_NAME: &str = ".azure-costs";

/// `~/.azure-costs`, holding the cost store and the config file.
pub fn resolve_data_dir() -> Result<PathBuf, String> {
    let home = ::dirs::home_dir().ok_or_else(|| "resolve home directory".to_string())?;
    Ok(home.join(DATA_DIR_NAME))
}
