use std::path::Path;

use thiserror::Error;

use crate::settings::types::PipelineSettings;

/// Settings persistence errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load settings from a JSON file, returning defaults on a missing file.
pub fn load(path: &Path) -> Result<PipelineSettings, SettingsError> {
    if !path.exists() {
        return Ok(PipelineSettings::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save settings to disk atomically (write `.tmp` then rename).
pub fn save(path: &Path, settings: &PipelineSettings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}
