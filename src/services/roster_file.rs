use crate::models::Roster;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a roster file
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML roster: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON roster: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported roster format: {0}")]
    UnsupportedFormat(String),
}

/// On-disk roster encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Toml,
    Json,
}

impl RosterFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, RosterError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            other => Err(RosterError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Parse a roster from text
///
/// TOML rosters list families as `[[families]]` tables; JSON rosters are
/// `{"families": [...]}`. The roster is taken as-is, without validation.
pub fn parse_roster(text: &str, format: RosterFormat) -> Result<Roster, RosterError> {
    let roster = match format {
        RosterFormat::Toml => toml::from_str(text)?,
        RosterFormat::Json => serde_json::from_str(text)?,
    };
    Ok(roster)
}

/// Load a roster file, choosing the format from its extension
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Roster, RosterError> {
    let path = path.as_ref();
    let format = RosterFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let roster = parse_roster(&text, format)?;

    tracing::debug!(
        "Loaded roster from {} ({} families)",
        path.display(),
        roster.families.len()
    );

    Ok(roster)
}
