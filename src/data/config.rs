use std::path::Path;

use serde::Deserialize;

use super::error::IngestionError;

/// Label fragments that mark a column as a date/time candidate.
pub const DEFAULT_DATETIME_KEYWORDS: &[&str] = &["date", "month", "year", "time"];

/// Raw tokens read as missing in addition to blank cells.
pub const DEFAULT_PLACEHOLDER_TOKENS: &[&str] = &["-"];

/// Share of informative cells that must coerce for a numeric or datetime
/// classification.
pub const DEFAULT_INFERENCE_THRESHOLD: f64 = 0.9;

/// `chrono` formats tried, in order, after RFC 3339.
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Knobs of the cleaning pipeline. Every field has a default, so a JSON
/// override file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningConfig {
    pub datetime_keywords: Vec<String>,
    pub placeholder_tokens: Vec<String>,
    pub thousands_separator: char,
    pub inference_threshold: f64,
    pub datetime_formats: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            datetime_keywords: to_strings(DEFAULT_DATETIME_KEYWORDS),
            placeholder_tokens: to_strings(DEFAULT_PLACEHOLDER_TOKENS),
            thousands_separator: ',',
            inference_threshold: DEFAULT_INFERENCE_THRESHOLD,
            datetime_formats: to_strings(DEFAULT_DATETIME_FORMATS),
        }
    }
}

impl CleaningConfig {
    /// Read overrides from a JSON file, e.g. `{"inference_threshold": 0.75}`.
    pub fn from_json_file(path: &Path) -> Result<Self, IngestionError> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CleaningConfig = serde_json::from_str(&text)
            .map_err(|e| IngestionError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestionError> {
        if !(self.inference_threshold > 0.0 && self.inference_threshold <= 1.0) {
            return Err(IngestionError::Config(format!(
                "inference_threshold must be in (0, 1], got {}",
                self.inference_threshold
            )));
        }
        if self.thousands_separator == '.' {
            return Err(IngestionError::Config(
                "thousands_separator cannot be the decimal point".into(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive substring match against the date/time vocabulary.
    pub fn is_datetime_label(&self, label: &str) -> bool {
        let lower = label.to_lowercase();
        self.datetime_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }

    /// Labels under which a bare four-digit number is read as a year.
    pub fn is_year_label(&self, label: &str) -> bool {
        label.to_lowercase().contains("year")
    }

    /// Blank cells and placeholder tokens carry no data.
    pub fn is_placeholder(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.placeholder_tokens.iter().any(|t| t == trimmed)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn label_vocabulary_is_case_insensitive() {
        let config = CleaningConfig::default();
        assert!(config.is_datetime_label("Month/Year"));
        assert!(config.is_datetime_label("PICKUP DATE"));
        assert!(!config.is_datetime_label("Trips Per Day"));
        assert!(config.is_year_label("Month/Year"));
        assert!(!config.is_year_label("Total Trip Time"));
    }

    #[test]
    fn placeholders_cover_blank_and_dash() {
        let config = CleaningConfig::default();
        assert!(config.is_placeholder(""));
        assert!(config.is_placeholder("   "));
        assert!(config.is_placeholder(" - "));
        assert!(!config.is_placeholder("-5"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"inference_threshold": 0.5}}"#).unwrap();

        let config = CleaningConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.inference_threshold, 0.5);
        assert_eq!(config.thousands_separator, ',');
        assert_eq!(config.placeholder_tokens, vec!["-".to_string()]);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"inference_threshold": 1.5}}"#).unwrap();

        let err = CleaningConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, IngestionError::Config(_)));
    }
}
