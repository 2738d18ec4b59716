//! Configuration structures for parsing and uploading Standard 18 files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::service_user::ServiceUser;
use crate::error::{BacsError, Result};

/// Main configuration for bacs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BacsConfig {
    /// Parsing and verification configuration.
    pub parse: ParseConfig,

    /// Upload configuration.
    pub upload: UploadConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Compare computed batch totals with each user trailer.
    pub verify_totals: bool,

    /// Service user whose permitted transaction codes are enforced.
    pub service_user: Option<ServiceUser>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            verify_totals: true,
            service_user: None,
        }
    }
}

/// Upload service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Base URL of the upload service.
    pub host: String,

    /// Path of the upload endpoint, relative to `host`.
    pub endpoint: String,

    /// Multipart form field carrying the file.
    pub form_field: String,

    /// Connectivity check timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Directory that relative file arguments are resolved against.
    pub directory: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8080/".to_string(),
            endpoint: "upload".to_string(),
            form_field: "file".to_string(),
            connect_timeout_ms: 500,
            directory: None,
        }
    }
}

/// Rendering of parse results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

impl BacsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values that deserialize but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if let Some(user) = &self.parse.service_user {
            user.validate()?;
        }
        if self.upload.host.trim().is_empty() {
            return Err(BacsError::Config("upload.host is empty".to_string()));
        }
        if self.upload.form_field.trim().is_empty() {
            return Err(BacsError::Config("upload.form_field is empty".to_string()));
        }
        if self.upload.connect_timeout_ms == 0 {
            return Err(BacsError::Config(
                "upload.connect_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BacsConfig::default();
        assert!(config.parse.verify_totals);
        assert_eq!(config.upload.host, "http://localhost:8080/");
        assert_eq!(config.upload.endpoint, "upload");
        assert_eq!(config.upload.connect_timeout_ms, 500);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: BacsConfig =
            serde_json::from_str(r#"{"upload":{"host":"http://bacs.example:9000/"}}"#).unwrap();
        assert_eq!(config.upload.host, "http://bacs.example:9000/");
        assert_eq!(config.upload.form_field, "file");
        assert!(config.parse.verify_totals);
    }

    #[test]
    fn test_validate() {
        assert!(BacsConfig::default().validate().is_ok());

        let mut config = BacsConfig::default();
        config.upload.connect_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(BacsError::Config(_))));

        let mut config = BacsConfig::default();
        config.parse.service_user = Some(ServiceUser {
            user_number: "12AB56".to_string(),
            ..ServiceUser::new("123456").unwrap()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BacsConfig::default();
        config.output.format = OutputFormat::Csv;
        config.parse.service_user = Some(ServiceUser::new("123456").unwrap());
        config.save(&path).unwrap();

        let loaded = BacsConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Csv);
        assert_eq!(loaded.parse.service_user, config.parse.service_user);
    }
}
