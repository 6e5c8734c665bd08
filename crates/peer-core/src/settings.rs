use clap::{CommandFactory, Parser};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PeerError, Result};
use crate::models::{Layout, Period};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Merge per-host relay peer counts from CSV files into one monthly matrix
#[derive(Parser, Debug, Clone)]
#[command(
    name = "relay-peer-calc",
    about = "Merge per-host relay peer counts from CSV files into one monthly matrix",
    version
)]
pub struct Settings {
    /// Directory holding the input CSV files
    #[arg(long, default_value = "../../data/input/")]
    pub input_dir: PathBuf,

    /// Path of the compiled CSV file
    #[arg(long, default_value = "../../data/output/compiled.csv")]
    pub output: PathBuf,

    /// Month to keep, as YYYY-MM
    #[arg(long, default_value = "2023-12")]
    pub month: String,

    /// Output layout: hosts as rows, or dates as rows
    #[arg(long, value_enum, default_value_t = Layout::HostsByDate)]
    pub layout: Layout,

    /// JSON config file supplying defaults for options not given on the command line
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── FileConfig ─────────────────────────────────────────────────────────────────

/// Options read from a `--config` JSON file.
///
/// Every key is optional; values given on the command line always win.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub input_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub month: Option<String>,
    pub layout: Option<Layout>,
}

impl FileConfig {
    /// Load a config file. Unlike the CLI defaults, a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PeerError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── PipelineConfig ─────────────────────────────────────────────────────────────

/// The validated configuration handed to the pipeline entry point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub month: Period,
    #[serde(default)]
    pub layout: Layout,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and merge in the `--config` file, if any.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but with an explicit argument list, so tests
    /// can drive it without spawning a process.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Result<Self> {
        // Raw matches are needed to ask clap where each value came from.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if let Some(path) = settings.config.clone() {
            let file = FileConfig::load_from(&path)?;
            settings.apply_file_config(file, &matches);
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Fill every option that was not given explicitly on the command line
    /// from `file`.
    fn apply_file_config(&mut self, file: FileConfig, matches: &clap::ArgMatches) {
        // NOTE: clap stores the arg id using the field name, not the flag.
        if !is_arg_explicitly_set(matches, "input_dir") {
            if let Some(v) = file.input_dir {
                self.input_dir = v;
            }
        }
        if !is_arg_explicitly_set(matches, "output") {
            if let Some(v) = file.output_path {
                self.output = v;
            }
        }
        if !is_arg_explicitly_set(matches, "month") {
            if let Some(v) = file.month {
                self.month = v;
            }
        }
        if !is_arg_explicitly_set(matches, "layout") {
            if let Some(v) = file.layout {
                self.layout = v;
            }
        }
    }

    /// Validate the settings into a [`PipelineConfig`].
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(PeerError::Config("input directory must not be empty".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(PeerError::Config("output path must not be empty".into()));
        }
        Ok(PipelineConfig {
            input_dir: self.input_dir.clone(),
            output_path: self.output.clone(),
            month: Period::parse(&self.month)?,
            layout: self.layout,
        })
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_config(tmp: &TempDir, json: &str) -> PathBuf {
        let path = tmp.path().join("relay.json");
        std::fs::write(&path, json).expect("write config");
        path
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|s| (*s).into()).collect()
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["relay-peer-calc"]);

        assert_eq!(settings.input_dir, PathBuf::from("../../data/input/"));
        assert_eq!(settings.output, PathBuf::from("../../data/output/compiled.csv"));
        assert_eq!(settings.month, "2023-12");
        assert_eq!(settings.layout, Layout::HostsByDate);
        assert!(settings.config.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_explicit_values() {
        let settings = Settings::parse_from([
            "relay-peer-calc",
            "--input-dir",
            "/srv/in",
            "--output",
            "/srv/out.csv",
            "--month",
            "2024-01",
            "--layout",
            "dates",
        ]);
        assert_eq!(settings.input_dir, PathBuf::from("/srv/in"));
        assert_eq!(settings.output, PathBuf::from("/srv/out.csv"));
        assert_eq!(settings.month, "2024-01");
        assert_eq!(settings.layout, Layout::DatesByHost);
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from_args(args(&["relay-peer-calc", "--debug"])).unwrap();
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── config file ───────────────────────────────────────────────────────────

    #[test]
    fn test_config_file_fills_unset_options() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(
            &tmp,
            r#"{"inputDir": "/cfg/in", "outputPath": "/cfg/out.csv", "month": "2024-03", "layout": "dates"}"#,
        );

        let settings = Settings::load_from_args(args(&[
            "relay-peer-calc",
            "--config",
            path.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(settings.input_dir, PathBuf::from("/cfg/in"));
        assert_eq!(settings.output, PathBuf::from("/cfg/out.csv"));
        assert_eq!(settings.month, "2024-03");
        assert_eq!(settings.layout, Layout::DatesByHost);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"month": "2024-03", "inputDir": "/cfg/in"}"#);

        let settings = Settings::load_from_args(args(&[
            "relay-peer-calc",
            "--config",
            path.to_str().unwrap(),
            "--month",
            "2023-11",
        ]))
        .unwrap();

        assert_eq!(settings.month, "2023-11");
        assert_eq!(settings.input_dir, PathBuf::from("/cfg/in"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("nope.json");
        let result = Settings::load_from_args(args(&[
            "relay-peer-calc",
            "--config",
            missing.to_str().unwrap(),
        ]));
        assert!(matches!(result, Err(PeerError::Config(_))));
    }

    #[test]
    fn test_malformed_config_file_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, "{not json");
        let result = FileConfig::load_from(&path);
        assert!(matches!(result, Err(PeerError::ConfigParse(_))));
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{"inputDirectory": "/x"}"#);
        assert!(FileConfig::load_from(&path).is_err());
    }

    // ── pipeline_config ───────────────────────────────────────────────────────

    #[test]
    fn test_pipeline_config_validates_month() {
        let mut settings = Settings::parse_from(["relay-peer-calc"]);
        let config = settings.pipeline_config().unwrap();
        assert_eq!(config.month.as_str(), "2023-12");
        assert_eq!(config.layout, Layout::HostsByDate);

        settings.month = "2023-1".to_string();
        assert!(matches!(
            settings.pipeline_config(),
            Err(PeerError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_pipeline_config_rejects_empty_paths() {
        let mut settings = Settings::parse_from(["relay-peer-calc"]);
        settings.output = PathBuf::new();
        assert!(matches!(
            settings.pipeline_config(),
            Err(PeerError::Config(_))
        ));
    }

    #[test]
    fn test_pipeline_config_json_shape() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"inputDir": "in", "outputPath": "out.csv", "month": "2023-12"}"#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.layout, Layout::HostsByDate);
    }
}
