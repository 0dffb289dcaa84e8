use crate::error::{CliError, CliResult};
use netrules_sdk::{HeaderMode, InvalidSpecPolicy, MatchOptions, ReportPaths};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of a `match-ips` run.
///
/// Loaded from an optional YAML file; any field left out falls back to the
/// historical `ip-match-csv/` layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchConfig {
    /// Single-column address file
    pub ips_csv: PathBuf,

    /// `account|spec-list` file
    pub account_cidrs_csv: PathBuf,

    pub matched_out: PathBuf,
    pub not_matched_out: PathBuf,
    pub summary_out: PathBuf,

    /// Header handling for both input files
    pub header_mode: HeaderMode,

    /// What to do with spec tokens that do not parse
    pub invalid_spec_policy: InvalidSpecPolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ips_csv: PathBuf::from("ip-match-csv/ips.csv"),
            account_cidrs_csv: PathBuf::from("ip-match-csv/account_cidrs.csv"),
            matched_out: PathBuf::from("ip-match-csv/result_ips_matched.csv"),
            not_matched_out: PathBuf::from("ip-match-csv/result_ips_not_matched.csv"),
            summary_out: PathBuf::from("ip-match-csv/result_account_summary.csv"),
            header_mode: HeaderMode::Auto,
            invalid_spec_policy: InvalidSpecPolicy::FailFast,
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct MatchOverrides {
    pub ips_csv: Option<PathBuf>,
    pub account_cidrs_csv: Option<PathBuf>,
    pub matched_out: Option<PathBuf>,
    pub not_matched_out: Option<PathBuf>,
    pub summary_out: Option<PathBuf>,
    pub header_mode: Option<HeaderMode>,
    pub skip_invalid: bool,
}

impl MatchConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(config_path: Option<&Path>, overrides: MatchOverrides) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(path) = overrides.ips_csv {
            config.ips_csv = path;
        }
        if let Some(path) = overrides.account_cidrs_csv {
            config.account_cidrs_csv = path;
        }
        if let Some(path) = overrides.matched_out {
            config.matched_out = path;
        }
        if let Some(path) = overrides.not_matched_out {
            config.not_matched_out = path;
        }
        if let Some(path) = overrides.summary_out {
            config.summary_out = path;
        }
        if let Some(mode) = overrides.header_mode {
            config.header_mode = mode;
        }
        if overrides.skip_invalid {
            config.invalid_spec_policy = InvalidSpecPolicy::SkipAndLog;
        }

        config.validate()?;
        Ok(config)
    }

    /// Outputs must be distinct from each other and from the inputs
    pub fn validate(&self) -> CliResult<()> {
        let paths = [
            ("ips_csv", &self.ips_csv),
            ("account_cidrs_csv", &self.account_cidrs_csv),
            ("matched_out", &self.matched_out),
            ("not_matched_out", &self.not_matched_out),
            ("summary_out", &self.summary_out),
        ];

        for (i, (name, path)) in paths.iter().enumerate() {
            for (other_name, other_path) in &paths[i + 1..] {
                if path == other_path {
                    return Err(CliError::InvalidConfig(format!(
                        "{} and {} both point to {}",
                        name,
                        other_name,
                        path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            header_mode: self.header_mode,
            invalid_spec_policy: self.invalid_spec_policy,
        }
    }

    pub fn report_paths(&self) -> ReportPaths {
        ReportPaths {
            matched: self.matched_out.clone(),
            not_matched: self.not_matched_out.clone(),
            summary: self.summary_out.clone(),
        }
    }
}
