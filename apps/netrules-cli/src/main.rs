use clap::{Parser, Subcommand};
use netrules_sdk::{HeaderMode, DEFAULT_ES_FIELD};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use config::{MatchConfig, MatchOverrides};
use error::CliResult;

#[derive(Parser)]
#[command(name = "netrules")]
#[command(about = "netrules - IP membership reports and rule conversions from CSV exports")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match addresses against account CIDRs/ranges and write membership reports
    MatchIps {
        /// YAML file with paths and policies (flags override it)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Single-column address file
        #[arg(long)]
        ips: Option<PathBuf>,

        /// Pipe-delimited account|spec-list file
        #[arg(long)]
        account_cidrs: Option<PathBuf>,

        /// Report of matched addresses
        #[arg(long)]
        matched_out: Option<PathBuf>,

        /// Report of addresses without a match
        #[arg(long)]
        not_matched_out: Option<PathBuf>,

        /// Per-account match counts
        #[arg(long)]
        summary_out: Option<PathBuf>,

        /// Header handling for input files: auto, present or absent
        #[arg(long)]
        header: Option<HeaderMode>,

        /// Skip and log malformed network specs instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Print Elasticsearch range clauses for every CIDR of an account file
    EsRanges {
        /// Pipe-delimited file with a CIDRS column
        #[arg(long, default_value = "ip-match-csv/account_cidrs.csv")]
        account_cidrs: PathBuf,

        /// Address field to query
        #[arg(long, default_value = DEFAULT_ES_FIELD)]
        field: String,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Group security-group rules by GroupName and convert them to numbered JSON rules
    SgRules {
        /// Pipe-delimited rule export
        #[arg(long, alias = "csv_file_path")]
        csv_file_path: PathBuf,

        /// Comma-separated environments to include
        #[arg(long, alias = "env_include")]
        env_include: String,

        /// Output JSON file
        #[arg(long, alias = "output_path")]
        output_path: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::MatchIps {
            config,
            ips,
            account_cidrs,
            matched_out,
            not_matched_out,
            summary_out,
            header,
            skip_invalid,
        } => {
            let overrides = MatchOverrides {
                ips_csv: ips,
                account_cidrs_csv: account_cidrs,
                matched_out,
                not_matched_out,
                summary_out,
                header_mode: header,
                skip_invalid,
            };
            let config = MatchConfig::resolve(config.as_deref(), overrides)?;
            commands::match_ips::execute(config)
        }

        Commands::EsRanges {
            account_cidrs,
            field,
            output,
        } => commands::es_ranges::execute(account_cidrs, field, output),

        Commands::SgRules {
            csv_file_path,
            env_include,
            output_path,
        } => commands::sg_rules::execute(csv_file_path, env_include, output_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sg_rules_accepts_underscored_flags() {
        let cli = Cli::try_parse_from([
            "netrules",
            "sg-rules",
            "--csv_file_path",
            "rules.csv",
            "--env_include",
            "prod,qa",
            "--output_path",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Commands::SgRules { env_include, .. } => assert_eq!(env_include, "prod,qa"),
            _ => panic!("expected sg-rules"),
        }
    }

    #[test]
    fn test_match_ips_header_flag() {
        let cli =
            Cli::try_parse_from(["netrules", "match-ips", "--header", "absent", "--skip-invalid"])
                .unwrap();

        match cli.command {
            Commands::MatchIps {
                header,
                skip_invalid,
                ..
            } => {
                assert_eq!(header, Some(HeaderMode::Absent));
                assert!(skip_invalid);
            }
            _ => panic!("expected match-ips"),
        }
    }
}
