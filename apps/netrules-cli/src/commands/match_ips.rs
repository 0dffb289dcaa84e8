use crate::config::MatchConfig;
use crate::error::CliResult;
use netrules_sdk::{run_ip_match, write_match_reports};
use tracing::info;

pub fn execute(config: MatchConfig) -> CliResult<()> {
    info!("Starting IP match run");
    info!("Address file: {}", config.ips_csv.display());
    info!("Account CIDR file: {}", config.account_cidrs_csv.display());
    info!(
        "Header mode: {:?}, invalid specs: {:?}",
        config.header_mode, config.invalid_spec_policy
    );

    let run = run_ip_match(&config.ips_csv, &config.account_cidrs_csv, config.options())?;

    let paths = config.report_paths();
    write_match_reports(&run, &paths)?;

    println!(
        "Matched {} address(es), {} not matched, {} account(s) with matches",
        run.matched().count(),
        run.not_matched().count(),
        run.tally.len()
    );
    println!("Matched report: {}", paths.matched.display());
    println!("Not matched report: {}", paths.not_matched.display());
    println!("Account summary: {}", paths.summary.display());

    Ok(())
}
