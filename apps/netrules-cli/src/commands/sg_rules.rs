use crate::error::{CliError, CliResult};
use netrules_sdk::{convert_sg_rules, parse_env_filters};
use std::path::PathBuf;

pub fn execute(
    csv_file_path: PathBuf,
    env_include: String,
    output_path: PathBuf,
) -> CliResult<()> {
    let env_filters = parse_env_filters(&env_include);
    if env_filters.is_empty() {
        return Err(CliError::InvalidConfig(
            "--env-include must name at least one environment".to_string(),
        ));
    }

    let count = convert_sg_rules(&csv_file_path, &env_filters, &output_path)?;
    println!("Wrote {} rule(s)", count);
    println!("Output written to {}", output_path.display());

    Ok(())
}
