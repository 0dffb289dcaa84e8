use crate::error::CliResult;
use netrules_sdk::{es_range_queries_from_csv, render_es_queries};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub fn execute(
    account_cidrs_csv: PathBuf,
    field: String,
    output: Option<PathBuf>,
) -> CliResult<()> {
    info!(
        "Building Elasticsearch range clauses on '{}' from {}",
        field,
        account_cidrs_csv.display()
    );

    let clauses = es_range_queries_from_csv(&account_cidrs_csv, &field)?;
    let rendered = render_es_queries(&clauses)?;

    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!("Output written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
