/*!
# Security-Group Rule Formatting

Turns a security-group rule export into the numbered rule list consumed as
product parameters:

```json
[
  { "key": "Rule1", "Value": "web,ingress,tcp,443,443,10.0.0.0/16,,https" }
]
```

Rows are filtered by environment, grouped by `GroupName` in first-seen order,
and numbered continuously across groups.
*/

use crate::errors::SdkResult;
use indexmap::IndexMap;
use netrules_csvs::{read_sg_rules_csv, SgRuleRow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

const RULE_KEY_PREFIX: &str = "Rule";
const VALUE_SEPARATOR: &str = ",";

/// Rules grouped by security group, in first-seen order
pub type GroupedRules = IndexMap<String, Vec<SgRuleRow>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductParamRule {
    pub key: String,

    #[serde(rename = "Value")]
    pub value: String,
}

/// Split a comma-separated environment list, lower-cased
pub fn parse_env_filters(env_include: &str) -> Vec<String> {
    env_include
        .split(',')
        .map(|env| env.trim().to_lowercase())
        .filter(|env| !env.is_empty())
        .collect()
}

/// Keep rows whose `Env` is listed (case-insensitive) and group them
pub fn group_by_group_name(rows: Vec<SgRuleRow>, env_filters: &[String]) -> GroupedRules {
    let mut grouped = GroupedRules::new();

    for row in rows {
        let env = row.env.to_lowercase();
        if env_filters.iter().any(|filter| *filter == env) {
            grouped
                .entry(row.group_name.clone())
                .or_default()
                .push(row);
        }
    }

    grouped
}

/// Number every rule across all groups, starting at `Rule1`
pub fn format_rules(grouped: &GroupedRules) -> Vec<ProductParamRule> {
    grouped
        .values()
        .flatten()
        .enumerate()
        .map(|(index, row)| ProductParamRule {
            key: format!("{}{}", RULE_KEY_PREFIX, index + 1),
            value: rule_value(row),
        })
        .collect()
}

fn rule_value(row: &SgRuleRow) -> String {
    [
        row.group_name.as_str(),
        row.rule_type.as_str(),
        row.protocol.as_str(),
        row.from_port.as_str(),
        row.to_port.as_str(),
        row.cidr_range.as_str(),
        row.sg_reference.as_str(),
        row.description.as_str(),
    ]
    .join(VALUE_SEPARATOR)
}

/// Read `csv_path`, format the rules and write them as JSON to `output_path`.
///
/// Returns the number of rules written.
pub fn convert_sg_rules(
    csv_path: &Path,
    env_filters: &[String],
    output_path: &Path,
) -> SdkResult<usize> {
    let rows = read_sg_rules_csv(csv_path)?;
    let total = rows.len();

    let grouped = group_by_group_name(rows, env_filters);
    let rules = format_rules(&grouped);
    info!(
        "Kept {} of {} rule(s) in {} group(s) for env(s) {:?}",
        rules.len(),
        total,
        grouped.len(),
        env_filters
    );

    let json = serde_json::to_string_pretty(&rules)?;
    fs::write(output_path, json)?;

    Ok(rules.len())
}
