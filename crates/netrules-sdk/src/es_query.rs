//! Elasticsearch range clauses built from the `CIDRS` column of an account file.

use crate::errors::SdkResult;
use netrules_csvs::{read_cidrs_column_csv, CidrsCell};
use netrules_matcher::{split_spec_tokens, NetworkSpec};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Decode a `CIDRS` cell into its tokens.
///
/// A cell starting with `[` is read as a JSON string array. When that fails
/// (single-quoted lists, for instance) the spec-list parser takes over. Any
/// other cell is a single token.
pub fn decode_cidrs_cell(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if !cell.starts_with('[') {
        return vec![cell.to_string()];
    }

    match serde_json::from_str::<Vec<String>>(cell) {
        Ok(tokens) => tokens,
        Err(e) => {
            debug!("CIDRS cell {} is not a JSON list ({}), splitting", cell, e);
            split_spec_tokens(cell)
                .into_iter()
                .map(str::to_string)
                .collect()
        }
    }
}

/// One range clause per token, in row then token order
pub fn build_es_range_queries(cells: &[CidrsCell], field: &str) -> SdkResult<Vec<Value>> {
    let mut clauses = Vec::new();

    for cell in cells {
        for token in decode_cidrs_cell(&cell.cidrs) {
            let spec = token
                .parse::<NetworkSpec>()
                .map_err(|e| e.with_row(cell.row))?;
            clauses.push(spec.es_range(field));
        }
    }

    Ok(clauses)
}

/// Read `csv_path` and build its range clauses
pub fn es_range_queries_from_csv(csv_path: &Path, field: &str) -> SdkResult<Vec<Value>> {
    let cells = read_cidrs_column_csv(csv_path)?;
    let clauses = build_es_range_queries(&cells, field)?;
    info!(
        "Built {} range clause(s) from {} row(s) of {}",
        clauses.len(),
        cells.len(),
        csv_path.display()
    );
    Ok(clauses)
}

/// Indent of the rendered clause list
const ES_JSON_INDENT: &[u8] = b"    ";

/// JSON array of clauses, pretty-printed with a 4-space indent
pub fn render_es_queries(clauses: &[Value]) -> SdkResult<String> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(ES_JSON_INDENT));
    clauses.serialize(&mut serializer)?;

    // serde_json only writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(row: usize, cidrs: &str) -> CidrsCell {
        CidrsCell {
            row,
            cidrs: cidrs.to_string(),
        }
    }

    #[test]
    fn test_decode_json_list() {
        assert_eq!(
            decode_cidrs_cell(r#"["10.0.0.0/24", "10.1.0.0/16"]"#),
            vec!["10.0.0.0/24", "10.1.0.0/16"]
        );
    }

    #[test]
    fn test_decode_single_quoted_list_falls_back() {
        assert_eq!(
            decode_cidrs_cell("['10.0.0.0/24', '10.1.0.0/16']"),
            vec!["10.0.0.0/24", "10.1.0.0/16"]
        );
    }

    #[test]
    fn test_decode_single_value() {
        assert_eq!(decode_cidrs_cell("192.168.0.0/16"), vec!["192.168.0.0/16"]);
    }

    #[test]
    fn test_build_queries_in_order() {
        let clauses = build_es_range_queries(
            &[cell(2, r#"["10.0.0.0/24"]"#), cell(3, "192.168.0.5/16")],
            "client.ip",
        )
        .unwrap();

        assert_eq!(
            clauses,
            vec![
                json!({"range": {"client.ip": {"gte": "10.0.0.0", "lte": "10.0.0.255"}}}),
                json!({"range": {"client.ip": {"gte": "192.168.0.0", "lte": "192.168.255.255"}}}),
            ]
        );
    }

    #[test]
    fn test_render_uses_four_space_indent() {
        let clauses = vec![json!({"range": {"client.ip": {"gte": "10.0.0.0", "lte": "10.0.0.255"}}})];
        assert_eq!(
            render_es_queries(&clauses).unwrap(),
            "[\n    {\n        \"range\": {\n            \"client.ip\": {\n                \"gte\": \"10.0.0.0\",\n                \"lte\": \"10.0.0.255\"\n            }\n        }\n    }\n]"
        );
    }

    #[test]
    fn test_bad_token_reports_row() {
        let err = build_es_range_queries(&[cell(4, "not-an-ip")], "client.ip").unwrap_err();
        assert!(err.to_string().contains("'not-an-ip' (row 4)"));
    }
}
