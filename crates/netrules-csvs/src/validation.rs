/*!
# CSV Validation & I/O

Readers for the netrules input files (with header detection and
presence-of-column checks) and writers for the pipe-delimited reports.
*/

use crate::{
    errors::{CsvError, CsvResult},
    schemas::{
        AccountCidrsRow, AccountSummaryRow, AddressRow, CidrsCell, HeaderMode, MatchedIpRow,
        NotMatchedIpRow, SgRuleRow, ACCOUNT_CIDRS_DELIMITER, ACCOUNT_SUMMARY_CSV_HEADERS,
        ADDRESS_DELIMITER, CIDRS_COLUMN, MATCHED_CSV_HEADERS, NOT_MATCHED_CSV_HEADERS,
        REPORT_DELIMITER, SG_RULES_DELIMITER, SG_RULES_REQUIRED_HEADERS,
    },
};
use csv::{Reader, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use netrules_matcher::parse_address;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info};

// ================================================================================================
// Address File
// ================================================================================================

/// Read the single-column address file
pub fn read_address_csv<P: AsRef<Path>>(
    path: P,
    header_mode: HeaderMode,
) -> CsvResult<Vec<AddressRow>> {
    let file = File::open(path)?;
    read_address_records(file, header_mode)
}

pub fn read_address_records<R: io::Read>(
    reader: R,
    header_mode: HeaderMode,
) -> CsvResult<Vec<AddressRow>> {
    let mut rdr = headerless_reader(reader, ADDRESS_DELIMITER);
    let mut rows = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let row = line_of(&record, index);

        if index == 0 && is_header(header_mode, &record, looks_like_address_header) {
            info!("Skipping address file header: {:?}", record);
            continue;
        }

        let ip = required_field(&record, 0, "address", row)?;
        rows.push(AddressRow {
            row,
            ip: ip.to_string(),
        });
    }

    Ok(rows)
}

/// An address header carries no digits and is not an address itself.
///
/// A malformed address such as `10.0.0` still has digits, so it stays in the
/// rows and fails later with its row number.
fn looks_like_address_header(record: &StringRecord) -> bool {
    record.get(0).map_or(true, |field| {
        !has_digit(field) && parse_address(field).is_err()
    })
}

// ================================================================================================
// Account CIDR File
// ================================================================================================

/// Read the `account|spec-list` file
pub fn read_account_cidrs_csv<P: AsRef<Path>>(
    path: P,
    header_mode: HeaderMode,
) -> CsvResult<Vec<AccountCidrsRow>> {
    let file = File::open(path)?;
    read_account_cidrs_records(file, header_mode)
}

pub fn read_account_cidrs_records<R: io::Read>(
    reader: R,
    header_mode: HeaderMode,
) -> CsvResult<Vec<AccountCidrsRow>> {
    let mut rdr = headerless_reader(reader, ACCOUNT_CIDRS_DELIMITER);
    let mut rows = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let row = line_of(&record, index);

        if index == 0 && is_header(header_mode, &record, looks_like_account_header) {
            info!("Skipping account file header: {:?}", record);
            continue;
        }

        let account = required_field(&record, 0, "account", row)?;
        let cidrs = record.get(1).ok_or_else(|| {
            CsvError::SchemaValidation(format!("row {}: missing spec-list column", row))
        })?;

        rows.push(AccountCidrsRow {
            row,
            account: account.to_string(),
            cidrs: cidrs.to_string(),
        });
    }

    Ok(rows)
}

/// Account ids and network specs both carry digits, header names do not
fn looks_like_account_header(record: &StringRecord) -> bool {
    record
        .iter()
        .all(|field| !has_digit(field))
}

fn has_digit(field: &str) -> bool {
    field.bytes().any(|b| b.is_ascii_digit())
}

/// Read the non-empty `CIDRS` cells of a headed, pipe-delimited file
pub fn read_cidrs_column_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<CidrsCell>> {
    let file = File::open(path)?;
    read_cidrs_column_records(file)
}

pub fn read_cidrs_column_records<R: io::Read>(reader: R) -> CsvResult<Vec<CidrsCell>> {
    let mut rdr = headed_reader(reader, ACCOUNT_CIDRS_DELIMITER);
    let column = rdr
        .headers()?
        .iter()
        .position(|header| header == CIDRS_COLUMN)
        .ok_or_else(|| CsvError::MissingHeader(CIDRS_COLUMN.to_string()))?;

    let mut cells = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        match record.get(column) {
            Some(cidrs) if !cidrs.is_empty() => cells.push(CidrsCell {
                row: line_of(&record, index + 1),
                cidrs: cidrs.to_string(),
            }),
            _ => debug!("Row {} has no CIDRS value", line_of(&record, index + 1)),
        }
    }

    Ok(cells)
}

// ================================================================================================
// Security-Group Rule Export
// ================================================================================================

pub fn read_sg_rules_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<SgRuleRow>> {
    let file = File::open(path)?;
    read_sg_rules_records(file)
}

pub fn read_sg_rules_records<R: io::Read>(reader: R) -> CsvResult<Vec<SgRuleRow>> {
    let mut rdr = headed_reader(reader, SG_RULES_DELIMITER);

    let headers = rdr.headers()?;
    validate_required_headers(headers.iter(), SG_RULES_REQUIRED_HEADERS)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: SgRuleRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

// ================================================================================================
// Report Writing
// ================================================================================================

pub fn write_matched_csv<P: AsRef<Path>>(path: P, rows: &[MatchedIpRow]) -> CsvResult<()> {
    write_report(path, MATCHED_CSV_HEADERS, rows)
}

pub fn write_not_matched_csv<P: AsRef<Path>>(path: P, rows: &[NotMatchedIpRow]) -> CsvResult<()> {
    write_report(path, NOT_MATCHED_CSV_HEADERS, rows)
}

pub fn write_account_summary_csv<P: AsRef<Path>>(
    path: P,
    rows: &[AccountSummaryRow],
) -> CsvResult<()> {
    write_report(path, ACCOUNT_SUMMARY_CSV_HEADERS, rows)
}

fn write_report<P, T>(path: P, headers: &[&str], rows: &[T]) -> CsvResult<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let file = File::create(path)?;
    let mut wtr = WriterBuilder::new()
        .delimiter(REPORT_DELIMITER)
        .has_headers(false)
        .from_writer(file);

    // Header goes out even for an empty report
    wtr.write_record(headers)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

// ================================================================================================
// Helpers
// ================================================================================================

fn headerless_reader<R: io::Read>(reader: R, delimiter: u8) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn headed_reader<R: io::Read>(reader: R, delimiter: u8) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn is_header<F>(mode: HeaderMode, record: &StringRecord, looks_like_header: F) -> bool
where
    F: Fn(&StringRecord) -> bool,
{
    match mode {
        HeaderMode::Auto => looks_like_header(record),
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
    }
}

/// Source line of a record, falling back to its 1-based position
fn line_of(record: &StringRecord, index: usize) -> usize {
    record
        .position()
        .map_or(index + 1, |position| position.line() as usize)
}

fn required_field<'r>(
    record: &'r StringRecord,
    column: usize,
    name: &str,
    row: usize,
) -> CsvResult<&'r str> {
    record
        .get(column)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| CsvError::SchemaValidation(format!("row {}: missing {} column", row, name)))
}

fn validate_required_headers<'a, I>(actual: I, required: &[&str]) -> CsvResult<()>
where
    I: Iterator<Item = &'a str>,
{
    let actual_headers: Vec<&str> = actual.collect();

    for header in required {
        if !actual_headers.contains(header) {
            return Err(CsvError::MissingHeader(header.to_string()));
        }
    }

    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_address_file_header_detected() {
        let rows = read_address_records("IP\n10.0.0.5\n8.8.8.8\n".as_bytes(), HeaderMode::Auto)
            .unwrap();
        assert_eq!(
            rows,
            vec![
                AddressRow {
                    row: 2,
                    ip: "10.0.0.5".to_string()
                },
                AddressRow {
                    row: 3,
                    ip: "8.8.8.8".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_address_file_without_header_keeps_first_row() {
        let rows =
            read_address_records("10.0.0.5\n8.8.8.8\n".as_bytes(), HeaderMode::Auto).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ip, "10.0.0.5");
        assert_eq!(rows[0].row, 1);
    }

    #[test]
    fn test_header_mode_overrides_detection() {
        let rows =
            read_address_records("10.0.0.5\n8.8.8.8\n".as_bytes(), HeaderMode::Present).unwrap();
        assert_eq!(rows.len(), 1);

        // A malformed first address is kept so matching can report it
        let rows = read_address_records("10.0.0\n8.8.8.8\n".as_bytes(), HeaderMode::Absent).unwrap();
        assert_eq!(rows[0].ip, "10.0.0");
    }

    #[test]
    fn test_malformed_first_address_is_not_a_header() {
        let rows = read_address_records("10.0.0\n8.8.8.8\n".as_bytes(), HeaderMode::Auto).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            AddressRow {
                row: 1,
                ip: "10.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_letter_only_ipv6_first_row_is_data() {
        let rows = read_address_records("abcd::ef\n".as_bytes(), HeaderMode::Auto).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ip, "abcd::ef");
    }

    #[test]
    fn test_digitless_account_row_needs_absent_mode() {
        let data = "acct|[]\nother|['10.0.0.0/8']\n";

        let rows = read_account_cidrs_records(data.as_bytes(), HeaderMode::Auto).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account, "other");

        let rows = read_account_cidrs_records(data.as_bytes(), HeaderMode::Absent).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].account, "acct");
    }

    #[test]
    fn test_account_file_header_detected() {
        let data = "Account|CIDRs\n\
                    111111111111|['10.0.0.0/24', '10.1.0.0-10.1.0.9']\n\
                    222222222222|[]\n";
        let rows = read_account_cidrs_records(data.as_bytes(), HeaderMode::Auto).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].account, "111111111111");
        assert_eq!(rows[0].cidrs, "['10.0.0.0/24', '10.1.0.0-10.1.0.9']");
        assert_eq!(rows[1].cidrs, "[]");
    }

    #[test]
    fn test_account_file_missing_spec_column() {
        let err = read_account_cidrs_records("111111111111\n".as_bytes(), HeaderMode::Absent)
            .unwrap_err();
        assert!(err.to_string().contains("row 1: missing spec-list column"));
    }

    #[test]
    fn test_cidrs_column() {
        let data = "Account|CIDRS\n\
                    a|[\"10.0.0.0/24\"]\n\
                    b|\n\
                    c|192.168.0.0/16\n";
        let cells = read_cidrs_column_records(data.as_bytes()).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].cidrs, "[\"10.0.0.0/24\"]");
        assert_eq!(cells[1].cidrs, "192.168.0.0/16");
        assert_eq!(cells[1].row, 4);
    }

    #[test]
    fn test_cidrs_column_missing() {
        let err = read_cidrs_column_records("Account|Cidr\na|10.0.0.0/8\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader(ref h) if h == "CIDRS"));
    }

    #[test]
    fn test_sg_rules_missing_required_header() {
        let data = "Env|GroupName|Type|Protocol|fromPort|Description\n\
                    prod|web|ingress|tcp|443|https\n";
        let err = read_sg_rules_records(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingHeader(ref h) if h == "toPort"));
    }

    #[test]
    fn test_reports_always_carry_headers() {
        let temp_file = NamedTempFile::new().unwrap();
        write_not_matched_csv(temp_file.path(), &[]).unwrap();
        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), "IP\n");
    }

    #[test]
    fn test_write_matched_and_summary() {
        let matched = NamedTempFile::new().unwrap();
        write_matched_csv(
            matched.path(),
            &[MatchedIpRow {
                ip: "10.0.0.5".to_string(),
                account_numbers: "111,222".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(matched.path()).unwrap(),
            "IP|AccountNumbers\n10.0.0.5|111,222\n"
        );

        let summary = NamedTempFile::new().unwrap();
        write_account_summary_csv(
            summary.path(),
            &[AccountSummaryRow {
                account: "111".to_string(),
                matches: 4,
            }],
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(summary.path()).unwrap(),
            "Account|Matches\n111|4\n"
        );
    }
}
