//! Ticket-count fact CSV loader.
//!
//! Each row is a pre-aggregated count of tickets for one tract, one issue
//! month, and one violation type.

use std::io::Read;

use ticket_explorer_tickets_models::{IssueMonth, TicketFact};

use crate::DatasetError;
use crate::config::TicketColumns;
use crate::parsing::{column_index, count_cell, invalid};

/// Reads one [`TicketFact`] per CSV row, in file order.
///
/// `file` labels the stream in error messages.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if any configured column is
/// absent and [`DatasetError::InvalidValue`] for blank keys, unparseable
/// months, or unparseable counts.
pub fn load_facts(
    reader: impl Read,
    columns: &TicketColumns,
    file: &str,
) -> Result<Vec<TicketFact>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let id_idx = column_index(&headers, &columns.area_id, file)?;
    let month_idx = column_index(&headers, &columns.issue_month, file)?;
    let type_idx = column_index(&headers, &columns.violation_type, file)?;
    let count_idx = column_index(&headers, &columns.count, file)?;

    let mut facts = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i as u64 + 2;

        let area_id = record.get(id_idx).unwrap_or("").trim();
        if area_id.is_empty() {
            return Err(invalid(file, row, &columns.area_id, area_id));
        }

        let raw_month = record.get(month_idx).unwrap_or("");
        let issue_month: IssueMonth = raw_month
            .parse()
            .map_err(|_| invalid(file, row, &columns.issue_month, raw_month))?;

        let violation_type = record.get(type_idx).unwrap_or("").trim();
        if violation_type.is_empty() {
            return Err(invalid(file, row, &columns.violation_type, violation_type));
        }

        let count = count_cell(&record, count_idx, &columns.count, file, row)?;

        facts.push(TicketFact {
            area_id: area_id.to_string(),
            issue_month,
            violation_type: violation_type.to_string(),
            count,
        });
    }

    log::debug!("Parsed {} ticket rows from {file}", facts.len());

    Ok(facts)
}
