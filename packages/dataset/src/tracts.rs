//! Census tract demographics CSV loader.

use std::collections::BTreeMap;
use std::io::Read;

use ticket_explorer_tickets_models::{AreaRecord, DemographicGroup};

use crate::DatasetError;
use crate::config::TractColumns;
use crate::parsing::{column_index, count_cell, invalid};

/// Reads one [`AreaRecord`] per CSV row, in file order.
///
/// `file` labels the stream in error messages.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if the GEOID, total population,
/// or any demographic group column is absent, and
/// [`DatasetError::InvalidValue`] for unparseable counts or blank GEOIDs.
pub fn load_areas(
    reader: impl Read,
    columns: &TractColumns,
    file: &str,
) -> Result<Vec<AreaRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let id_idx = column_index(&headers, &columns.area_id, file)?;
    let total_idx = column_index(&headers, &columns.population_total, file)?;
    let group_idx = DemographicGroup::all()
        .iter()
        .map(|&group| {
            let column = columns.group_column(group);
            column_index(&headers, column, file).map(|idx| (group, column, idx))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut areas = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i as u64 + 2;

        let area_id = record.get(id_idx).unwrap_or("").trim().to_string();
        if area_id.is_empty() {
            return Err(invalid(file, row, &columns.area_id, ""));
        }

        let population_total = count_cell(&record, total_idx, &columns.population_total, file, row)?;

        let mut population_by_group = BTreeMap::new();
        for &(group, column, idx) in &group_idx {
            population_by_group.insert(group, count_cell(&record, idx, column, file, row)?);
        }

        areas.push(AreaRecord {
            area_id,
            population_total,
            population_by_group,
            boundary: None,
        });
    }

    Ok(areas)
}
