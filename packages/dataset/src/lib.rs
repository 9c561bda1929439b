#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads and validates the static tables behind the ticket explorer.
//!
//! Reads the per-tract demographics CSV, the ticket-count fact CSV
//! (`GEOID` x month x violation type), and the simplified tract boundary
//! `GeoJSON`, then checks the cross-table invariants once so that every
//! consumer can treat the resulting [`Dataset`] as trusted and read-only.
//! Any schema problem is fatal at load time.

pub mod boundaries;
pub mod config;
mod parsing;
pub mod spatial;
pub mod tickets;
pub mod tracts;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use thiserror::Error;
use ticket_explorer_tickets_models::{AreaRecord, DemographicGroup, IssueMonth, TicketFact};

use crate::config::DatasetConfig;

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A data or config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The TOML config file is malformed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// An expected column is absent from a CSV header row.
    #[error("Missing column '{column}' in {file}")]
    MissingColumn {
        /// File (or stream label) being read.
        file: String,
        /// Column that was expected.
        column: String,
    },

    /// A cell could not be parsed.
    #[error("Invalid value '{value}' for column '{column}' in {file} at row {row}")]
    InvalidValue {
        /// File (or stream label) being read.
        file: String,
        /// 1-based line number, counting the header row.
        row: u64,
        /// Column of the bad cell.
        column: String,
        /// Raw cell contents.
        value: String,
    },

    /// Two tract rows share a GEOID.
    #[error("Duplicate area '{area_id}'")]
    DuplicateArea {
        /// The repeated GEOID.
        area_id: String,
    },

    /// Two ticket rows share the same `(area, month, violation type)` key.
    #[error("Duplicate ticket row for area '{area_id}', month {issue_month}, type '{violation_type}'")]
    DuplicateFact {
        /// Tract GEOID.
        area_id: String,
        /// Issue month.
        issue_month: IssueMonth,
        /// Violation type.
        violation_type: String,
    },

    /// A ticket row references a tract missing from the demographics table.
    #[error("Ticket row references unknown area '{area_id}'")]
    UnknownArea {
        /// The unknown GEOID.
        area_id: String,
    },

    /// A group count exceeds the tract's total population.
    #[error("Area '{area_id}' has {count} {group} residents but a total population of {total}")]
    InvalidPopulation {
        /// Tract GEOID.
        area_id: String,
        /// Offending group.
        group: DemographicGroup,
        /// Group count.
        count: u64,
        /// Total population.
        total: u64,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// The validated, read-only tables.
///
/// Built once at startup and shared between sessions. A refreshed dataset
/// is a new `Dataset`; existing values are never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    areas: Vec<AreaRecord>,
    facts: Vec<TicketFact>,
}

impl Dataset {
    /// Validates the tables and wraps them.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if an area id repeats, a group count exceeds
    /// its tract total, a fact references an unknown area, or a fact key
    /// repeats.
    pub fn new(areas: Vec<AreaRecord>, facts: Vec<TicketFact>) -> Result<Self, DatasetError> {
        let mut area_ids = BTreeSet::new();

        for area in &areas {
            if !area_ids.insert(area.area_id.as_str()) {
                return Err(DatasetError::DuplicateArea {
                    area_id: area.area_id.clone(),
                });
            }

            for (&group, &count) in &area.population_by_group {
                if count > area.population_total {
                    return Err(DatasetError::InvalidPopulation {
                        area_id: area.area_id.clone(),
                        group,
                        count,
                        total: area.population_total,
                    });
                }
            }
        }

        let mut keys = BTreeSet::new();

        for fact in &facts {
            if !area_ids.contains(fact.area_id.as_str()) {
                return Err(DatasetError::UnknownArea {
                    area_id: fact.area_id.clone(),
                });
            }

            if !keys.insert((
                fact.area_id.as_str(),
                fact.issue_month,
                fact.violation_type.as_str(),
            )) {
                return Err(DatasetError::DuplicateFact {
                    area_id: fact.area_id.clone(),
                    issue_month: fact.issue_month,
                    violation_type: fact.violation_type.clone(),
                });
            }
        }

        Ok(Self { areas, facts })
    }

    /// Loads all files named by `config` and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if a file cannot be opened, fails schema
    /// checks, or the tables violate a cross-table invariant.
    pub fn load(config: &DatasetConfig) -> Result<Self, DatasetError> {
        log::info!("Loading tracts from {}", config.tracts_path.display());
        let mut areas = tracts::load_areas(
            open(&config.tracts_path)?,
            &config.tract_columns,
            &config.tracts_path.display().to_string(),
        )?;
        log::info!("Loaded {} tracts", areas.len());

        log::info!("Loading tickets from {}", config.tickets_path.display());
        let facts = tickets::load_facts(
            open(&config.tickets_path)?,
            &config.ticket_columns,
            &config.tickets_path.display().to_string(),
        )?;
        log::info!("Loaded {} ticket rows", facts.len());

        if let Some(path) = &config.boundaries_path {
            log::info!("Loading tract boundaries from {}", path.display());
            let shapes = boundaries::load_boundaries(open(path)?, &config.boundary_id_property)?;
            attach_boundaries(&mut areas, shapes);
        }

        Self::new(areas, facts)
    }

    /// Tract records in load order.
    #[must_use]
    pub fn areas(&self) -> &[AreaRecord] {
        &self.areas
    }

    /// Ticket facts in load order.
    #[must_use]
    pub fn facts(&self) -> &[TicketFact] {
        &self.facts
    }
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn attach_boundaries(
    areas: &mut [AreaRecord],
    mut shapes: BTreeMap<String, geo::MultiPolygon<f64>>,
) {
    let mut missing = 0usize;

    for area in areas.iter_mut() {
        area.boundary = shapes.remove(&area.area_id);
        if area.boundary.is_none() {
            missing += 1;
        }
    }

    if missing > 0 {
        log::debug!("{missing} tracts have no boundary shape");
    }
    if !shapes.is_empty() {
        log::warn!(
            "Ignoring {} boundary features with no matching tract",
            shapes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: &str, total: u64, white: u64) -> AreaRecord {
        AreaRecord {
            area_id: id.to_string(),
            population_total: total,
            population_by_group: BTreeMap::from([(DemographicGroup::White, white)]),
            boundary: None,
        }
    }

    fn fact(id: &str, month: &str, count: u64) -> TicketFact {
        TicketFact {
            area_id: id.to_string(),
            issue_month: month.parse().unwrap(),
            violation_type: "X".to_string(),
            count,
        }
    }

    #[test]
    fn accepts_consistent_tables() {
        let dataset = Dataset::new(
            vec![area("A", 100, 60), area("B", 50, 10)],
            vec![fact("A", "2022-01", 5), fact("B", "2022-01", 0)],
        )
        .unwrap();
        assert_eq!(dataset.areas().len(), 2);
        assert_eq!(dataset.facts().len(), 2);
    }

    #[test]
    fn rejects_duplicate_area() {
        let err = Dataset::new(vec![area("A", 1, 0), area("A", 2, 0)], vec![]).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateArea { area_id } if area_id == "A"));
    }

    #[test]
    fn rejects_group_above_total() {
        let err = Dataset::new(vec![area("A", 10, 11)], vec![]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidPopulation { count: 11, total: 10, .. }));
    }

    #[test]
    fn rejects_fact_on_unknown_area() {
        let err = Dataset::new(vec![area("A", 10, 1)], vec![fact("Z", "2022-01", 1)]).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownArea { area_id } if area_id == "Z"));
    }

    #[test]
    fn rejects_duplicate_fact_key() {
        let err = Dataset::new(
            vec![area("A", 10, 1)],
            vec![fact("A", "2022-01", 1), fact("A", "2022-01-01", 2)],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateFact { .. }));
    }

    #[test]
    fn attaches_boundaries_by_id() {
        use geo::{MultiPolygon, polygon};

        let square = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]]);
        let mut areas = vec![area("A", 1, 0), area("B", 1, 0)];
        attach_boundaries(
            &mut areas,
            BTreeMap::from([("A".to_string(), square.clone()), ("Q".to_string(), square)]),
        );
        assert!(areas[0].boundary.is_some());
        assert!(areas[1].boundary.is_none());
    }
}
