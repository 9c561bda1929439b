//! TOML configuration for locating and reading the dataset files.
//!
//! Every field has a default matching the layout produced by the data
//! preparation notebooks, so an empty (or absent) config file works out of
//! the box when run from the project directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ticket_explorer_tickets_models::DemographicGroup;

use crate::DatasetError;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TICKET_EXPLORER_CONFIG";

/// Config path used when [`CONFIG_ENV_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "ticket_explorer.toml";

/// Where the dataset lives and how its files are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Per-tract demographics CSV.
    pub tracts_path: PathBuf,
    /// Ticket counts by tract, month, and violation type.
    pub tickets_path: PathBuf,
    /// Simplified tract boundary `GeoJSON`. Optional; without it map clicks
    /// cannot be resolved from coordinates.
    pub boundaries_path: Option<PathBuf>,
    /// Column names in the tracts CSV.
    pub tract_columns: TractColumns,
    /// Column names in the tickets CSV.
    pub ticket_columns: TicketColumns,
    /// Feature property holding the tract GEOID in the boundary file.
    pub boundary_id_property: String,
    /// Violation type selected when a session starts.
    pub initial_violation_type: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            tracts_path: PathBuf::from("processed data/tracts_data.csv"),
            tickets_path: PathBuf::from(
                "processed data/tickets_by_tract_by_month_by_category.csv",
            ),
            boundaries_path: Some(PathBuf::from(
                "processed data/tract geometry - simplified.json",
            )),
            tract_columns: TractColumns::default(),
            ticket_columns: TicketColumns::default(),
            boundary_id_property: "GEOID".to_string(),
            initial_violation_type: "Street cleaning".to_string(),
        }
    }
}

impl DatasetConfig {
    /// Parses a config from TOML text. Relative paths are left as-is.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] if the TOML is malformed.
    pub fn parse(toml_str: &str) -> Result<Self, DatasetError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Reads a config file. Relative data paths are resolved against the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::parse(&contents)?;

        Ok(match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => config.relative_to(dir),
            _ => config,
        })
    }

    /// Loads the config named by [`CONFIG_ENV_VAR`], or
    /// [`DEFAULT_CONFIG_PATH`] when unset. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file exists but cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, DatasetError> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

        if path.exists() {
            log::info!("Using config {}", path.display());
            Self::load(&path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    #[must_use]
    fn relative_to(self, dir: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { dir.join(p) } else { p };

        Self {
            tracts_path: resolve(self.tracts_path),
            tickets_path: resolve(self.tickets_path),
            boundaries_path: self.boundaries_path.map(resolve),
            ..self
        }
    }
}

/// Column names in the tracts CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TractColumns {
    /// Tract GEOID column.
    pub area_id: String,
    /// Total population column.
    pub population_total: String,
    /// Population column per demographic group name. Groups not listed
    /// here are read from a column named after the group.
    pub groups: BTreeMap<String, String>,
}

impl TractColumns {
    /// Returns the column holding `group`'s population.
    #[must_use]
    pub fn group_column(&self, group: DemographicGroup) -> &str {
        let name: &'static str = group.into();
        self.groups.get(name).map_or(name, String::as_str)
    }
}

impl Default for TractColumns {
    fn default() -> Self {
        Self {
            area_id: "GEOID".to_string(),
            population_total: "Total population".to_string(),
            groups: DemographicGroup::all()
                .iter()
                .map(|g| (g.to_string(), g.to_string()))
                .collect(),
        }
    }
}

/// Column names in the tickets CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketColumns {
    /// Tract GEOID column.
    pub area_id: String,
    /// Issue month column.
    pub issue_month: String,
    /// Violation type column.
    pub violation_type: String,
    /// Ticket count column.
    pub count: String,
}

impl Default for TicketColumns {
    fn default() -> Self {
        Self {
            area_id: "GEOID".to_string(),
            issue_month: "year-month".to_string(),
            violation_type: "category".to_string(),
            count: "tickets count".to_string(),
        }
    }
}
