//! Immutable, precomputed view of the dataset shared by every session.

use std::collections::BTreeMap;

use ticket_explorer_dataset::{Dataset, DatasetError};
use ticket_explorer_reconciler_models::{GroupFractions, SelectionState};
use ticket_explorer_tickets_models::{AreaRecord, DateRange, DemographicGroup, IssueMonth, TicketFact};

use crate::demographics::population_fractions;

/// A ticket fact with its tract resolved to a catalog index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FactRow {
    pub(crate) area: usize,
    pub(crate) month: IssueMonth,
    pub(crate) count: u64,
}

/// Everything the reconciler reads: the validated tables plus the values
/// derived from them once at startup (month axis, type catalog, citywide
/// population shares, fact rows grouped by violation type).
///
/// Built once, then only read. On a dataset refresh build a new context and
/// hand it to sessions; never mutate one that is in use.
#[derive(Debug)]
pub struct ReconcilerContext {
    dataset: Dataset,
    area_index: BTreeMap<String, usize>,
    facts_by_type: BTreeMap<String, Vec<FactRow>>,
    months: Vec<IssueMonth>,
    citywide: GroupFractions,
}

impl ReconcilerContext {
    /// Precomputes the derived tables for `dataset`.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        let area_index: BTreeMap<String, usize> = dataset
            .areas()
            .iter()
            .enumerate()
            .map(|(idx, area)| (area.area_id.clone(), idx))
            .collect();

        let mut facts_by_type: BTreeMap<String, Vec<FactRow>> = BTreeMap::new();
        let mut months = Vec::new();

        for fact in dataset.facts() {
            let Some(&area) = area_index.get(&fact.area_id) else {
                continue;
            };
            facts_by_type
                .entry(fact.violation_type.clone())
                .or_default()
                .push(FactRow {
                    area,
                    month: fact.issue_month,
                    count: fact.count,
                });
            months.push(fact.issue_month);
        }

        months.sort_unstable();
        months.dedup();

        let citywide = population_fractions(dataset.areas().iter()).unwrap_or_else(|| {
            log::warn!("Citywide population is zero; citywide shares default to 0");
            DemographicGroup::all().iter().map(|&g| (g, 0.0)).collect()
        });

        log::info!(
            "Reconciler context ready: {} tracts, {} violation types, {} months",
            area_index.len(),
            facts_by_type.len(),
            months.len()
        );

        Self {
            dataset,
            area_index,
            facts_by_type,
            months,
            citywide,
        }
    }

    /// Validates raw tables and builds a context from them.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the tables violate a dataset invariant.
    pub fn from_tables(
        areas: Vec<AreaRecord>,
        facts: Vec<TicketFact>,
    ) -> Result<Self, DatasetError> {
        Ok(Self::new(Dataset::new(areas, facts)?))
    }

    /// The underlying tables.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Tract records in catalog order.
    #[must_use]
    pub fn areas(&self) -> &[AreaRecord] {
        self.dataset.areas()
    }

    /// Looks up a tract by GEOID.
    #[must_use]
    pub fn area(&self, area_id: &str) -> Option<&AreaRecord> {
        self.area_index
            .get(area_id)
            .and_then(|&idx| self.dataset.areas().get(idx))
    }

    pub(crate) fn area_position(&self, area_id: &str) -> Option<usize> {
        self.area_index.get(area_id).copied()
    }

    /// Every distinct month in the dataset, chronological. This is the
    /// timeline's fixed x axis.
    #[must_use]
    pub fn months(&self) -> &[IssueMonth] {
        &self.months
    }

    /// First through last month in the dataset, or `None` if it holds no
    /// tickets.
    #[must_use]
    pub fn full_range(&self) -> Option<DateRange> {
        match (self.months.first(), self.months.last()) {
            (Some(&first), Some(&last)) => Some(DateRange::new(first, last)),
            _ => None,
        }
    }

    /// Every violation type in the dataset, sorted.
    pub fn violation_types(&self) -> impl Iterator<Item = &str> {
        self.facts_by_type.keys().map(String::as_str)
    }

    pub(crate) fn facts_of_type(&self, violation_type: &str) -> &[FactRow] {
        self.facts_by_type
            .get(violation_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Population shares over every tract, computed once at construction.
    #[must_use]
    pub const fn citywide_fractions(&self) -> &GroupFractions {
        &self.citywide
    }

    /// Starting selection for a new session: `preferred` if the dataset has
    /// it, otherwise the first known type.
    #[must_use]
    pub fn initial_selection(&self, preferred: &str) -> SelectionState {
        if self.facts_by_type.contains_key(preferred) {
            return SelectionState::new([preferred]);
        }

        let fallback = self.violation_types().next();
        log::warn!("Initial violation type '{preferred}' not in dataset; using {fallback:?}");
        SelectionState::new(fallback)
    }
}
