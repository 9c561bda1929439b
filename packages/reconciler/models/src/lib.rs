#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state, interaction events, and derived view types.
//!
//! A [`SelectionState`] captures the three user inputs (violation types,
//! timeline date range, map area selection). Every interaction produces a
//! [`SelectionEvent`], which is applied to the previous state to build a new
//! one. The reconciler turns a state into a [`DerivedView`]: everything the
//! map, the timeline, and the demographic bar chart need to draw. These
//! types are serialized to JSON for the rendering layer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ticket_explorer_tickets_models::{DateRange, DemographicGroup, IssueMonth};

/// Which tracts the user has picked on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "areaIds", rename_all = "camelCase")]
pub enum AreaSelection {
    /// Nothing picked; every view aggregates over the whole city.
    #[default]
    Citywide,
    /// A non-empty set of tract GEOIDs.
    Areas(BTreeSet<String>),
}

impl AreaSelection {
    /// Builds a selection from picked GEOIDs. An empty list means citywide.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            Self::Citywide
        } else {
            Self::Areas(ids)
        }
    }

    /// Returns `true` when no tract is picked.
    #[must_use]
    pub const fn is_citywide(&self) -> bool {
        matches!(self, Self::Citywide)
    }

    /// Returns `true` if `area_id` takes part in the aggregate. Every tract
    /// does when citywide.
    #[must_use]
    pub fn includes(&self, area_id: &str) -> bool {
        match self {
            Self::Citywide => true,
            Self::Areas(ids) => ids.contains(area_id),
        }
    }
}

/// The three user inputs that drive every view.
///
/// Rebuilt from scratch on each interaction via [`SelectionState::apply`];
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Violation types to include (OR semantics). The UI keeps at least one
    /// selected; an empty set matches no tickets.
    pub violation_types: BTreeSet<String>,
    /// Inclusive month range; `None` means the full dataset range.
    pub date_range: Option<DateRange>,
    /// Tracts picked on the map.
    pub area_selection: AreaSelection,
}

impl SelectionState {
    /// Initial state: the given violation types, full date range, citywide.
    pub fn new<I, S>(violation_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violation_types: violation_types.into_iter().map(Into::into).collect(),
            date_range: None,
            area_selection: AreaSelection::Citywide,
        }
    }

    /// Returns a copy with a different date range.
    #[must_use]
    pub fn with_date_range(self, date_range: Option<DateRange>) -> Self {
        Self { date_range, ..self }
    }

    /// Returns a copy with a different area selection.
    #[must_use]
    pub fn with_area_selection(self, area_selection: AreaSelection) -> Self {
        Self {
            area_selection,
            ..self
        }
    }

    /// Builds the state that results from `event`.
    ///
    /// For map interactions a present `selected` list wins over `clicked`;
    /// an empty `selected` list clears the selection exactly like
    /// [`SelectionEvent::MapCleared`].
    #[must_use]
    pub fn apply(&self, event: &SelectionEvent) -> Self {
        match event {
            SelectionEvent::ViolationTypesChanged { violation_types } => Self {
                violation_types: violation_types.iter().cloned().collect(),
                ..self.clone()
            },
            SelectionEvent::DateRangeChanged { date_range } => {
                self.clone().with_date_range(*date_range)
            }
            SelectionEvent::MapInteraction { selected, clicked } => {
                let area_selection = match (selected, clicked) {
                    (Some(ids), _) => AreaSelection::from_ids(ids.iter().cloned()),
                    (None, Some(id)) => AreaSelection::from_ids([id.clone()]),
                    (None, None) => AreaSelection::Citywide,
                };
                self.clone().with_area_selection(area_selection)
            }
            SelectionEvent::MapCleared => self.clone().with_area_selection(AreaSelection::Citywide),
        }
    }
}

/// A single user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionEvent {
    /// The violation type dropdown changed.
    #[serde(rename_all = "camelCase")]
    ViolationTypesChanged {
        /// Newly selected violation types.
        violation_types: Vec<String>,
    },
    /// The timeline was brushed, zoomed, or reset (`None`).
    #[serde(rename_all = "camelCase")]
    DateRangeChanged {
        /// New range, or `None` for the full dataset range.
        date_range: Option<DateRange>,
    },
    /// A map selection (box/lasso) and/or click.
    MapInteraction {
        /// GEOIDs inside the selection shape, if a selection was made.
        #[serde(default)]
        selected: Option<Vec<String>>,
        /// GEOID of a clicked tract.
        #[serde(default)]
        clicked: Option<String>,
    },
    /// The map was double-clicked to remove the selection.
    MapCleared,
}

impl SelectionEvent {
    /// Which input this event changes.
    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        match self {
            Self::ViolationTypesChanged { .. } => Trigger::ViolationTypes,
            Self::DateRangeChanged { .. } => Trigger::DateRange,
            Self::MapInteraction { .. } | Self::MapCleared => Trigger::AreaSelection,
        }
    }
}

/// The input an event changes, which determines the views to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// Violation type dropdown.
    ViolationTypes,
    /// Timeline brush/zoom.
    DateRange,
    /// Map selection or clear.
    AreaSelection,
}

impl Trigger {
    /// The parts of the view downstream of this input.
    ///
    /// Population ratios do not depend on violation type and the map does
    /// not depend on the area selection, so those are left alone.
    #[must_use]
    pub const fn recomputes(self) -> RecomputedViews {
        match self {
            Self::ViolationTypes => RecomputedViews {
                map_values: true,
                map_title: true,
                timeline: true,
                demographic_fractions: false,
                demographic_title: true,
                selection_hint: false,
            },
            Self::DateRange => RecomputedViews {
                map_values: true,
                map_title: true,
                ..RecomputedViews::NONE
            },
            Self::AreaSelection => RecomputedViews {
                timeline: true,
                demographic_fractions: true,
                demographic_title: true,
                selection_hint: true,
                ..RecomputedViews::NONE
            },
        }
    }
}

/// Flags recording which parts of a [`DerivedView`] were recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct RecomputedViews {
    /// Per-tract map counts.
    pub map_values: bool,
    /// Map heading.
    pub map_title: bool,
    /// Timeline series and heading.
    pub timeline: bool,
    /// Selected-area demographic fractions.
    pub demographic_fractions: bool,
    /// Demographic chart heading.
    pub demographic_title: bool,
    /// "Double-click to clear" hint under the map.
    pub selection_hint: bool,
}

impl RecomputedViews {
    /// Everything, as on first render.
    pub const ALL: Self = Self {
        map_values: true,
        map_title: true,
        timeline: true,
        demographic_fractions: true,
        demographic_title: true,
        selection_hint: true,
    };

    /// Nothing.
    pub const NONE: Self = Self {
        map_values: false,
        map_title: false,
        timeline: false,
        demographic_fractions: false,
        demographic_title: false,
        selection_hint: false,
    };
}

/// Ticket count for one tract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCount {
    /// Tract GEOID.
    pub area_id: String,
    /// Matching tickets.
    pub count: u64,
}

/// Choropleth data: one count per known tract, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Heading describing the active violation types and date range.
    pub title: String,
    /// One entry per known tract, zero when nothing matched.
    pub values: Vec<AreaCount>,
}

impl MapView {
    /// Count for `area_id`, if it is a known tract.
    #[must_use]
    pub fn get(&self, area_id: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|v| v.area_id == area_id)
            .map(|v| v.count)
    }

    /// Sum over all tracts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.values.iter().map(|v| v.count).sum()
    }
}

/// One month on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Month on the x axis.
    pub month: IssueMonth,
    /// Smoothed ticket count, or `None` where the filtered data has no
    /// row for this month (drawn as a gap).
    pub value: Option<f64>,
}

/// Smoothed monthly series over the full dataset month axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    /// "Total citywide" or "Selected area".
    pub title: String,
    /// One point per month in the dataset, chronological.
    pub points: Vec<TimelinePoint>,
}

/// Share of population per demographic group.
pub type GroupFractions = BTreeMap<DemographicGroup, f64>;

/// The selected-area side of the demographic comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fractions", rename_all = "camelCase")]
pub enum SelectedComparison {
    /// No tract picked; the chart shows only the citywide bars.
    NoSelection,
    /// Tracts picked, but their total population is zero.
    NoData,
    /// Population shares within the picked tracts.
    Fractions(GroupFractions),
}

/// Citywide vs. selected-area population shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicBars {
    /// Shares over all tracts.
    pub citywide: GroupFractions,
    /// Shares over the picked tracts.
    pub selected: SelectedComparison,
}

impl DemographicBars {
    /// Selected-area values for every group in catalog order, zero-filled
    /// when there is nothing to compare.
    #[must_use]
    pub fn selected_values(&self) -> Vec<(DemographicGroup, f64)> {
        DemographicGroup::all()
            .iter()
            .map(|&group| {
                let value = match &self.selected {
                    SelectedComparison::Fractions(f) => f.get(&group).copied().unwrap_or(0.0),
                    SelectedComparison::NoSelection | SelectedComparison::NoData => 0.0,
                };
                (group, value)
            })
            .collect()
    }

    /// Citywide values for every group in catalog order.
    #[must_use]
    pub fn citywide_values(&self) -> Vec<(DemographicGroup, f64)> {
        DemographicGroup::all()
            .iter()
            .map(|&group| (group, self.citywide.get(&group).copied().unwrap_or(0.0)))
            .collect()
    }
}

/// Demographic comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicView {
    /// Heading; distinguishes "no selection" from "no population data".
    pub title: String,
    /// Bar values.
    pub bars: DemographicBars,
}

/// Everything needed to draw the map, timeline, and demographic chart for
/// one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView {
    /// Choropleth.
    pub map: MapView,
    /// Monthly trend line.
    pub timeline: TimelineView,
    /// Population comparison bars.
    pub demographics: DemographicView,
    /// Hint shown under the map while a selection is active.
    pub selection_hint: Option<String>,
}

/// Result of reconciling one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// State after the event.
    pub state: SelectionState,
    /// Complete view for `state`.
    pub view: DerivedView,
    /// Which parts of `view` were recomputed rather than carried over.
    pub recomputed: RecomputedViews,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SelectionState {
        SelectionState::new(["Street cleaning"])
    }

    #[test]
    fn empty_id_list_is_citywide() {
        assert_eq!(AreaSelection::from_ids(Vec::<String>::new()), AreaSelection::Citywide);
        assert!(AreaSelection::from_ids(["A"]).includes("A"));
        assert!(!AreaSelection::from_ids(["A"]).includes("B"));
        assert!(AreaSelection::Citywide.includes("anything"));
    }

    #[test]
    fn selection_takes_precedence_over_click() {
        let state = base().apply(&SelectionEvent::MapInteraction {
            selected: Some(vec!["A".to_string(), "B".to_string()]),
            clicked: Some("C".to_string()),
        });
        assert_eq!(state.area_selection, AreaSelection::from_ids(["A", "B"]));
    }

    #[test]
    fn click_alone_selects_one_area() {
        let state = base().apply(&SelectionEvent::MapInteraction {
            selected: None,
            clicked: Some("C".to_string()),
        });
        assert_eq!(state.area_selection, AreaSelection::from_ids(["C"]));
    }

    #[test]
    fn empty_selection_equals_clear() {
        let selected = base().apply(&SelectionEvent::MapInteraction {
            selected: Some(vec!["A".to_string()]),
            clicked: None,
        });

        let emptied = selected.apply(&SelectionEvent::MapInteraction {
            selected: Some(Vec::new()),
            clicked: Some("A".to_string()),
        });
        let cleared = selected.apply(&SelectionEvent::MapCleared);

        assert_eq!(emptied, cleared);
        assert_eq!(cleared, base());
    }

    #[test]
    fn apply_leaves_other_inputs_untouched() {
        let state = base().apply(&SelectionEvent::MapInteraction {
            selected: Some(vec!["A".to_string()]),
            clicked: None,
        });
        let next = state.apply(&SelectionEvent::ViolationTypesChanged {
            violation_types: vec!["Fire hydrant".to_string()],
        });
        assert_eq!(next.area_selection, state.area_selection);
        assert_eq!(next.date_range, None);
        assert!(next.violation_types.contains("Fire hydrant"));
        assert!(!next.violation_types.contains("Street cleaning"));
    }

    #[test]
    fn triggers_map_to_recompute_sets() {
        let types = Trigger::ViolationTypes.recomputes();
        assert!(types.map_values && types.timeline && types.demographic_title);
        assert!(!types.demographic_fractions);

        let dates = Trigger::DateRange.recomputes();
        assert!(dates.map_values && dates.map_title);
        assert!(!dates.timeline && !dates.demographic_fractions && !dates.demographic_title);

        let areas = Trigger::AreaSelection.recomputes();
        assert!(areas.timeline && areas.demographic_fractions && areas.selection_hint);
        assert!(!areas.map_values && !areas.map_title);
    }

    #[test]
    fn events_deserialize_from_json() {
        let event: SelectionEvent = serde_json::from_str(
            r#"{"type":"dateRangeChanged","dateRange":{"start":"2022-01","end":"2022-03"}}"#,
        )
        .unwrap();
        assert_eq!(event.trigger(), Trigger::DateRange);

        let event: SelectionEvent =
            serde_json::from_str(r#"{"type":"mapInteraction","clicked":"A"}"#).unwrap();
        assert_eq!(
            event,
            SelectionEvent::MapInteraction {
                selected: None,
                clicked: Some("A".to_string())
            }
        );

        let event: SelectionEvent = serde_json::from_str(r#"{"type":"mapCleared"}"#).unwrap();
        assert_eq!(event, SelectionEvent::MapCleared);
    }

    #[test]
    fn selected_values_zero_fill() {
        let bars = DemographicBars {
            citywide: GroupFractions::from([(DemographicGroup::White, 0.5)]),
            selected: SelectedComparison::NoSelection,
        };
        assert!(bars.selected_values().iter().all(|(_, v)| *v == 0.0));
        assert_eq!(bars.selected_values().len(), DemographicGroup::all().len());
        assert_eq!(bars.citywide_values()[0], (DemographicGroup::White, 0.5));
    }
}
