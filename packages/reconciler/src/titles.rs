//! Chart headings assembled from the selection.

use std::collections::BTreeSet;

use ticket_explorer_reconciler_models::{AreaSelection, SelectedComparison};
use ticket_explorer_tickets_models::DateRange;

/// Timeline heading when aggregating every tract.
pub const CITYWIDE_TIMELINE_TITLE: &str = "Total citywide";

/// Timeline heading when aggregating picked tracts.
pub const SELECTED_TIMELINE_TITLE: &str = "Selected area";

/// Demographic heading with nothing picked on the map.
pub const NO_SELECTION_DEMOGRAPHIC_TITLE: &str =
    "Race and ethnicity citywide (select area on map to compare)";

/// Demographic heading with a real comparison.
pub const SELECTED_DEMOGRAPHIC_TITLE: &str = "Race and ethnicity citywide and selected area";

/// Demographic heading when the picked tracts have no residents.
pub const NO_DATA_DEMOGRAPHIC_TITLE: &str =
    "Race and ethnicity citywide (selected area has no population)";

/// Hint under the map while a selection is active.
pub const SELECTION_HINT: &str = "Double-click map to remove selection";

/// `Ticket type: <types> & Date range: <Mon YYYY - Mon YYYY>`.
///
/// `date_range` should already be resolved to the full dataset range when
/// the user has not brushed the timeline; `None` means the dataset has no
/// months at all.
#[must_use]
pub fn map_title(violation_types: &BTreeSet<String>, date_range: Option<&DateRange>) -> String {
    let types = violation_types
        .iter()
        .map(|t| capitalize(t))
        .collect::<Vec<_>>()
        .join(", ");
    let dates = date_range.map_or_else(|| "no data".to_string(), ToString::to_string);

    format!("Ticket type: {types} & Date range: {dates}")
}

/// Upper-cases the first character and lower-cases the rest.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[must_use]
pub const fn timeline_title(area_selection: &AreaSelection) -> &'static str {
    match area_selection {
        AreaSelection::Citywide => CITYWIDE_TIMELINE_TITLE,
        AreaSelection::Areas(_) => SELECTED_TIMELINE_TITLE,
    }
}

#[must_use]
pub const fn demographic_title(selected: &SelectedComparison) -> &'static str {
    match selected {
        SelectedComparison::NoSelection => NO_SELECTION_DEMOGRAPHIC_TITLE,
        SelectedComparison::NoData => NO_DATA_DEMOGRAPHIC_TITLE,
        SelectedComparison::Fractions(_) => SELECTED_DEMOGRAPHIC_TITLE,
    }
}

#[must_use]
pub fn selection_hint(area_selection: &AreaSelection) -> Option<String> {
    match area_selection {
        AreaSelection::Citywide => None,
        AreaSelection::Areas(_) => Some(SELECTION_HINT.to_string()),
    }
}
