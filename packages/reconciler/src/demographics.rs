//! Citywide vs. selected-area population shares.

use ticket_explorer_reconciler_models::{
    AreaSelection, DemographicBars, GroupFractions, SelectedComparison,
};
use ticket_explorer_tickets_models::{AreaRecord, DemographicGroup};

use crate::context::ReconcilerContext;

/// Population share of each demographic group over `areas`:
/// `sum(group) / sum(total)`.
///
/// Returns `None` when the areas' total population is zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn population_fractions<'a>(
    areas: impl Iterator<Item = &'a AreaRecord>,
) -> Option<GroupFractions> {
    let mut total = 0u64;
    let mut by_group = vec![0u64; DemographicGroup::all().len()];

    for area in areas {
        total += area.population_total;
        for (slot, &group) in by_group.iter_mut().zip(DemographicGroup::all()) {
            *slot += area.group_population(group);
        }
    }

    if total == 0 {
        return None;
    }

    Some(
        DemographicGroup::all()
            .iter()
            .zip(by_group)
            .map(|(&group, count)| (group, count as f64 / total as f64))
            .collect(),
    )
}

/// Demographic comparison for the current map selection.
///
/// The citywide side comes from the context's precomputed shares. The
/// selected side is [`SelectedComparison::NoSelection`] when citywide and
/// [`SelectedComparison::NoData`] when the picked tracts (ignoring unknown
/// GEOIDs) have no population.
#[must_use]
pub fn compute_demographic_bars(
    ctx: &ReconcilerContext,
    area_selection: &AreaSelection,
) -> DemographicBars {
    let selected = match area_selection {
        AreaSelection::Citywide => SelectedComparison::NoSelection,
        AreaSelection::Areas(ids) => {
            population_fractions(ids.iter().filter_map(|id| ctx.area(id)))
                .map_or(SelectedComparison::NoData, SelectedComparison::Fractions)
        }
    };

    DemographicBars {
        citywide: ctx.citywide_fractions().clone(),
        selected,
    }
}
