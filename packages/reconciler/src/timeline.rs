//! Smoothed monthly ticket series for the timeline.

use std::collections::{BTreeMap, BTreeSet};

use ticket_explorer_reconciler_models::{AreaSelection, TimelinePoint};
use ticket_explorer_tickets_models::IssueMonth;

use crate::context::ReconcilerContext;

/// Width of the centered moving average applied to the monthly series.
pub const SMOOTHING_WINDOW: usize = 3;

/// Monthly ticket totals for the selected tracts (all tracts when
/// citywide) and violation types, smoothed and laid out on the dataset's
/// full month axis.
///
/// Smoothing runs over the months that have rows after filtering; months
/// with no rows come back as `None` so they draw as gaps rather than zeros.
/// The returned length always equals [`ReconcilerContext::months`].
#[must_use]
pub fn compute_timeline_series(
    ctx: &ReconcilerContext,
    area_selection: &AreaSelection,
    violation_types: &BTreeSet<String>,
) -> Vec<TimelinePoint> {
    let selected: Option<BTreeSet<usize>> = match area_selection {
        AreaSelection::Citywide => None,
        AreaSelection::Areas(ids) => Some(
            ids.iter()
                .filter_map(|id| ctx.area_position(id))
                .collect(),
        ),
    };

    let mut by_month: BTreeMap<IssueMonth, u64> = BTreeMap::new();

    for violation_type in violation_types {
        for row in ctx.facts_of_type(violation_type) {
            if selected.as_ref().is_none_or(|s| s.contains(&row.area)) {
                *by_month.entry(row.month).or_default() += row.count;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let totals: Vec<f64> = by_month.values().map(|&v| v as f64).collect();
    let smoothed: BTreeMap<IssueMonth, f64> = by_month
        .keys()
        .copied()
        .zip(centered_rolling_mean(&totals, SMOOTHING_WINDOW))
        .collect();

    ctx.months()
        .iter()
        .map(|&month| TimelinePoint {
            month,
            value: smoothed.get(&month).copied(),
        })
        .collect()
}

/// Centered moving average that shrinks at the edges instead of dropping
/// them: each output is the mean of whatever part of the window lies inside
/// the series.
#[must_use]
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return values.to_vec();
    }

    let before = window / 2;
    let after = window - 1 - before;

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(values.len() - 1);
            let slice = &values[lo..=hi];
            #[allow(clippy::cast_precision_loss)]
            let len = slice.len() as f64;
            slice.iter().sum::<f64>() / len
        })
        .collect()
}
