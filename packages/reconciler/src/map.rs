//! Per-tract ticket counts for the choropleth.

use std::collections::BTreeSet;

use ticket_explorer_reconciler_models::AreaCount;
use ticket_explorer_tickets_models::DateRange;

use crate::context::ReconcilerContext;

/// Sums tickets per tract for the given violation types and date range
/// (full range when `None`).
///
/// The result always has exactly one entry per known tract, in catalog
/// order, so the map's location list never shrinks or reorders when a
/// filter narrows; tracts with no matching tickets get zero. Unknown
/// violation types match nothing.
#[must_use]
pub fn compute_map_values(
    ctx: &ReconcilerContext,
    violation_types: &BTreeSet<String>,
    date_range: Option<&DateRange>,
) -> Vec<AreaCount> {
    let mut counts = vec![0u64; ctx.areas().len()];

    for violation_type in violation_types {
        for row in ctx.facts_of_type(violation_type) {
            if date_range.is_none_or(|r| r.contains(row.month)) {
                counts[row.area] += row.count;
            }
        }
    }

    ctx.areas()
        .iter()
        .zip(counts)
        .map(|(area, count)| AreaCount {
            area_id: area.area_id.clone(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use ticket_explorer_tickets_models::DateRange;

    use super::*;
    use crate::test_support::{context, month, types};

    fn as_pairs(values: &[AreaCount]) -> Vec<(&str, u64)> {
        values.iter().map(|v| (v.area_id.as_str(), v.count)).collect()
    }

    #[test]
    fn sums_over_full_range() {
        let ctx = context();
        let values = compute_map_values(&ctx, &types(&["X"]), None);
        assert_eq!(as_pairs(&values), vec![("A", 8), ("B", 2), ("C", 0)]);
    }

    #[test]
    fn restricts_to_date_range() {
        let ctx = context();
        let jan = DateRange::new(month("2022-01"), month("2022-01"));
        let values = compute_map_values(&ctx, &types(&["X"]), Some(&jan));
        assert_eq!(as_pairs(&values), vec![("A", 5), ("B", 0), ("C", 0)]);
    }

    #[test]
    fn multiple_types_are_or_combined() {
        let ctx = context();
        let values = compute_map_values(&ctx, &types(&["X", "Y"]), None);
        assert_eq!(as_pairs(&values), vec![("A", 8), ("B", 6), ("C", 0)]);
    }

    #[test]
    fn unknown_or_empty_types_yield_all_zero_catalog() {
        let ctx = context();
        for selection in [types(&["Nope"]), BTreeSet::new()] {
            let values = compute_map_values(&ctx, &selection, None);
            assert_eq!(values.len(), ctx.areas().len());
            assert!(values.iter().all(|v| v.count == 0));
        }
    }

    #[test]
    fn range_outside_data_yields_zeros() {
        let ctx = context();
        let later = DateRange::new(month("2030-01"), month("2030-12"));
        let values = compute_map_values(&ctx, &types(&["X", "Y"]), Some(&later));
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.count == 0));
    }

    #[test]
    fn total_matches_matching_facts() {
        let ctx = context();
        let selected = types(&["X"]);
        let range = DateRange::new(month("2022-02"), month("2022-02"));
        let values = compute_map_values(&ctx, &selected, Some(&range));

        let expected: u64 = ctx
            .dataset()
            .facts()
            .iter()
            .filter(|f| selected.contains(&f.violation_type) && range.contains(f.issue_month))
            .map(|f| f.count)
            .sum();
        assert_eq!(values.iter().map(|v| v.count).sum::<u64>(), expected);
    }
}
