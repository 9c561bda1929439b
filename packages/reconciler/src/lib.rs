#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection reconciler.
//!
//! Keeps the choropleth map, the monthly timeline, and the demographic bar
//! chart consistent with each other as the user changes the violation
//! types, brushes the timeline, or picks tracts on the map.
//!
//! [`view`] computes a complete [`DerivedView`] for a state from scratch.
//! [`reconcile`] applies a single [`SelectionEvent`] to a prior
//! [`Reconciliation`], recomputing only the views downstream of the input
//! that changed; its result always equals `view` of the new state.

pub mod context;
pub mod demographics;
pub mod map;
pub mod session;
pub mod timeline;
pub mod titles;

pub use context::ReconcilerContext;
pub use demographics::compute_demographic_bars;
pub use map::compute_map_values;
pub use session::Session;
pub use timeline::compute_timeline_series;

use ticket_explorer_reconciler_models::{
    DemographicView, DerivedView, MapView, Reconciliation, RecomputedViews, SelectionEvent,
    SelectionState, TimelineView,
};

fn map_title(ctx: &ReconcilerContext, state: &SelectionState) -> String {
    let range = state.date_range.or_else(|| ctx.full_range());
    titles::map_title(&state.violation_types, range.as_ref())
}

/// Computes every view for `state` from scratch.
#[must_use]
pub fn view(ctx: &ReconcilerContext, state: &SelectionState) -> DerivedView {
    let bars = compute_demographic_bars(ctx, &state.area_selection);

    DerivedView {
        map: MapView {
            title: map_title(ctx, state),
            values: compute_map_values(ctx, &state.violation_types, state.date_range.as_ref()),
        },
        timeline: TimelineView {
            title: titles::timeline_title(&state.area_selection).to_string(),
            points: compute_timeline_series(ctx, &state.area_selection, &state.violation_types),
        },
        demographics: DemographicView {
            title: titles::demographic_title(&bars.selected).to_string(),
            bars,
        },
        selection_hint: titles::selection_hint(&state.area_selection),
    }
}

/// First render of a session: the full view, every part flagged as
/// recomputed.
#[must_use]
pub fn initial(ctx: &ReconcilerContext, state: SelectionState) -> Reconciliation {
    let view = view(ctx, &state);
    Reconciliation {
        state,
        view,
        recomputed: RecomputedViews::ALL,
    }
}

/// Applies `event` to `prior`, recomputing only what the changed input
/// feeds and carrying the rest over from `prior.view`.
#[must_use]
pub fn reconcile(
    ctx: &ReconcilerContext,
    prior: &Reconciliation,
    event: &SelectionEvent,
) -> Reconciliation {
    let state = prior.state.apply(event);
    let recomputed = event.trigger().recomputes();
    let mut view = prior.view.clone();

    log::debug!(
        "Reconciling {:?}: types={:?} range={:?} selection={:?}",
        event.trigger(),
        state.violation_types,
        state.date_range,
        state.area_selection
    );

    if recomputed.map_values {
        view.map.values =
            compute_map_values(ctx, &state.violation_types, state.date_range.as_ref());
    }
    if recomputed.map_title {
        view.map.title = map_title(ctx, &state);
    }
    if recomputed.timeline {
        view.timeline = TimelineView {
            title: titles::timeline_title(&state.area_selection).to_string(),
            points: compute_timeline_series(ctx, &state.area_selection, &state.violation_types),
        };
    }
    if recomputed.demographic_fractions {
        view.demographics.bars = compute_demographic_bars(ctx, &state.area_selection);
    }
    if recomputed.demographic_title {
        view.demographics.title =
            titles::demographic_title(&view.demographics.bars.selected).to_string();
    }
    if recomputed.selection_hint {
        view.selection_hint = titles::selection_hint(&state.area_selection);
    }

    Reconciliation {
        state,
        view,
        recomputed,
    }
}


#[cfg(test)]
mod tests {
    use ticket_explorer_reconciler_models::{AreaSelection, SelectedComparison};
    use ticket_explorer_tickets_models::{DateRange, DemographicGroup};

    use super::*;
    use crate::test_support::{context, month};

    fn events() -> Vec<SelectionEvent> {
        vec![
            SelectionEvent::ViolationTypesChanged {
                violation_types: vec!["Y".to_string(), "X".to_string()],
            },
            SelectionEvent::DateRangeChanged {
                date_range: Some(DateRange::new(month("2022-02"), month("2022-02"))),
            },
            SelectionEvent::MapInteraction {
                selected: Some(vec!["A".to_string(), "C".to_string()]),
                clicked: None,
            },
            SelectionEvent::MapInteraction {
                selected: None,
                clicked: Some("B".to_string()),
            },
            SelectionEvent::DateRangeChanged { date_range: None },
            SelectionEvent::ViolationTypesChanged {
                violation_types: vec!["X".to_string()],
            },
            SelectionEvent::MapCleared,
        ]
    }

    #[test]
    fn incremental_matches_full_recompute() {
        let ctx = context();
        let mut current = initial(&ctx, ctx.initial_selection("X"));

        for event in events() {
            let next = reconcile(&ctx, &current, &event);
            assert_eq!(next.view, view(&ctx, &next.state), "after {event:?}");
            assert_eq!(next.recomputed, event.trigger().recomputes());
            current = next;
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let ctx = context();
        let start = initial(&ctx, ctx.initial_selection("X"));

        for event in events() {
            assert_eq!(
                reconcile(&ctx, &start, &event),
                reconcile(&ctx, &start, &event)
            );
        }
    }

    #[test]
    fn clear_restores_unselected_view() {
        let ctx = context();
        let start = initial(&ctx, ctx.initial_selection("X"));

        let selected = reconcile(
            &ctx,
            &start,
            &SelectionEvent::MapInteraction {
                selected: Some(vec!["B".to_string()]),
                clicked: None,
            },
        );
        assert_ne!(selected.view, start.view);

        let cleared = reconcile(&ctx, &selected, &SelectionEvent::MapCleared);
        assert_eq!(cleared.state, start.state);
        assert_eq!(cleared.view, start.view);
    }

    #[test]
    fn area_selection_leaves_map_untouched() {
        let ctx = context();
        let start = initial(&ctx, ctx.initial_selection("X"));
        let next = reconcile(
            &ctx,
            &start,
            &SelectionEvent::MapInteraction {
                selected: None,
                clicked: Some("A".to_string()),
            },
        );

        assert_eq!(next.view.map, start.view.map);
        assert_eq!(next.view.timeline.title, titles::SELECTED_TIMELINE_TITLE);
        assert_eq!(
            next.view.demographics.title,
            titles::SELECTED_DEMOGRAPHIC_TITLE
        );
        assert_eq!(
            next.view.selection_hint.as_deref(),
            Some(titles::SELECTION_HINT)
        );
    }

    #[test]
    fn date_range_leaves_timeline_and_demographics_untouched() {
        let ctx = context();
        let start = initial(&ctx, ctx.initial_selection("X"));
        let next = reconcile(
            &ctx,
            &start,
            &SelectionEvent::DateRangeChanged {
                date_range: Some(DateRange::new(month("2022-01"), month("2022-01"))),
            },
        );

        assert_eq!(next.view.timeline, start.view.timeline);
        assert_eq!(next.view.demographics, start.view.demographics);
        assert_eq!(next.view.map.get("A"), Some(5));
        assert_eq!(
            next.view.map.title,
            "Ticket type: X & Date range: Jan 2022 - Jan 2022"
        );
    }

    #[test]
    fn initial_view_scenario() {
        let ctx = context();
        let start = initial(&ctx, ctx.initial_selection("X"));

        assert_eq!(start.view.map.get("A"), Some(8));
        assert_eq!(start.view.map.get("B"), Some(2));
        assert_eq!(start.view.map.get("C"), Some(0));
        assert_eq!(
            start.view.map.title,
            "Ticket type: X & Date range: Jan 2022 - Feb 2022"
        );
        assert_eq!(start.view.timeline.title, titles::CITYWIDE_TIMELINE_TITLE);
        assert_eq!(start.view.timeline.points.len(), ctx.months().len());
        assert_eq!(
            start.view.demographics.bars.selected,
            SelectedComparison::NoSelection
        );
        assert_eq!(
            start.view.demographics.title,
            titles::NO_SELECTION_DEMOGRAPHIC_TITLE
        );
        assert!(start.view.selection_hint.is_none());
    }

    #[test]
    fn zero_population_selection_reports_no_data() {
        let ctx = context();
        let state = ctx
            .initial_selection("X")
            .with_area_selection(AreaSelection::from_ids(["C"]));
        let derived = view(&ctx, &state);

        assert_eq!(derived.demographics.bars.selected, SelectedComparison::NoData);
        assert_eq!(derived.demographics.title, titles::NO_DATA_DEMOGRAPHIC_TITLE);
        assert!(
            derived
                .demographics
                .bars
                .selected_values()
                .iter()
                .all(|(_, v)| *v == 0.0)
        );
        assert!(derived.demographics.bars.citywide[&DemographicGroup::White] > 0.0);
    }

    #[test]
    fn timeline_length_is_constant() {
        let ctx = context();
        let mut current = initial(&ctx, ctx.initial_selection("X"));
        for event in events() {
            current = reconcile(&ctx, &current, &event);
            assert_eq!(current.view.timeline.points.len(), ctx.months().len());
        }
    }
}
