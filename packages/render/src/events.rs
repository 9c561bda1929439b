//! Translation of chart interaction payloads into selection events.
//!
//! The map reports selections as `{"points": [{"location": "<GEOID>"}, …]}`
//! (`null` after a double-click) and clicks in the same shape. The timeline
//! reports brushing and zooming through relayout payloads keyed by
//! `xaxis.range[0]`/`xaxis.range[1]`, an `xaxis.range` array, or
//! `xaxis.autorange` on reset.

use chrono::DateTime;
use serde_json::Value;
use ticket_explorer_reconciler_models::SelectionEvent;
use ticket_explorer_tickets_models::{DateRange, IssueMonth};

/// Errors that can occur while translating an interaction payload.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// An axis bound is neither a date string nor a millisecond timestamp.
    #[error("Invalid date in relayout payload: {value}")]
    InvalidDate {
        /// The offending JSON value.
        value: String,
    },
}

fn point_locations(data: &Value) -> Vec<String> {
    data.get("points")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(|p| p.get("location"))
                .filter_map(|location| match location {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Event for a map box/lasso selection payload.
///
/// A missing or `null` payload (the map was double-clicked) clears the
/// selection.
#[must_use]
pub fn map_selection_event(selected_data: Option<&Value>) -> SelectionEvent {
    match selected_data {
        None | Some(Value::Null) => SelectionEvent::MapCleared,
        Some(data) => SelectionEvent::MapInteraction {
            selected: Some(point_locations(data)),
            clicked: None,
        },
    }
}

/// Event for a map click payload, or `None` if it names no tract.
#[must_use]
pub fn map_click_event(click_data: Option<&Value>) -> Option<SelectionEvent> {
    let clicked = point_locations(click_data?).into_iter().next()?;
    Some(SelectionEvent::MapInteraction {
        selected: None,
        clicked: Some(clicked),
    })
}

fn axis_month(value: &Value) -> Result<IssueMonth, EventError> {
    let invalid = || EventError::InvalidDate {
        value: value.to_string(),
    };

    match value {
        Value::String(s) => s.parse().map_err(|_| invalid()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc().into())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Event for a timeline relayout payload.
///
/// Returns `Ok(None)` for relayouts that do not touch the x axis range
/// (e.g. a y-axis zoom or a drag mode change).
///
/// # Errors
///
/// Returns [`EventError::InvalidDate`] if an x axis bound cannot be read as
/// a date.
pub fn timeline_relayout_event(relayout: &Value) -> Result<Option<SelectionEvent>, EventError> {
    let bounds = match (relayout.get("xaxis.range[0]"), relayout.get("xaxis.range[1]")) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => relayout
            .get("xaxis.range")
            .and_then(Value::as_array)
            .and_then(|range| match range.as_slice() {
                [start, end] => Some((start, end)),
                _ => None,
            }),
    };

    if let Some((start, end)) = bounds {
        let range = DateRange::new(axis_month(start)?, axis_month(end)?);
        log::debug!("Timeline brushed to {range}");
        return Ok(Some(SelectionEvent::DateRangeChanged {
            date_range: Some(range),
        }));
    }

    if relayout.get("xaxis.autorange").and_then(Value::as_bool) == Some(true) {
        return Ok(Some(SelectionEvent::DateRangeChanged { date_range: None }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn month(s: &str) -> IssueMonth {
        s.parse().unwrap()
    }

    #[test]
    fn selection_reads_locations() {
        let payload = json!({"points": [{"location": "A", "z": 3}, {"location": "B"}]});
        assert_eq!(
            map_selection_event(Some(&payload)),
            SelectionEvent::MapInteraction {
                selected: Some(vec!["A".to_string(), "B".to_string()]),
                clicked: None,
            }
        );
    }

    #[test]
    fn null_selection_clears() {
        assert_eq!(map_selection_event(None), SelectionEvent::MapCleared);
        assert_eq!(
            map_selection_event(Some(&Value::Null)),
            SelectionEvent::MapCleared
        );
    }

    #[test]
    fn empty_lasso_is_empty_selection() {
        let payload = json!({"points": []});
        assert_eq!(
            map_selection_event(Some(&payload)),
            SelectionEvent::MapInteraction {
                selected: Some(Vec::new()),
                clicked: None,
            }
        );
    }

    #[test]
    fn click_takes_first_point() {
        let payload = json!({"points": [{"location": 17_031_010_100_u64}]});
        assert_eq!(
            map_click_event(Some(&payload)),
            Some(SelectionEvent::MapInteraction {
                selected: None,
                clicked: Some("17031010100".to_string()),
            })
        );
        assert_eq!(map_click_event(Some(&json!({"points": []}))), None);
        assert_eq!(map_click_event(None), None);
    }

    #[test]
    fn brush_truncates_to_months() {
        let payload = json!({
            "xaxis.range[0]": "2022-03-14 06:12:45.123",
            "xaxis.range[1]": "2021-11-02",
        });
        assert_eq!(
            timeline_relayout_event(&payload).unwrap(),
            Some(SelectionEvent::DateRangeChanged {
                date_range: Some(DateRange::new(month("2021-11"), month("2022-03"))),
            })
        );
    }

    #[test]
    fn range_array_and_timestamps() {
        // 2022-01-01T00:00:00Z and 2022-06-15T00:00:00Z
        let payload = json!({"xaxis.range": [1_640_995_200_000_i64, 1_655_251_200_000_i64]});
        assert_eq!(
            timeline_relayout_event(&payload).unwrap(),
            Some(SelectionEvent::DateRangeChanged {
                date_range: Some(DateRange::new(month("2022-01"), month("2022-06"))),
            })
        );
    }

    #[test]
    fn autorange_resets() {
        let payload = json!({"xaxis.autorange": true});
        assert_eq!(
            timeline_relayout_event(&payload).unwrap(),
            Some(SelectionEvent::DateRangeChanged { date_range: None })
        );
    }

    #[test]
    fn unrelated_relayout_is_ignored() {
        assert!(
            timeline_relayout_event(&json!({"dragmode": "select"}))
                .unwrap()
                .is_none()
        );
        assert!(
            timeline_relayout_event(&json!({"yaxis.range[0]": 0, "yaxis.range[1]": 5}))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn garbage_bounds_are_errors() {
        let payload = json!({"xaxis.range[0]": "soon", "xaxis.range[1]": "2022-01"});
        assert!(matches!(
            timeline_relayout_event(&payload),
            Err(EventError::InvalidDate { .. })
        ));
    }
}
