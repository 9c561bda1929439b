//! Interactive explorer loop.
//!
//! Each menu choice becomes one [`SelectionEvent`], which is reconciled
//! against the session and handed to the active render adapter.

use std::io;
use std::sync::Arc;

use dialoguer::{Input, MultiSelect, Select};
use geo::{Rect, coord};
use ticket_explorer_dataset::spatial::BoundaryIndex;
use ticket_explorer_reconciler::{ReconcilerContext, Session};
use ticket_explorer_reconciler_models::SelectionEvent;
use ticket_explorer_render::{JsonLinesRenderer, RenderAdapter, present};
use ticket_explorer_tickets_models::{DateRange, IssueMonth};

use crate::terminal::TerminalRenderer;

/// Top-level actions in the explorer menu.
enum ExploreAction {
    ViolationTypes,
    DateRange,
    ResetDateRange,
    AreasById,
    AreaAtPoint,
    AreasInBox,
    ClearSelection,
    Quit,
}

impl ExploreAction {
    const ALL: &[Self] = &[
        Self::ViolationTypes,
        Self::DateRange,
        Self::ResetDateRange,
        Self::AreasById,
        Self::AreaAtPoint,
        Self::AreasInBox,
        Self::ClearSelection,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ViolationTypes => "Change violation types",
            Self::DateRange => "Set date range",
            Self::ResetDateRange => "Reset date range",
            Self::AreasById => "Select tracts by GEOID",
            Self::AreaAtPoint => "Click a point on the map (lng, lat)",
            Self::AreasInBox => "Box-select on the map (two corners)",
            Self::ClearSelection => "Clear map selection",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the explorer until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails or the adapter cannot write.
pub fn run(
    ctx: Arc<ReconcilerContext>,
    initial_type: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let boundaries = BoundaryIndex::from_areas(ctx.areas());
    if boundaries.is_empty() {
        log::warn!("No tract boundaries loaded; map point and box selection are unavailable");
    }

    let mut adapter: Box<dyn RenderAdapter> = if json {
        Box::new(JsonLinesRenderer::new(io::stdout()))
    } else {
        Box::new(TerminalRenderer::new(io::stdout()))
    };

    let mut session = Session::with_initial_type(ctx, initial_type);
    adapter.render(session.view())?;

    let labels: Vec<&str> = ExploreAction::ALL.iter().map(ExploreAction::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("Explore")
            .items(&labels)
            .default(0)
            .interact()?;

        let event = match ExploreAction::ALL[idx] {
            ExploreAction::ViolationTypes => prompt_violation_types(&session)?,
            ExploreAction::DateRange => prompt_date_range(&session)?,
            ExploreAction::ResetDateRange => {
                Some(SelectionEvent::DateRangeChanged { date_range: None })
            }
            ExploreAction::AreasById => prompt_area_ids()?,
            ExploreAction::AreaAtPoint => prompt_point(&boundaries)?,
            ExploreAction::AreasInBox => prompt_box(&boundaries)?,
            ExploreAction::ClearSelection => Some(SelectionEvent::MapCleared),
            ExploreAction::Quit => break,
        };

        let Some(event) = event else {
            continue;
        };
        present(adapter.as_mut(), session.apply(&event))?;
    }

    Ok(())
}

fn prompt_violation_types(
    session: &Session,
) -> Result<Option<SelectionEvent>, Box<dyn std::error::Error>> {
    let catalog: Vec<&str> = session.context().violation_types().collect();
    let defaults: Vec<bool> = catalog
        .iter()
        .map(|t| session.state().violation_types.contains(*t))
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("Violation types (space=toggle, enter=confirm)")
        .items(&catalog)
        .defaults(&defaults)
        .max_length(20)
        .interact()?;

    if picked.is_empty() {
        println!("Keep at least one violation type selected.");
        return Ok(None);
    }

    Ok(Some(SelectionEvent::ViolationTypesChanged {
        violation_types: picked.iter().map(|&i| catalog[i].to_string()).collect(),
    }))
}

fn prompt_date_range(
    session: &Session,
) -> Result<Option<SelectionEvent>, Box<dyn std::error::Error>> {
    let Some(full) = session.context().full_range() else {
        println!("The dataset has no months.");
        return Ok(None);
    };
    let current = session.state().date_range.unwrap_or(full);

    let month_input = |prompt: &str, default: IssueMonth| {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(String::from(default))
            .validate_with(|s: &String| {
                s.parse::<IssueMonth>()
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()
    };

    let start: IssueMonth = month_input("From (YYYY-MM)", current.start())?.parse()?;
    let end: IssueMonth = month_input("To (YYYY-MM)", current.end())?.parse()?;

    Ok(Some(SelectionEvent::DateRangeChanged {
        date_range: Some(DateRange::new(start, end)),
    }))
}

fn prompt_area_ids() -> Result<Option<SelectionEvent>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt("GEOIDs (comma-separated, empty to clear)")
        .allow_empty(true)
        .interact_text()?;

    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    Ok(Some(SelectionEvent::MapInteraction {
        selected: Some(ids),
        clicked: None,
    }))
}

fn prompt_coordinate(prompt: &str) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|s: &String| parse_coordinate(s).map(|_| ()))
        .interact_text()?;
    Ok(parse_coordinate(&raw)?)
}

/// Parses `"lng, lat"`.
fn parse_coordinate(s: &str) -> Result<(f64, f64), String> {
    let (lng, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected 'lng, lat', got '{s}'"))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("Invalid longitude '{lng}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("Invalid latitude '{lat}'"))?;
    Ok((lng, lat))
}

fn prompt_point(
    boundaries: &BoundaryIndex,
) -> Result<Option<SelectionEvent>, Box<dyn std::error::Error>> {
    if boundaries.is_empty() {
        println!("No tract boundaries loaded.");
        return Ok(None);
    }

    let (lng, lat) = prompt_coordinate("Point (lng, lat)")?;
    let Some(area_id) = boundaries.area_at(lng, lat) else {
        println!("No tract at ({lng}, {lat}).");
        return Ok(None);
    };

    Ok(Some(SelectionEvent::MapInteraction {
        selected: None,
        clicked: Some(area_id.to_string()),
    }))
}

fn prompt_box(
    boundaries: &BoundaryIndex,
) -> Result<Option<SelectionEvent>, Box<dyn std::error::Error>> {
    if boundaries.is_empty() {
        println!("No tract boundaries loaded.");
        return Ok(None);
    }

    let (x1, y1) = prompt_coordinate("First corner (lng, lat)")?;
    let (x2, y2) = prompt_coordinate("Opposite corner (lng, lat)")?;
    let lasso = Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 }).to_polygon();

    let ids: Vec<String> = boundaries
        .areas_within(&lasso)
        .into_iter()
        .map(ToString::to_string)
        .collect();
    println!("{} tracts in box.", ids.len());

    Ok(Some(SelectionEvent::MapInteraction {
        selected: Some(ids),
        clicked: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::parse_coordinate;

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_coordinate("-87.63, 41.88"), Ok((-87.63, 41.88)));
        assert!(parse_coordinate("-87.63").is_err());
        assert!(parse_coordinate("west, 41").is_err());
    }
}
