//! Replays a recorded stream of selection events.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use ticket_explorer_reconciler::{ReconcilerContext, Session};
use ticket_explorer_reconciler_models::SelectionEvent;
use ticket_explorer_render::{JsonLinesRenderer, RenderAdapter, present};

/// Emits the initial full view, then one patch per event, as JSON lines on
/// stdout. Blank lines are skipped.
///
/// # Errors
///
/// Returns an error if the events file cannot be read, a line is not a
/// valid event, or writing to stdout fails.
pub fn run(
    ctx: &Arc<ReconcilerContext>,
    initial_type: &str,
    events: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = if events.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(events)?))
    };

    let mut session = Session::with_initial_type(Arc::clone(ctx), initial_type);
    let mut renderer = JsonLinesRenderer::new(io::stdout().lock());
    renderer.render(session.view())?;

    let mut applied = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: SelectionEvent = serde_json::from_str(&line)
            .map_err(|e| format!("{}:{}: {e}", events.display(), idx + 1))?;
        present(&mut renderer, session.apply(&event))?;
        applied += 1;
    }

    log::info!("Replayed {applied} events");
    Ok(())
}
