//! Newline-delimited JSON output, one document per update.

use std::io::Write;

use serde::Serialize;
use ticket_explorer_reconciler_models::DerivedView;

use crate::{RenderAdapter, RenderError, ViewPatch};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum Update<'a> {
    Full { view: &'a DerivedView },
    Patch { patch: &'a ViewPatch },
}

/// Writes `{"kind":"full","view":…}` or `{"kind":"patch","patch":…}` lines
/// to any writer.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, update: &Update<'_>) -> Result<(), RenderError> {
        serde_json::to_writer(&mut self.out, update)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> RenderAdapter for JsonLinesRenderer<W> {
    fn render(&mut self, view: &DerivedView) -> Result<(), RenderError> {
        self.emit(&Update::Full { view })
    }

    fn apply_patch(&mut self, patch: &ViewPatch) -> Result<(), RenderError> {
        self.emit(&Update::Patch { patch })
    }
}
