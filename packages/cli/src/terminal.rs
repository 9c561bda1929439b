//! Plain-text rendering of the three views for the interactive explorer.

use std::io::Write;

use ticket_explorer_reconciler_models::{
    AreaCount, DemographicBars, DerivedView, SelectedComparison, TimelineView,
};
use ticket_explorer_render::{RenderAdapter, RenderError, ViewPatch};

/// Number of tracts listed under the map heading.
const TOP_AREAS: usize = 10;

/// Width of the widest timeline bar.
const BAR_WIDTH: f64 = 40.0;

/// Writes human-readable summaries of each view. Patches redraw only the
/// sections they carry.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn map(&mut self, title: Option<&str>, values: Option<&[AreaCount]>) -> std::io::Result<()> {
        if let Some(title) = title {
            writeln!(self.out, "== {title}")?;
        }
        let Some(values) = values else {
            return Ok(());
        };

        let mut ranked: Vec<&AreaCount> = values.iter().filter(|v| v.count > 0).collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.area_id.cmp(&b.area_id)));

        let total: u64 = values.iter().map(|v| v.count).sum();
        writeln!(
            self.out,
            "   {total} tickets across {} tracts ({} with tickets)",
            values.len(),
            ranked.len()
        )?;
        for area in ranked.iter().take(TOP_AREAS) {
            writeln!(self.out, "   {:<14} {:>8}", area.area_id, area.count)?;
        }
        Ok(())
    }

    fn timeline(&mut self, timeline: &TimelineView) -> std::io::Result<()> {
        writeln!(self.out, "== {}", timeline.title)?;

        let max = timeline
            .points
            .iter()
            .filter_map(|p| p.value)
            .fold(0.0_f64, f64::max);

        for point in &timeline.points {
            match point.value {
                Some(value) => {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let width = if max > 0.0 {
                        (value / max * BAR_WIDTH).round() as usize
                    } else {
                        0
                    };
                    writeln!(
                        self.out,
                        "   {:<9} {:>10.1} {}",
                        point.month.to_string(),
                        value,
                        "#".repeat(width)
                    )?;
                }
                None => writeln!(self.out, "   {:<9} {:>10}", point.month.to_string(), "-")?,
            }
        }
        Ok(())
    }

    fn demographics(
        &mut self,
        title: Option<&str>,
        bars: Option<&DemographicBars>,
    ) -> std::io::Result<()> {
        if let Some(title) = title {
            writeln!(self.out, "== {title}")?;
        }
        let Some(bars) = bars else {
            return Ok(());
        };

        let compare = matches!(bars.selected, SelectedComparison::Fractions(_));
        for ((group, citywide), (_, selected)) in
            bars.citywide_values().into_iter().zip(bars.selected_values())
        {
            if compare {
                writeln!(
                    self.out,
                    "   {:<9} citywide {:>5.1}%   selected {:>5.1}%",
                    group.to_string(),
                    citywide * 100.0,
                    selected * 100.0
                )?;
            } else {
                writeln!(
                    self.out,
                    "   {:<9} citywide {:>5.1}%",
                    group.to_string(),
                    citywide * 100.0
                )?;
            }
        }
        Ok(())
    }

    fn hint(&mut self, hint: &str) -> std::io::Result<()> {
        if hint.is_empty() {
            Ok(())
        } else {
            writeln!(self.out, "({hint})")
        }
    }
}

impl<W: Write> RenderAdapter for TerminalRenderer<W> {
    fn render(&mut self, view: &DerivedView) -> Result<(), RenderError> {
        self.map(Some(&view.map.title), Some(&view.map.values))?;
        self.timeline(&view.timeline)?;
        self.demographics(
            Some(&view.demographics.title),
            Some(&view.demographics.bars),
        )?;
        self.hint(view.selection_hint.as_deref().unwrap_or_default())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn apply_patch(&mut self, patch: &ViewPatch) -> Result<(), RenderError> {
        if patch.is_empty() {
            writeln!(self.out, "(nothing changed)")?;
            return Ok(());
        }

        self.map(patch.map_title.as_deref(), patch.map_values.as_deref())?;
        if let Some(timeline) = &patch.timeline {
            self.timeline(timeline)?;
        }
        self.demographics(
            patch.demographic_title.as_deref(),
            patch.demographic_bars.as_ref(),
        )?;
        if let Some(hint) = &patch.selection_hint {
            self.hint(hint)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ticket_explorer_reconciler_models::{
        DemographicView, MapView, SelectionState, TimelinePoint,
    };
    use ticket_explorer_tickets_models::DemographicGroup;

    use super::*;

    fn view() -> DerivedView {
        DerivedView {
            map: MapView {
                title: "Ticket type: X & Date range: Jan 2022 - Feb 2022".to_string(),
                values: vec![
                    AreaCount {
                        area_id: "A".to_string(),
                        count: 8,
                    },
                    AreaCount {
                        area_id: "B".to_string(),
                        count: 2,
                    },
                    AreaCount {
                        area_id: "C".to_string(),
                        count: 0,
                    },
                ],
            },
            timeline: TimelineView {
                title: "Total citywide".to_string(),
                points: vec![
                    TimelinePoint {
                        month: "2022-01".parse().unwrap(),
                        value: Some(5.0),
                    },
                    TimelinePoint {
                        month: "2022-02".parse().unwrap(),
                        value: None,
                    },
                ],
            },
            demographics: DemographicView {
                title: "Race and ethnicity citywide and selected area".to_string(),
                bars: DemographicBars {
                    citywide: BTreeMap::from([(DemographicGroup::White, 0.5)]),
                    selected: SelectedComparison::Fractions(BTreeMap::from([(
                        DemographicGroup::White,
                        0.6,
                    )])),
                },
            },
            selection_hint: Some("Double-click map to remove selection".to_string()),
        }
    }

    fn rendered(f: impl FnOnce(&mut TerminalRenderer<Vec<u8>>)) -> String {
        let mut renderer = TerminalRenderer::new(Vec::new());
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn full_render_lists_every_section() {
        let out = rendered(|r| r.render(&view()).unwrap());
        assert!(out.contains("== Ticket type: X"));
        assert!(out.contains("10 tickets across 3 tracts (2 with tickets)"));
        assert!(out.contains("== Total citywide"));
        assert!(out.contains("Jan 2022"));
        assert!(out.contains("selected  60.0%"));
        assert!(out.contains("(Double-click map to remove selection)"));
    }

    #[test]
    fn patch_redraws_only_its_sections() {
        let patch = ViewPatch {
            state: SelectionState::new(["X"]),
            map_values: None,
            map_title: None,
            timeline: Some(view().timeline),
            demographic_bars: None,
            demographic_title: None,
            selection_hint: None,
        };
        let out = rendered(|r| r.apply_patch(&patch).unwrap());
        assert!(out.contains("== Total citywide"));
        assert!(!out.contains("Ticket type"));
        assert!(!out.contains("Race and ethnicity"));
    }
}
