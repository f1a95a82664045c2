//! Screen rendering
//!
//! The OLED shows a white frame with a black inset and up to four
//! text rows. Which rows exist is decided once, at startup, from the
//! rows that actually produced text; afterwards rows are only ever
//! overwritten, never added or removed.
//!
//! A missing panel is not fatal. The renderer then stays inert for the
//! life of the process.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::Vec;

use crate::config::DisplayGeometry;
use crate::telemetry::{Line, MAX_ROWS};
use crate::traits::Panel;

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderStats {
    /// Completed refreshes
    pub refreshes: u32,
    /// Failed draw or flush operations
    pub errors: u32,
}

/// A text row bound to a layout position
#[derive(Debug, Clone)]
struct Slot {
    /// Index into the layout this slot renders
    layout_row: usize,
    text: Line,
}

/// Status screen renderer
pub struct Renderer<P> {
    panel: Option<P>,
    geometry: DisplayGeometry,
    slots: Vec<Slot, MAX_ROWS>,
    stats: RenderStats,
}

impl<P: Panel> Renderer<P> {
    /// Create the renderer and draw the first frame
    ///
    /// `initial` holds one entry per layout row; rows that are `None`
    /// here never get a slot.
    pub fn new(panel: Option<P>, geometry: DisplayGeometry, initial: &[Option<Line>]) -> Self {
        let capacity = geometry.max_rows().min(MAX_ROWS);
        let slots = initial
            .iter()
            .enumerate()
            .filter_map(|(layout_row, text)| {
                text.as_ref().map(|text| Slot {
                    layout_row,
                    text: text.clone(),
                })
            })
            .take(capacity)
            .collect();

        let mut renderer = Self {
            panel,
            geometry,
            slots,
            stats: RenderStats::default(),
        };
        renderer.draw_frame();
        renderer.redraw();
        renderer
    }

    /// Check if a panel is attached
    pub fn is_active(&self) -> bool {
        self.panel.is_some()
    }

    /// Number of text rows fixed at startup
    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    /// Current text of a slot
    pub fn row_text(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(|s| s.text.as_str())
    }

    /// Diagnostic counters
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Borrow the panel
    pub fn panel(&self) -> Option<&P> {
        self.panel.as_ref()
    }

    /// Overwrite every slot from freshly rendered layout rows and redraw
    ///
    /// A slot whose row failed this time keeps its previous text.
    /// Does nothing without a panel.
    pub fn refresh(&mut self, rows: &[Option<Line>]) {
        if self.panel.is_none() {
            return;
        }

        for slot in self.slots.iter_mut() {
            if let Some(Some(text)) = rows.get(slot.layout_row) {
                slot.text.clone_from(text);
            }
        }
        self.redraw();
    }

    /// Background and inset, drawn once
    fn draw_frame(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let g = self.geometry;

        let background = Rectangle::new(Point::zero(), Size::new(g.width, g.height))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On));
        let inset = Rectangle::new(
            Point::new(g.border as i32, g.border as i32),
            Size::new(
                g.width.saturating_sub(g.border * 2),
                g.height.saturating_sub(g.border * 2),
            ),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off));

        if background.draw(panel).is_err() || inset.draw(panel).is_err() {
            self.stats.errors += 1;
        }
    }

    /// Clear and redraw every slot, then flush
    fn redraw(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let g = self.geometry;
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let mut errors = 0;

        for (row, slot) in self.slots.iter().enumerate() {
            if row_area(&g, row)
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                .draw(panel)
                .is_err()
            {
                errors += 1;
            }

            let origin = Point::new(g.text_x(), g.row_center_y(row));
            if Text::with_baseline(&slot.text, origin, style, Baseline::Middle)
                .draw(panel)
                .is_err()
            {
                errors += 1;
            }
        }

        if panel.flush().is_err() {
            errors += 1;
        }

        self.stats.errors += errors;
        self.stats.refreshes += 1;
    }
}

/// Pixels owned by text row `row`, clipped to the inset
fn row_area(g: &DisplayGeometry, row: usize) -> Rectangle {
    let half = (g.row_pitch() / 2) as i32;
    let center = g.row_center_y(row);
    let top = (center - half).max(g.border as i32);
    let bottom = (center + half).min(g.height.saturating_sub(g.border) as i32);
    let width = g.width.saturating_sub(g.border * 2);
    Rectangle::new(
        Point::new(g.border as i32, top),
        Size::new(width, (bottom - top).max(0) as u32),
    )
}
