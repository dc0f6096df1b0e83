//! SeriesLook: visual styling for plotted fields.

use egui::Color32;

/// Colors handed out to fields in selection order.
pub const PALETTE: [Color32; 10] = [
    Color32::RED,
    Color32::GREEN,
    Color32::BLUE,
    Color32::YELLOW,
    Color32::from_rgb(255, 165, 0),
    Color32::from_rgb(0, 255, 255),
    Color32::from_rgb(255, 0, 255),
    Color32::from_rgb(255, 175, 175),
    Color32::GRAY,
    Color32::WHITE,
];

/// The visual presentation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesLook {
    pub color: Color32,
    pub width: f32,
}

impl Default for SeriesLook {
    fn default() -> Self {
        Self {
            color: Color32::GRAY,
            width: 1.5,
        }
    }
}

impl SeriesLook {
    /// Look for the field at `index`; colors wrap around after the palette.
    pub fn new(index: usize) -> Self {
        Self {
            color: Self::alloc_color(index),
            ..Default::default()
        }
    }

    pub fn alloc_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }
}
