// SPDX: CC0-1.0

use crate::{Number, Size};
use core::{fmt, num::NonZeroU16};

/// How a zoom step moves the pan offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomAnchor {
    /// The math-space point under the pivot stays under the pivot.
    Pivot,
    /// Pan is nudged by the pivot's offset from the canvas centre, normalized
    /// to the canvas size and scaled by `pan_factor` pixels.
    Nudge { pan_factor: Number },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub canvas: Size,
    /// pixels traveled horizontally before sampling another point
    pub precision: NonZeroU16,
    /// fraction one wheel step zooms in or out
    pub zoom_percentage: Number,
    /// grid spacing grows once more than this many cells (plus one) would fit
    pub max_grid_cells: u16,
    pub zoom_anchor: ZoomAnchor,
    /// minor-line index past which labels are no longer drawn
    pub label_cap: usize,
    pub equation: String,
}

pub const DEFAULT_PAN_FACTOR: Number = 100.0;

/// Largest canvas side accepted, in pixels.
pub const MAX_CANVAS_SIDE: Number = 32_768.0;

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: Size::new(800.0, 600.0),
            precision: NonZeroU16::MIN,
            zoom_percentage: 0.05,
            max_grid_cells: 3,
            zoom_anchor: ZoomAnchor::Pivot,
            label_cap: 1000,
            equation: String::from("sin(x / 30) * 100"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigErr {
    Canvas(Size),
    ZoomPercentage(Number),
    PanFactor(Number),
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canvas(size) => write!(
                f,
                "canvas sides must be positive and at most {MAX_CANVAS_SIDE}, got {size}"
            ),
            Self::ZoomPercentage(val) => {
                write!(f, "zoom percentage must be positive and finite, got {val}")
            }
            Self::PanFactor(val) => write!(f, "pan factor must be finite, got {val}"),
        }
    }
}

impl std::error::Error for ConfigErr {}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("canvas", &self.canvas)
            .field("precision", &self.precision)
            .field("zoom percentage", &self.zoom_percentage)
            .field("max grid cells", &self.max_grid_cells)
            .field("zoom anchor", &self.zoom_anchor)
            .field("label cap", &self.label_cap)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigErr> {
        validate_canvas(self.canvas)?;
        if !(self.zoom_percentage.is_finite() && self.zoom_percentage > 0.0) {
            return Err(ConfigErr::ZoomPercentage(self.zoom_percentage));
        }
        if let ZoomAnchor::Nudge { pan_factor } = self.zoom_anchor {
            if !pan_factor.is_finite() {
                return Err(ConfigErr::PanFactor(pan_factor));
            }
        }
        Ok(())
    }

    /// Zoom multiplier for one step in.
    pub fn zoom_factor(&self) -> Number {
        1.0 + self.zoom_percentage
    }
}

pub fn validate_canvas(canvas: Size) -> Result<(), ConfigErr> {
    let side_ok = |side: Number| side > 0.0 && side <= MAX_CANVAS_SIDE;
    if side_ok(canvas.width) && side_ok(canvas.height) {
        Ok(())
    } else {
        Err(ConfigErr::Canvas(canvas))
    }
}
