// SPDX: CC0-1.0

//! Pan and zoom between screen pixels and math space.
//!
//! Screen y grows downward while math y grows upward, so every y mapping
//! flips sign.

use crate::{config::ZoomAnchor, Number, Point, Size};
use log::debug;

/// Decimal places zoom is rounded to after each step.
pub const ZOOM_PLACES: u32 = 4;
/// Smallest zoom representable at [`ZOOM_PLACES`].
pub const MIN_ZOOM: Number = 1e-4;

/// Rounds `value` to `places` decimal places, leaving it untouched if the
/// scaled value does not fit.
pub fn round_places(value: Number, places: u32) -> Number {
    let scale = Number::powi(10.0, places.min(i32::MAX as u32) as i32);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// math units to pixels, always positive
    pub zoom: Number,
    /// screen position of the math-space origin
    pub pan: Point<Number>,
}

impl Viewport {
    pub fn centered(canvas: Size) -> Self {
        Self {
            zoom: 1.0,
            pan: canvas.center(),
        }
    }

    pub fn to_math(&self, screen: Point<Number>) -> Point<Number> {
        Point {
            x: (screen.x - self.pan.x) / self.zoom,
            y: -(screen.y - self.pan.y) / self.zoom,
        }
    }

    pub fn to_screen(&self, math: Point<Number>) -> Point<Number> {
        Point {
            x: math.x * self.zoom + self.pan.x,
            y: -math.y * self.zoom + self.pan.y,
        }
    }

    pub fn pan(&mut self, dx: Number, dy: Number) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Multiplies zoom by `factor` about `pivot` (screen space).
    ///
    /// `factor > 1` zooms in. The new zoom is rounded to [`ZOOM_PLACES`]
    /// decimals; a step too small to survive rounding moves zoom by one unit
    /// in the last place instead, so zoom stays strictly monotone until it
    /// reaches [`MIN_ZOOM`].
    pub fn zoom_by(&mut self, factor: Number, pivot: Point<Number>, canvas: Size, anchor: ZoomAnchor) {
        if !(factor.is_finite() && factor > 0.0) || factor == 1.0 {
            return;
        }
        let zoom_in = factor > 1.0;
        let old = self.zoom;
        let pivot_math = self.to_math(pivot);

        let mut zoom = round_places(old * factor, ZOOM_PLACES);
        if zoom == old {
            zoom = if zoom_in { old + MIN_ZOOM } else { old - MIN_ZOOM };
            zoom = round_places(zoom, ZOOM_PLACES);
        }
        self.zoom = zoom.max(MIN_ZOOM);

        match anchor {
            ZoomAnchor::Pivot => {
                self.pan.x = pivot.x - pivot_math.x * self.zoom;
                self.pan.y = pivot.y + pivot_math.y * self.zoom;
            }
            ZoomAnchor::Nudge { pan_factor } => {
                let center = canvas.center();
                let dx = (pivot.x - center.x) / canvas.width * pan_factor;
                let dy = (pivot.y - center.y) / canvas.height * pan_factor;
                let sign = if zoom_in { -1.0 } else { 1.0 };
                self.pan.x = (self.pan.x + sign * dx).round();
                self.pan.y = (self.pan.y + sign * dy).round();
            }
        }

        debug!(
            "zoom {old} -> {new} about {pivot}, pan now {pan}",
            new = self.zoom,
            pan = self.pan
        );
    }

    /// Decimal places the free variable is rounded to before evaluation:
    /// one more than the number of digits in the rounded zoom.
    pub fn sig_figs(&self) -> u32 {
        let whole = self.zoom.abs().round();
        let digits = if whole < 10.0 {
            1
        } else {
            whole.log10().floor() as u32 + 1
        };
        digits + 1
    }
}
