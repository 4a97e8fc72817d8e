// SPDX: CC0-1.0

use crate::{
    eval::{EvalErr, Equation, Idents},
    viewport::{self, Viewport},
    Number, Point,
};
use core::num::NonZeroU16;
use log::{trace, warn};

/// One horizontal step of a curve. `y` is `None` where the equation could not
/// be evaluated, which the renderer draws as a gap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub x: Number,
    pub y: Option<Number>,
}

impl Sample {
    pub fn point(&self) -> Option<Point<Number>> {
        self.y.map(|y| Point::new(self.x, y))
    }
}

pub type Curve = Vec<Sample>;

/// Most samples one walk produces; wider walks are cut off at the right.
pub const MAX_SAMPLES: usize = 1 << 16;

/// Walks screen x from 0 in `precision` pixel steps until it passes
/// `width`, evaluating `f` at the matching math-space x and mapping the result
/// back to screen y.
///
/// Ordering is strictly increasing in screen x. A sample whose evaluation
/// fails becomes a gap; it never stops the walk.
pub fn sample<F, FErr>(mut f: F, viewport: &Viewport, width: Number, precision: NonZeroU16) -> Curve
where
    F: FnMut(Number) -> Result<Number, FErr>,
{
    let step = Number::from(precision.get());
    // every x < width + precision, so the right edge is always covered
    let count = if width.is_finite() && width >= 0.0 {
        // float to int casts saturate
        ((width / step).ceil() as usize).saturating_add(1)
    } else {
        0
    };
    let count = if count > MAX_SAMPLES {
        warn!("{count} samples across {width} px, keeping the first {MAX_SAMPLES}");
        MAX_SAMPLES
    } else {
        count
    };

    let mut curve = Vec::with_capacity(count);
    for i in 0..count {
        let x = i as Number * step;
        let math_x = viewport.to_math(Point::new(x, 0.0)).x;
        let y = match f(math_x) {
            Ok(y) if y.is_finite() => Some(-y * viewport.zoom + viewport.pan.y),
            Ok(_) | Err(_) => {
                trace!("gap at screen x {x} (math x {math_x})");
                None
            }
        };
        curve.push(Sample { x, y });
    }
    curve
}

/// Samples `equation` across the canvas, rounding each math-space x to the
/// viewport's sig figs before evaluation.
pub fn sample_equation(
    equation: &Equation,
    idents: &mut Idents,
    viewport: &Viewport,
    width: Number,
    precision: NonZeroU16,
) -> Curve {
    let places = viewport.sig_figs();
    sample(
        |x| -> Result<Number, EvalErr> {
            equation.eval_at(idents, viewport::round_places(x, places))
        },
        viewport,
        width,
        precision,
    )
}

pub fn gap_count(curve: &[Sample]) -> usize {
    curve.iter().filter(|s| s.y.is_none()).count()
}
