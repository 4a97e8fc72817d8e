// SPDX: CC0-1.0

use crate::{
    config::{self, Config, ConfigErr},
    eval::{Equation, EvaluationError, Idents},
    grid, render,
    render::Surface,
    sample::{self, Curve},
    stdlib,
    viewport::Viewport,
    Number, Point, Size,
};
use log::{debug, info, warn};

/// Summary of one repaint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub samples: usize,
    pub gaps: usize,
    pub spacing: Number,
    pub grid_lines: usize,
}

/// Everything a session mutates: canvas, viewport, equation, drag.
#[derive(Debug)]
pub struct Plot {
    config: Config,
    canvas: Size,
    viewport: Viewport,
    idents: Idents,
    equation: Equation,
    curve: Curve,
    drag: Option<Point<Number>>,
}

impl Plot {
    pub fn new(config: Config) -> Result<Self, EvaluationError> {
        let idents = stdlib::standard_idents();
        let equation = Equation::compile(config.equation.as_str(), &idents)?;
        Ok(Self {
            canvas: config.canvas,
            viewport: Viewport::centered(config.canvas),
            config,
            idents,
            equation,
            curve: Curve::new(),
            drag: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    pub fn idents(&self) -> &Idents {
        &self.idents
    }

    /// Curve from the last repaint.
    pub fn curve(&self) -> &[sample::Sample] {
        &self.curve
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn spacing(&self) -> Number {
        grid::spacing_for(&self.viewport, self.canvas, self.config.max_grid_cells)
    }

    /// Takes the new canvas size and re-centres the origin; zoom is kept.
    /// A size outside the accepted range changes nothing.
    pub fn resize(&mut self, canvas: Size) -> Result<(), ConfigErr> {
        config::validate_canvas(canvas)?;
        self.canvas = canvas;
        self.viewport.pan = canvas.center();
        debug!("resized to {canvas}");
        Ok(())
    }

    pub fn pointer_down(&mut self, at: Point<Number>) {
        self.drag = Some(at);
    }

    /// Pans by the distance moved since the last pointer event. Returns
    /// whether anything changed; moves without a held button are ignored.
    pub fn pointer_move(&mut self, at: Point<Number>) -> bool {
        let Some(start) = self.drag else {
            return false;
        };
        self.viewport.pan(at.x - start.x, at.y - start.y);
        self.drag = Some(at);
        true
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn pan(&mut self, dx: Number, dy: Number) {
        self.viewport.pan(dx, dy);
    }

    /// Positive `delta` zooms in about `pivot`, negative zooms out, zero does
    /// nothing. Returns whether anything changed.
    pub fn wheel(&mut self, delta: Number, pivot: Point<Number>) -> bool {
        let factor = if delta > 0.0 {
            self.config.zoom_factor()
        } else if delta < 0.0 {
            1.0 / self.config.zoom_factor()
        } else {
            return false;
        };
        self.viewport
            .zoom_by(factor, pivot, self.canvas, self.config.zoom_anchor);
        true
    }

    /// Replaces the equation if `src` parses and evaluates at x = 0.
    ///
    /// Only parse errors and unbound identifiers reject. A non-finite value at
    /// 0 is accepted on purpose (`1/x` has a pole there, not a bad formula).
    /// On error nothing changes.
    pub fn submit(&mut self, src: &str) -> Result<(), EvaluationError> {
        let checked = Equation::compile(src, &self.idents)
            .map_err(EvaluationError::from)
            .and_then(|equation| match equation.eval_at(&mut self.idents, 0.0) {
                Ok(_) => Ok(equation),
                Err(err) => {
                    let err = EvaluationError::from(err);
                    if err.is_domain_error() {
                        debug!("'{src}' is undefined at x = 0: {err}");
                        Ok(equation)
                    } else {
                        Err(err)
                    }
                }
            });

        match checked {
            Ok(equation) => {
                info!("equation set to '{equation}'");
                self.equation = equation;
                Ok(())
            }
            Err(err) => {
                warn!("rejected equation '{src}': {err}");
                Err(err)
            }
        }
    }

    /// Redraws everything: axes, then grid, then curve on top.
    pub fn repaint<S: Surface>(&mut self, surface: &mut S) -> Result<Frame, S::Err> {
        surface.clear(self.canvas)?;

        self.curve = sample::sample_equation(
            &self.equation,
            &mut self.idents,
            &self.viewport,
            self.canvas.width,
            self.config.precision,
        );

        render::draw_axes(surface, &self.viewport, self.canvas)?;
        let spacing = self.spacing();
        let grid_lines = render::draw_grid(
            surface,
            spacing,
            &self.viewport,
            self.canvas,
            self.config.label_cap,
        )?;
        render::draw_curve(surface, &self.curve)?;

        let frame = Frame {
            samples: self.curve.len(),
            gaps: sample::gap_count(&self.curve),
            spacing,
            grid_lines,
        };
        debug!("repainted {frame:?}");
        Ok(frame)
    }
}
