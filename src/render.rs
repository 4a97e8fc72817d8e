// SPDX: CC0-1.0

use crate::{
    grid::{self, Axis, Direction, GridWalk, LineKind},
    sample::Sample,
    viewport::Viewport,
    Number, Point, Size,
};
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgba(0, 0, 0, 1.0);
    pub const LIGHT_BLUE: Self = Self::rgba(173, 216, 230, 1.0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: Number,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size_px: u16,
    pub bold: bool,
    pub family: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub font: Font,
    pub align: TextAlign,
}

pub const AXIS: Stroke = Stroke {
    color: Color::BLACK,
    width: 2.0,
};
pub const GRID_MAJOR: Stroke = Stroke {
    color: Color::rgba(0, 0, 0, 0.8),
    width: 1.0,
};
pub const GRID_MINOR: Stroke = Stroke {
    color: Color::rgba(0, 0, 0, 0.2),
    width: 1.0,
};
pub const CURVE: Stroke = Stroke {
    color: Color::rgba(100, 0, 139, 0.7),
    width: 1.0,
};
pub const LABEL_FONT: Font = Font {
    size_px: 11,
    bold: true,
    family: "monospace",
};

/// Opaque block drawn behind label text.
pub const LABEL_BACKING: char = '█';

/// Immediate-mode drawing target.
pub trait Surface {
    type Err;

    fn clear(&mut self, size: Size) -> Result<(), Self::Err>;
    fn begin_path(&mut self);
    fn move_to(&mut self, to: Point<Number>);
    fn line_to(&mut self, to: Point<Number>);
    /// Strokes and consumes the current path.
    fn stroke(&mut self, style: Stroke) -> Result<(), Self::Err>;
    fn fill_text(&mut self, text: &str, at: Point<Number>, style: TextStyle) -> Result<(), Self::Err>;
}

fn segment<S: Surface>(
    surface: &mut S,
    from: Point<Number>,
    to: Point<Number>,
    style: Stroke,
) -> Result<(), S::Err> {
    surface.begin_path();
    surface.move_to(from);
    surface.line_to(to);
    surface.stroke(style)
}

/// The two lines through the origin, each half drawn only when the origin is
/// on or inside the canvas bound on that side.
pub fn draw_axes<S: Surface>(surface: &mut S, viewport: &Viewport, canvas: Size) -> Result<(), S::Err> {
    let Point { x, y } = viewport.pan;
    let Size { width, height } = canvas;
    let origin = viewport.pan;

    if x <= width {
        segment(surface, origin, Point::new(width, y), AXIS)?;
    }
    if x >= 0.0 {
        segment(surface, origin, Point::new(0.0, y), AXIS)?;
    }
    if y <= height {
        segment(surface, origin, Point::new(x, height), AXIS)?;
    }
    if y >= 0.0 {
        segment(surface, origin, Point::new(x, 0.0), AXIS)?;
    }
    Ok(())
}

/// Grid lines in all four directions, with labels on the major lines.
/// Returns the number of lines drawn.
pub fn draw_grid<S: Surface>(
    surface: &mut S,
    spacing: Number,
    viewport: &Viewport,
    canvas: Size,
    label_cap: usize,
) -> Result<usize, S::Err> {
    let origin = viewport.pan;
    let mut count = 0;

    for direction in Direction::ALL {
        for line in GridWalk::new(direction, spacing, viewport, canvas, label_cap) {
            let style = match line.kind {
                LineKind::Major => GRID_MAJOR,
                LineKind::Minor => GRID_MINOR,
            };
            let (from, to) = match direction.axis() {
                Axis::Y => (Point::new(0.0, line.pos), Point::new(canvas.width, line.pos)),
                Axis::X => (Point::new(line.pos, 0.0), Point::new(line.pos, canvas.height)),
            };
            segment(surface, from, to, style)?;
            count += 1;

            if let Some(label) = line.label {
                draw_label(surface, direction, line.pos, origin, &grid::format_label(label))?;
            }
        }
    }
    Ok(count)
}

fn draw_label<S: Surface>(
    surface: &mut S,
    direction: Direction,
    pos: Number,
    origin: Point<Number>,
    text: &str,
) -> Result<(), S::Err> {
    let style = |color: Color, align: TextAlign| TextStyle {
        color,
        font: LABEL_FONT,
        align,
    };
    match direction.axis() {
        // label sits left of the vertical axis
        Axis::Y => {
            let backing: String = core::iter::repeat(LABEL_BACKING)
                .take(text.chars().count() + 1)
                .collect();
            surface.fill_text(
                &backing,
                Point::new(origin.x - 2.0, pos + 5.0),
                style(Color::LIGHT_BLUE, TextAlign::Right),
            )?;
            surface.fill_text(
                text,
                Point::new(origin.x - 6.0, pos + 3.0),
                style(Color::BLACK, TextAlign::Right),
            )
        }
        // label sits just below the horizontal axis
        Axis::X => {
            let at = Point::new(pos, origin.y + 11.0);
            surface.fill_text(
                &LABEL_BACKING.to_string(),
                at,
                style(Color::LIGHT_BLUE, TextAlign::Center),
            )?;
            surface.fill_text(text, at, style(Color::BLACK, TextAlign::Center))
        }
    }
}

/// Polyline through the curve's points, restarting after each gap.
pub fn draw_curve<S: Surface>(surface: &mut S, curve: &[Sample]) -> Result<(), S::Err> {
    if curve.iter().all(|s| s.y.is_none()) {
        return Ok(());
    }

    surface.begin_path();
    let mut pen_down = false;
    for sample in curve {
        match sample.point() {
            Some(p) if pen_down => surface.line_to(p),
            Some(p) => {
                surface.move_to(p);
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    surface.stroke(CURVE)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Call {
        Clear(Size),
        Begin,
        MoveTo(Point<Number>),
        LineTo(Point<Number>),
        Stroke(Stroke),
        Text(String, Point<Number>, TextStyle),
    }

    /// Records every call for inspection.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) calls: Vec<Call>,
    }

    impl Recorder {
        pub(crate) fn strokes(&self, style: Stroke) -> usize {
            self.calls.iter().filter(|c| **c == Call::Stroke(style)).count()
        }

        pub(crate) fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Text(t, _, style) if style.color == Color::BLACK => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for Recorder {
        type Err = Infallible;

        fn clear(&mut self, size: Size) -> Result<(), Self::Err> {
            self.calls.push(Call::Clear(size));
            Ok(())
        }

        fn begin_path(&mut self) {
            self.calls.push(Call::Begin);
        }

        fn move_to(&mut self, to: Point<Number>) {
            self.calls.push(Call::MoveTo(to));
        }

        fn line_to(&mut self, to: Point<Number>) {
            self.calls.push(Call::LineTo(to));
        }

        fn stroke(&mut self, style: Stroke) -> Result<(), Self::Err> {
            self.calls.push(Call::Stroke(style));
            Ok(())
        }

        fn fill_text(&mut self, text: &str, at: Point<Number>, style: TextStyle) -> Result<(), Self::Err> {
            self.calls.push(Call::Text(text.to_string(), at, style));
            Ok(())
        }
    }

    const CANVAS: Size = Size::new(800.0, 600.0);

    #[test]
    fn axes_through_centered_origin() {
        let mut rec = Recorder::default();
        draw_axes(&mut rec, &Viewport::centered(CANVAS), CANVAS).unwrap();
        assert_eq!(rec.strokes(AXIS), 4);
        assert!(rec.calls.contains(&Call::LineTo(Point::new(800.0, 300.0))));
        assert!(rec.calls.contains(&Call::LineTo(Point::new(400.0, 0.0))));
    }

    #[test]
    fn axes_skip_halves_beyond_canvas() {
        let mut rec = Recorder::default();
        let vp = Viewport {
            zoom: 1.0,
            pan: Point::new(-10.0, 700.0),
        };
        draw_axes(&mut rec, &vp, CANVAS).unwrap();
        // only x-right and y-toward-top remain
        assert_eq!(rec.strokes(AXIS), 2);
        assert!(rec.calls.contains(&Call::LineTo(Point::new(800.0, 700.0))));
        assert!(rec.calls.contains(&Call::LineTo(Point::new(-10.0, 0.0))));
    }

    #[test]
    fn grid_draws_every_walk_with_labels() {
        let mut rec = Recorder::default();
        let vp = Viewport::centered(CANVAS);
        let count = draw_grid(&mut rec, 100.0, &vp, CANVAS, 1000).unwrap();
        // 15 up, 15 down, 20 left, 20 right
        assert_eq!(count, 70);
        assert_eq!(rec.strokes(GRID_MAJOR) + rec.strokes(GRID_MINOR), 70);
        let mut texts = rec.texts();
        texts.sort_unstable();
        assert_eq!(
            texts,
            ["-100", "-100", "-200", "-200", "-300", "100", "100", "200", "200", "300"]
        );
    }

    #[test]
    fn vertical_axis_labels_get_wide_backing() {
        let mut rec = Recorder::default();
        let vp = Viewport::centered(CANVAS);
        draw_grid(&mut rec, 100.0, &vp, CANVAS, 1000).unwrap();
        let backing = rec.calls.iter().find_map(|c| match c {
            Call::Text(t, at, style) if style.color == Color::LIGHT_BLUE && style.align == TextAlign::Right => {
                Some((t.clone(), *at))
            }
            _ => None,
        });
        // "100" plus one
        assert_eq!(backing, Some(("████".to_string(), Point::new(398.0, 205.0))));
    }

    #[test]
    fn curve_restarts_after_gap() {
        let mut rec = Recorder::default();
        let curve = [
            Sample { x: 0.0, y: Some(1.0) },
            Sample { x: 1.0, y: Some(2.0) },
            Sample { x: 2.0, y: None },
            Sample { x: 3.0, y: Some(4.0) },
            Sample { x: 4.0, y: Some(5.0) },
        ];
        draw_curve(&mut rec, &curve).unwrap();
        assert_eq!(
            rec.calls,
            [
                Call::Begin,
                Call::MoveTo(Point::new(0.0, 1.0)),
                Call::LineTo(Point::new(1.0, 2.0)),
                Call::MoveTo(Point::new(3.0, 4.0)),
                Call::LineTo(Point::new(4.0, 5.0)),
                Call::Stroke(CURVE),
            ]
        );
    }

    #[test]
    fn empty_curve_draws_nothing() {
        let mut rec = Recorder::default();
        draw_curve(&mut rec, &[Sample { x: 0.0, y: None }]).unwrap();
        assert!(rec.calls.is_empty());
    }
}
