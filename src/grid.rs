// SPDX: CC0-1.0

//! Adaptive grid: spacing selection from a breakpoint table, and the walks
//! that place grid lines outward from the origin.

use crate::{viewport::Viewport, Number, Size};

/// Candidate major spacings in math units, ascending.
pub const BREAKPOINTS: [Number; 19] = [
    0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0,
    10000.0, 25000.0, 50000.0, 100000.0,
];

/// Used when even the smallest breakpoint is too coarse.
pub const FALLBACK_SPACING: Number = 0.025;

/// Minor lines per major line; every `MINOR_PER_MAJOR`th line is major.
pub const MINOR_PER_MAJOR: usize = 5;

/// Walk indices stay below 2^53 so `index * step` is exact in the index.
const MAX_INDEX: Number = 9_007_199_254_740_992.0;

/// Largest breakpoint strictly below `zoomed_size / (max_grid_cells + 1)`,
/// where `zoomed_size` is the longer canvas side in math units.
pub fn plan_spacing(zoomed_size: Number, max_grid_cells: u16) -> Number {
    let bound = zoomed_size / (Number::from(max_grid_cells) + 1.0);
    BREAKPOINTS
        .iter()
        .copied()
        .take_while(|&b| b < bound)
        .last()
        .unwrap_or(FALLBACK_SPACING)
}

pub fn spacing_for(viewport: &Viewport, canvas: Size, max_grid_cells: u16) -> Number {
    plan_spacing(canvas.dominant() / viewport.zoom, max_grid_cells)
}

/// Screen axis a walk moves along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// walk moves in screen x and places vertical lines
    X,
    /// walk moves in screen y and places horizontal lines
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub const fn axis(&self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// +1 if screen position grows along the walk.
    pub const fn step_sign(&self) -> Number {
        match self {
            Self::Down | Self::Right => 1.0,
            Self::Up | Self::Left => -1.0,
        }
    }

    /// +1 if math-space labels grow along the walk.
    pub const fn label_sign(&self) -> Number {
        match self {
            Self::Up | Self::Right => 1.0,
            Self::Down | Self::Left => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Major,
    Minor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    pub direction: Direction,
    pub index: usize,
    /// screen coordinate on the walk's axis
    pub pos: Number,
    pub kind: LineKind,
    /// math value shown next to the line, if any
    pub label: Option<Number>,
}

/// Lines from the origin outward in one direction, ending once the position
/// leaves the canvas.
#[derive(Clone, Debug)]
pub struct GridWalk {
    direction: Direction,
    spacing: Number,
    origin: Number,
    step: Number,
    extent: Number,
    index: usize,
    /// first index past the last line that can fit on the canvas
    end: usize,
    label_cap: usize,
}

impl GridWalk {
    pub fn new(
        direction: Direction,
        spacing: Number,
        viewport: &Viewport,
        canvas: Size,
        label_cap: usize,
    ) -> Self {
        let (origin, extent) = match direction.axis() {
            Axis::X => (viewport.pan.x, canvas.width),
            Axis::Y => (viewport.pan.y, canvas.height),
        };
        let step = spacing / MINOR_PER_MAJOR as Number * viewport.zoom;

        // skip the lines that lie off canvas between the origin and the near
        // edge; index parity and labels are unaffected
        let skipped = if direction.step_sign() > 0.0 && origin < 0.0 {
            (-origin / step).ceil()
        } else if direction.step_sign() < 0.0 && origin > extent {
            ((origin - extent) / step).ceil()
        } else {
            0.0
        };
        // no more lines than fit across the canvas, whatever the pan
        let fit = (extent / step).floor() + 2.0;

        let (index, end) = if step.is_finite()
            && step > 0.0
            && origin.is_finite()
            && (skipped + fit) < MAX_INDEX
        {
            (skipped as usize, (skipped + fit) as usize)
        } else {
            (0, 0)
        };

        Self {
            direction,
            spacing,
            origin,
            step,
            extent,
            index,
            end,
            label_cap,
        }
    }

    pub fn step(&self) -> Number {
        self.step
    }

    fn in_bounds(&self, pos: Number) -> bool {
        match self.direction {
            Direction::Down | Direction::Right => pos < self.extent,
            Direction::Up | Direction::Left => pos > 0.0,
        }
    }
}

impl Iterator for GridWalk {
    type Item = GridLine;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        if index >= self.end {
            return None;
        }
        let pos = self.origin + self.direction.step_sign() * index as Number * self.step;
        if !self.in_bounds(pos) {
            return None;
        }
        self.index = index + 1;

        let major = index % MINOR_PER_MAJOR == 0;
        let kind = if major { LineKind::Major } else { LineKind::Minor };
        // the axis already marks zero
        let label = (major && index != 0 && index < self.label_cap).then(|| {
            (index / MINOR_PER_MAJOR) as Number * self.spacing * self.direction.label_sign()
        });

        Some(GridLine {
            direction: self.direction,
            index,
            pos,
            kind,
            label,
        })
    }
}

/// Labeled positions along one direction, as `(screen position, text)`.
pub fn plan_axis_labels(
    direction: Direction,
    spacing: Number,
    viewport: &Viewport,
    canvas: Size,
    label_cap: usize,
) -> Vec<(Number, String)> {
    GridWalk::new(direction, spacing, viewport, canvas, label_cap)
        .filter_map(|line| line.label.map(|label| (line.pos, format_label(label))))
        .collect()
}

/// Breakpoints have at most three decimals; anything past that is float noise.
pub fn format_label(value: Number) -> String {
    let s = format!("{value:.3}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" {
        String::from("0")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use approx::assert_relative_eq;
    use quickcheck_macros::quickcheck;

    const CANVAS: Size = Size::new(800.0, 600.0);

    fn labels(direction: Direction, viewport: &Viewport) -> Vec<(Number, String)> {
        let spacing = spacing_for(viewport, CANVAS, 3);
        plan_axis_labels(direction, spacing, viewport, CANVAS, 1000)
    }

    #[test]
    fn spacing_at_default_zoom() {
        // 800 / 4 = 200 math units per cell bound
        assert_eq!(plan_spacing(800.0, 3), 100.0);
        assert_eq!(plan_spacing(1000.0, 3), 100.0);
        assert_eq!(plan_spacing(1001.0, 3), 250.0);
    }

    #[test]
    fn spacing_falls_back_when_zoomed_far_in() {
        assert_eq!(plan_spacing(0.2, 3), FALLBACK_SPACING);
        assert_eq!(plan_spacing(0.0, 3), FALLBACK_SPACING);
    }

    #[test]
    fn spacing_saturates_at_largest_breakpoint() {
        assert_eq!(plan_spacing(1e12, 3), 100000.0);
    }

    #[test]
    fn spacing_coarsens_as_zoom_decreases() {
        let mut last = 0.0;
        for size in [0.1, 1.0, 10.0, 100.0, 1e3, 1e4, 1e5, 1e6] {
            let spacing = plan_spacing(size, 3);
            assert!(spacing >= last);
            last = spacing;
        }
    }

    #[quickcheck]
    fn spacing_is_largest_qualifying_breakpoint(zoom_milli: u32, w: u16, h: u16, cells: u8) -> bool {
        let zoom = (Number::from(zoom_milli % 10_000_000) + 1.0) / 1000.0;
        let size = Number::from(w.max(1)).max(Number::from(h.max(1))) / zoom;
        let cells = u16::from(cells % 10);
        let spacing = plan_spacing(size, cells);
        let bound = size / (Number::from(cells) + 1.0);

        let next = BREAKPOINTS.iter().copied().find(|&b| b > spacing);
        let qualifies = spacing == FALLBACK_SPACING || spacing < bound;
        let largest = next.map_or(true, |next| next >= bound);
        qualifies && largest
    }

    #[test]
    fn direction_descriptors() {
        assert_eq!(Direction::Up.axis(), Axis::Y);
        assert_eq!(Direction::Right.axis(), Axis::X);
        assert_eq!(Direction::Up.step_sign(), -1.0);
        assert_eq!(Direction::Up.label_sign(), 1.0);
        assert_eq!(Direction::Down.step_sign(), 1.0);
        assert_eq!(Direction::Down.label_sign(), -1.0);
    }

    #[test]
    fn right_walk_marks_every_fifth_line_major() {
        let vp = Viewport::centered(CANVAS);
        let lines: Vec<_> = GridWalk::new(Direction::Right, 100.0, &vp, CANVAS, 1000).collect();
        // 20 px per minor step from 400 up to (not including) 800
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[0].pos, 400.0);
        assert_eq!(lines[0].label, None);
        assert_eq!(lines[5].kind, LineKind::Major);
        assert_eq!(lines[5].label, Some(100.0));
        assert_eq!(lines[5].pos, 500.0);
        assert_eq!(lines[6].kind, LineKind::Minor);
        assert_eq!(lines[6].label, None);
    }

    #[test]
    fn labels_carry_direction_sign() {
        let vp = Viewport::centered(CANVAS);
        let texts = |d| labels(d, &vp).into_iter().map(|(_, t)| t).collect::<Vec<_>>();
        assert_eq!(texts(Direction::Right), ["100", "200", "300"]);
        assert_eq!(texts(Direction::Left), ["-100", "-200", "-300"]);
        assert_eq!(texts(Direction::Up), ["100", "200"]);
        assert_eq!(texts(Direction::Down), ["-100", "-200"]);
    }

    #[test]
    fn up_labels_sit_above_origin() {
        let vp = Viewport::centered(CANVAS);
        let up = labels(Direction::Up, &vp);
        assert_eq!(up[0].0, 200.0);
        assert_eq!(up[1].0, 100.0);
    }

    #[test]
    fn labels_stay_round_after_many_steps() {
        let vp = Viewport {
            zoom: 1000.0,
            pan: Point::new(0.0, 300.0),
        };
        let spacing = spacing_for(&vp, CANVAS, 3);
        assert_eq!(spacing, 0.1);
        let right = plan_axis_labels(Direction::Right, spacing, &vp, CANVAS, 1000);
        assert_eq!(right[2].1, "0.3");
        assert_eq!(right[6].1, "0.7");
    }

    #[test]
    fn labels_cap_at_index() {
        let vp = Viewport {
            zoom: 1.0,
            pan: Point::new(0.0, 300.0),
        };
        // 1 px per minor step puts index 1000 on screen
        let lines: Vec<_> = GridWalk::new(Direction::Right, 5.0, &vp, Size::new(2000.0, 600.0), 1000)
            .collect();
        assert_eq!(lines.len(), 2000);
        assert!(lines[995].label.is_some());
        assert!(lines[1000].label.is_none());
        assert!(lines[1005].label.is_none());
        assert_eq!(lines[1000].kind, LineKind::Major);
    }

    #[test]
    fn origin_off_canvas_walks_nothing_on_that_side() {
        let vp = Viewport {
            zoom: 1.0,
            pan: Point::new(-50.0, 900.0),
        };
        assert_eq!(GridWalk::new(Direction::Left, 100.0, &vp, CANVAS, 1000).count(), 0);
        assert_eq!(GridWalk::new(Direction::Down, 100.0, &vp, CANVAS, 1000).count(), 0);
    }

    #[test]
    fn far_origin_fast_forwards_without_changing_lines() {
        let vp = Viewport {
            zoom: 1.0,
            pan: Point::new(-1_000_050.0, 300.0),
        };
        let lines: Vec<_> = GridWalk::new(Direction::Right, 100.0, &vp, CANVAS, 1000).collect();
        assert_eq!(lines.len(), 40);
        assert_relative_eq!(lines[0].pos, 10.0);
        assert_eq!(lines[0].index, 50_003);
        // -1_000_050 + 50_005 * 20 = 50
        let major = lines.iter().find(|l| l.kind == LineKind::Major).unwrap();
        assert_eq!(major.index % MINOR_PER_MAJOR, 0);
        assert_relative_eq!(major.pos, 50.0);
        assert!(lines.iter().all(|l| l.label.is_none()));
    }

    fn walks_fit_the_canvas(vp: &Viewport) -> bool {
        let spacing = spacing_for(vp, CANVAS, 3);
        Direction::ALL.iter().all(|&d| {
            let walk = GridWalk::new(d, spacing, vp, CANVAS, 1000);
            let extent = match d.axis() {
                Axis::X => CANVAS.width,
                Axis::Y => CANVAS.height,
            };
            let limit = (extent / walk.step()).floor() as usize + 2;
            walk.take(limit + 1).count() <= limit
        })
    }

    #[quickcheck]
    fn walks_terminate_within_bound(zoom_milli: u32, px: i16, py: i16, pan_exp: u8) -> bool {
        let zoom = (Number::from(zoom_milli % 10_000_000) + 1.0) / 1000.0;
        // pans from a few pixels out to ~1e24
        let scale = Number::powi(10.0, i32::from(pan_exp % 21));
        let vp = Viewport {
            zoom,
            pan: Point::new(Number::from(px) * scale, Number::from(py) * scale),
        };
        walks_fit_the_canvas(&vp)
    }

    #[test]
    fn huge_pans_end_every_walk() {
        for pan in [1e21, -1e21, 1e300, -1e300] {
            let vp = Viewport {
                zoom: 1.0,
                pan: Point::new(pan, pan),
            };
            assert!(walks_fit_the_canvas(&vp), "pan {pan}");
        }
        let vp = Viewport {
            zoom: 1.0,
            pan: Point::new(1e21, 1e21),
        };
        let count = GridWalk::new(Direction::Left, 100.0, &vp, CANVAS, 1000)
            .take(100)
            .count();
        assert!(count <= 42, "{count} lines");
    }

    #[test]
    fn formats_labels() {
        assert_eq!(format_label(0.1 + 0.2), "0.3");
        assert_eq!(format_label(-0.025), "-0.025");
        assert_eq!(format_label(250.0), "250");
        assert_eq!(format_label(-100000.0), "-100000");
        assert_eq!(format_label(-0.0), "0");
    }
}
