// SPDX: CC0-1.0

pub mod config;
pub mod eval;
pub mod grid;
pub mod lex;
pub mod parse;
pub mod plot;
pub mod render;
pub mod sample;
pub mod shell;
pub mod stdlib;
pub mod svg;
pub mod viewport;

use core::fmt;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point<Number> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Canvas dimensions in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: Number,
    pub height: Number,
}

impl Size {
    #[inline]
    pub const fn new(width: Number, height: Number) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point<Number> {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// The longer of the two canvas dimensions.
    pub fn dominant(&self) -> Number {
        self.width.max(self.height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
