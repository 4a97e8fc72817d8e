// SPDX: CC0-1.0

use crate::{
    render::{Stroke, Surface, TextAlign, TextStyle},
    Number, Point, Size,
};
use core::fmt::{self, Write};

/// Renders draw calls into an SVG document held in memory.
#[derive(Clone, Debug)]
pub struct SvgSurface {
    size: Size,
    body: String,
    path: String,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            body: String::new(),
            path: String::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Complete document for everything drawn since the last clear.
    pub fn document(&self) -> String {
        let Size { width, height } = self.size;
        let mut doc = String::with_capacity(self.body.len() + 256);
        // writing to a String cannot fail
        let _ = writeln!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(doc, r#"<rect width="100%" height="100%" fill="white"/>"#);
        doc.push_str(&self.body);
        doc.push_str("</svg>\n");
        doc
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for chr in text.chars() {
        match chr {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(chr),
        }
    }
    out
}

impl Surface for SvgSurface {
    type Err = fmt::Error;

    fn clear(&mut self, size: Size) -> Result<(), Self::Err> {
        self.size = size;
        self.body.clear();
        self.path.clear();
        Ok(())
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, to: Point<Number>) {
        let _ = write!(self.path, "M{} {} ", to.x, to.y);
    }

    fn line_to(&mut self, to: Point<Number>) {
        let _ = write!(self.path, "L{} {} ", to.x, to.y);
    }

    fn stroke(&mut self, style: Stroke) -> Result<(), Self::Err> {
        if self.path.is_empty() {
            return Ok(());
        }
        writeln!(
            self.body,
            r#"<path d="{d}" fill="none" stroke="{color}" stroke-width="{width}"/>"#,
            d = self.path.trim_end(),
            color = style.color,
            width = style.width,
        )?;
        self.path.clear();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, at: Point<Number>, style: TextStyle) -> Result<(), Self::Err> {
        let anchor = match style.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        writeln!(
            self.body,
            r#"<text x="{x}" y="{y}" fill="{color}" font-family="{family}" font-size="{size}px" font-weight="{weight}" text-anchor="{anchor}">{text}</text>"#,
            x = at.x,
            y = at.y,
            color = style.color,
            family = style.font.family,
            size = style.font.size_px,
            weight = if style.font.bold { "bold" } else { "normal" },
            text = escape(text),
        )
    }
}
