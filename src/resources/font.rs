//! Typeface fonts.
//!
//! Fonts are stored in the "typeface" JSON format: a map from characters to
//! glyphs, each with a horizontal advance (`ha`) and an outline string (`o`)
//! made of `m`, `l`, `q` and `b` commands in font units. [`Font::outlines`]
//! lays out a string and returns flattened contours ready for extrusion.

use std::collections::HashMap;

use anyhow::{Context as _, Result, anyhow, bail};
use cgmath::{EuclideanSpace, InnerSpace, Point2, Vector2, VectorSpace};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Font {
    #[serde(rename = "familyName", default)]
    pub family_name: String,
    pub glyphs: HashMap<String, Glyph>,
    pub resolution: f32,
    #[serde(rename = "boundingBox")]
    pub bounding_box: FontBounds,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Glyph {
    pub ha: f32,
    #[serde(default)]
    pub x_min: Option<f32>,
    #[serde(default)]
    pub x_max: Option<f32>,
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct FontBounds {
    #[serde(rename = "xMin", default)]
    pub x_min: f32,
    #[serde(rename = "xMax", default)]
    pub x_max: f32,
    #[serde(rename = "yMin")]
    pub y_min: f32,
    #[serde(rename = "yMax")]
    pub y_max: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    QuadTo {
        ctrl: Point2<f32>,
        to: Point2<f32>,
    },
    CubicTo {
        ctrl1: Point2<f32>,
        ctrl2: Point2<f32>,
        to: Point2<f32>,
    },
}

/// The placed outline of one character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    pub commands: Vec<PathCommand>,
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self> {
        let font: Font = serde_json::from_str(json).context("malformed typeface json")?;
        if font.resolution <= 0.0 {
            bail!("typeface resolution must be positive, got {}", font.resolution);
        }
        Ok(font)
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(ch.encode_utf8(&mut buf) as &str)
    }

    /// Lay out `text` at `size` world units per em.
    ///
    /// Characters without a glyph fall back to `?`. A newline returns to
    /// x = 0 and moves down by one line height.
    pub fn outlines(&self, text: &str, size: f32) -> Result<Vec<GlyphOutline>> {
        let scale = size / self.resolution;
        let line_height = (self.bounding_box.y_max - self.bounding_box.y_min
            + self.underline_thickness)
            * scale;

        let mut outlines = Vec::new();
        let mut offset = Vector2::new(0.0, 0.0);
        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let glyph = match self.glyph(ch) {
                Some(glyph) => glyph,
                None => {
                    log::warn!(
                        "character '{}' is missing from typeface {}, using '?'",
                        ch,
                        self.family_name
                    );
                    match self.glyph('?') {
                        Some(glyph) => glyph,
                        None => {
                            log::error!(
                                "typeface {} has no '?' glyph either, skipping '{}'",
                                self.family_name,
                                ch
                            );
                            continue;
                        }
                    }
                }
            };
            if let Some(o) = &glyph.o {
                let commands = parse_outline(o, scale, offset)
                    .with_context(|| format!("invalid outline for glyph '{ch}'"))?;
                outlines.push(GlyphOutline { commands });
            }
            offset.x += glyph.ha * scale;
        }
        Ok(outlines)
    }
}

struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    scale: f32,
    offset: Vector2<f32>,
}

impl Tokens<'_> {
    fn number(&mut self, cmd: &str) -> Result<f32> {
        let token = self
            .iter
            .next()
            .ok_or_else(|| anyhow!("'{cmd}' command is missing arguments"))?;
        token
            .parse::<f32>()
            .with_context(|| format!("'{token}' is not a number"))
    }

    fn point(&mut self, cmd: &str) -> Result<Point2<f32>> {
        let x = self.number(cmd)?;
        let y = self.number(cmd)?;
        Ok(Point2::new(
            x * self.scale + self.offset.x,
            y * self.scale + self.offset.y,
        ))
    }
}

fn parse_outline(o: &str, scale: f32, offset: Vector2<f32>) -> Result<Vec<PathCommand>> {
    let mut tokens = Tokens {
        iter: o.split_whitespace(),
        scale,
        offset,
    };
    let mut commands = Vec::new();
    while let Some(cmd) = tokens.iter.next() {
        let command = match cmd {
            "m" => PathCommand::MoveTo(tokens.point(cmd)?),
            "l" => PathCommand::LineTo(tokens.point(cmd)?),
            // end point comes before the control point(s)
            "q" => {
                let to = tokens.point(cmd)?;
                let ctrl = tokens.point(cmd)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = tokens.point(cmd)?;
                let ctrl1 = tokens.point(cmd)?;
                let ctrl2 = tokens.point(cmd)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => continue,
            other => bail!("unknown outline command '{other}'"),
        };
        commands.push(command);
    }
    Ok(commands)
}

impl GlyphOutline {
    /// Flatten into closed polylines, one per sub-path.
    ///
    /// Curves are split into `curve_segments` straight pieces. Repeated points
    /// and an explicit closing point are dropped; contours with fewer than
    /// three points are discarded.
    pub fn contours(&self, curve_segments: u32) -> Vec<Vec<Point2<f32>>> {
        let segments = curve_segments.max(1);
        let mut contours = Vec::new();
        let mut current: Vec<Point2<f32>> = Vec::new();
        let mut pen = Point2::new(0.0, 0.0);

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    contours.push(std::mem::take(&mut current));
                    current.push(p);
                    pen = p;
                }
                PathCommand::LineTo(p) => {
                    current.push(p);
                    pen = p;
                }
                PathCommand::QuadTo { ctrl, to } => {
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let a = pen.to_vec().lerp(ctrl.to_vec(), t);
                        let b = ctrl.to_vec().lerp(to.to_vec(), t);
                        current.push(Point2::from_vec(a.lerp(b, t)));
                    }
                    pen = to;
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let s = 1.0 - t;
                        let p = pen.to_vec() * (s * s * s)
                            + ctrl1.to_vec() * (3.0 * s * s * t)
                            + ctrl2.to_vec() * (3.0 * s * t * t)
                            + to.to_vec() * (t * t * t);
                        current.push(Point2::from_vec(p));
                    }
                    pen = to;
                }
            }
        }
        contours.push(current);

        contours
            .into_iter()
            .map(|mut contour| {
                contour.dedup_by(|a, b| (*a - *b).magnitude2() < 1e-12);
                if contour.len() > 1 && (contour[0] - contour[contour.len() - 1]).magnitude2() < 1e-12 {
                    contour.pop();
                }
                contour
            })
            .filter(|contour| contour.len() >= 3)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_FONT: &str = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 800 },
        "underlineThickness": 50,
        "glyphs": {
            "a": { "ha": 600, "x_min": 0, "x_max": 500, "o": "m 0 0 l 500 0 l 500 500 l 0 500 l 0 0" },
            "?": { "ha": 400, "o": "m 0 0 q 100 100 0 100 l 0 0" },
            " ": { "ha": 300 }
        }
    }"#;

    #[test]
    fn parses_typeface_json() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        assert_eq!(font.family_name, "Test");
        assert_eq!(font.glyphs.len(), 3);
        assert_eq!(font.bounding_box.y_max, 800.0);
    }

    fn assert_near(actual: Point2<f32>, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < 1e-5 && (actual.y - y).abs() < 1e-5,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    fn start_of(outline: &GlyphOutline) -> Point2<f32> {
        match outline.commands[0] {
            PathCommand::MoveTo(p) => p,
            other => panic!("outline starts with {other:?}"),
        }
    }

    #[test]
    fn advances_and_scales_glyphs() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        let outlines = font.outlines("a a", 1.0).unwrap();
        assert_eq!(outlines.len(), 2);
        // 0.6 for "a" plus 0.3 for the space
        assert_near(start_of(&outlines[1]), 0.9, 0.0);
        match outlines[0].commands[2] {
            PathCommand::LineTo(p) => assert_near(p, 0.5, 0.5),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn newline_moves_down_one_line() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        let outlines = font.outlines("a\na", 1.0).unwrap();
        assert_near(start_of(&outlines[1]), 0.0, -1.05);
    }

    #[test]
    fn missing_glyph_falls_back_to_question_mark() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        let outlines = font.outlines("Z", 1.0).unwrap();
        assert_eq!(outlines.len(), 1);
        assert!(matches!(
            outlines[0].commands[1],
            PathCommand::QuadTo { .. }
        ));
    }

    #[test]
    fn quadratic_lists_end_point_first() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        let outlines = font.outlines("?", 1.0).unwrap();
        match outlines[0].commands[1] {
            PathCommand::QuadTo { ctrl, to } => {
                assert_near(to, 0.1, 0.1);
                assert_near(ctrl, 0.0, 0.1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flattening_drops_closing_point_and_splits_curves() {
        let font = Font::from_json(SQUARE_FONT).unwrap();
        let square = &font.outlines("a", 1.0).unwrap()[0];
        assert_eq!(square.contours(12)[0].len(), 4);

        let curve = &font.outlines("?", 1.0).unwrap()[0];
        // start + 4 curve points, closing line returns to start
        assert_eq!(curve.contours(4)[0].len(), 5);
    }

    #[test]
    fn rejects_unknown_commands() {
        let json = SQUARE_FONT.replace("m 0 0 l 500 0", "m 0 0 x 500 0");
        let font = Font::from_json(&json).unwrap();
        assert!(font.outlines("a", 1.0).is_err());
    }
}
