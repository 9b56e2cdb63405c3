//! Page-level content as exposed by the document parser.

use super::{Point, Rect, TextBlock};
use serde::{Deserialize, Serialize};

/// A single rendered character with its glyph rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Unicode value of the glyph (ligatures may carry several characters)
    pub value: String,

    /// Glyph bounding rectangle
    pub rect: Rect,
}

impl Glyph {
    /// Create a new glyph.
    pub fn new(value: impl Into<String>, rect: Rect) -> Self {
        Self {
            value: value.into(),
            rect,
        }
    }

    /// Height of the glyph rectangle.
    pub fn height(&self) -> f64 {
        self.rect.height()
    }
}

/// A drawing primitive of a vector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathCommand {
    /// Move the current point without drawing
    Move {
        /// New current point
        to: Point,
    },

    /// Straight segment
    Line {
        /// Segment start
        from: Point,
        /// Segment end
        to: Point,
    },

    /// Cubic Bezier curve
    BezierCurve {
        /// Curve start
        start: Point,
        /// First control point
        first_control: Point,
        /// Second control point
        second_control: Point,
        /// Curve end
        end: Point,
    },

    /// Close the current subpath
    Close,
}

impl PathCommand {
    /// Create a line command.
    pub fn line(from: Point, to: Point) -> Self {
        PathCommand::Line { from, to }
    }

    /// Create a cubic Bezier command.
    pub fn bezier(start: Point, first_control: Point, second_control: Point, end: Point) -> Self {
        PathCommand::BezierCurve {
            start,
            first_control,
            second_control,
            end,
        }
    }

    /// Points on the drawn geometry that bound this command.
    ///
    /// For curves this is the end points plus the interior extrema.
    fn extent_points(&self) -> Vec<Point> {
        match *self {
            PathCommand::Move { .. } | PathCommand::Close => Vec::new(),
            PathCommand::Line { from, to } => vec![from, to],
            PathCommand::BezierCurve {
                start,
                first_control,
                second_control,
                end,
            } => {
                let mut points = vec![start, end];
                let xs = cubic_extrema(start.x, first_control.x, second_control.x, end.x);
                let ys = cubic_extrema(start.y, first_control.y, second_control.y, end.y);
                for t in xs.into_iter().chain(ys) {
                    points.push(Point::new(
                        cubic_at(start.x, first_control.x, second_control.x, end.x, t),
                        cubic_at(start.y, first_control.y, second_control.y, end.y, t),
                    ));
                }
                points
            }
        }
    }
}

fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Parameters in (0, 1) where the derivative of a cubic vanishes.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    let d0 = p1 - p0;
    let d1 = p2 - p1;
    let d2 = p3 - p2;
    let a = d0 - 2.0 * d1 + d2;
    let b = 2.0 * (d1 - d0);
    let c = d0;

    let mut roots = Vec::with_capacity(2);
    if a.abs() < 1e-12 {
        if b.abs() > 1e-12 {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-b + sq) / (2.0 * a));
            roots.push((-b - sq) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// A vector path: an ordered sequence of drawing commands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    /// Drawing commands in paint order
    pub commands: Vec<PathCommand>,
}

impl Path {
    /// Create a path from commands.
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// Bounding rectangle of the drawn geometry.
    ///
    /// Returns `None` for degenerate paths: no drawing commands, or all
    /// drawn points coinciding.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let rect = Rect::from_points(self.commands.iter().flat_map(|c| c.extent_points()))?;
        if rect.width() == 0.0 && rect.height() == 0.0 {
            return None;
        }
        Some(rect)
    }
}

/// A raster image placed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    /// Placement bounds on the page
    pub bounds: Rect,
}

impl RasterImage {
    /// Create an image with the given bounds.
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// Area covered by the image.
    pub fn area(&self) -> f64 {
        self.bounds.area()
    }
}

/// A single parsed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Page rotation in degrees (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: i32,

    /// Glyphs in content-stream order
    #[serde(default)]
    pub letters: Vec<Glyph>,

    /// Vector paths
    #[serde(default)]
    pub paths: Vec<Path>,

    /// Raster images
    #[serde(default)]
    pub images: Vec<RasterImage>,

    /// Candidate blocks produced by an external page segmenter
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            rotation: 0,
            letters: Vec::new(),
            paths: Vec::new(),
            images: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Set the page rotation.
    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Whether the page is rotated.
    pub fn is_rotated(&self) -> bool {
        self.rotation.rem_euclid(360) != 0
    }

    /// Average glyph height over the whole page, 0 when there are no glyphs.
    pub fn average_glyph_height(&self) -> f64 {
        if self.letters.is_empty() {
            return 0.0;
        }
        self.letters.iter().map(Glyph::height).sum::<f64>() / self.letters.len() as f64
    }

    /// Page bounds.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_path_bounds() {
        let path = Path::new(vec![PathCommand::line(
            Point::new(10.0, 5.0),
            Point::new(30.0, 5.0),
        )]);
        assert_eq!(path.bounding_rect(), Some(Rect::new(10.0, 5.0, 30.0, 5.0)));
    }

    #[test]
    fn test_degenerate_paths_have_no_bounds() {
        assert!(Path::default().bounding_rect().is_none());

        let moves_only = Path::new(vec![
            PathCommand::Move {
                to: Point::new(1.0, 1.0),
            },
            PathCommand::Close,
        ]);
        assert!(moves_only.bounding_rect().is_none());

        let dot = Path::new(vec![PathCommand::line(
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
        )]);
        assert!(dot.bounding_rect().is_none());
    }

    #[test]
    fn test_bezier_bounds_include_extrema() {
        // Symmetric arch: the apex is at t = 0.5, y = 0.75 * 10.
        let path = Path::new(vec![PathCommand::bezier(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        )]);
        let rect = path.bounding_rect().unwrap();
        assert!((rect.top - 7.5).abs() < 1e-9);
        assert_eq!(rect.left, 0.0);
        assert_eq!(rect.right, 10.0);
        assert_eq!(rect.bottom, 0.0);
    }

    #[test]
    fn test_page_average_glyph_height() {
        let mut page = Page::new(1, 100.0, 100.0);
        assert_eq!(page.average_glyph_height(), 0.0);
        page.letters.push(Glyph::new("a", Rect::new(0.0, 0.0, 5.0, 10.0)));
        page.letters.push(Glyph::new("b", Rect::new(5.0, 0.0, 10.0, 20.0)));
        assert_eq!(page.average_glyph_height(), 15.0);
    }

    #[test]
    fn test_rotation() {
        assert!(!Page::new(1, 1.0, 1.0).is_rotated());
        assert!(Page::new(1, 1.0, 1.0).with_rotation(90).is_rotated());
        assert!(!Page::new(1, 1.0, 1.0).with_rotation(360).is_rotated());
    }

    #[test]
    fn test_path_command_json_tag() {
        let json = r#"{"type":"line","from":{"x":0.0,"y":0.0},"to":{"x":1.0,"y":0.0}}"#;
        let cmd: PathCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, PathCommand::Line { .. }));
    }
}
