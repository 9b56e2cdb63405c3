//! Shape composition of the vector paths in a region.

use crate::model::{Path, PathCommand};

use super::round5;

/// Shares of Bezier, horizontal, vertical and oblique drawing commands.
///
/// Counting is per command, not per path: a rectangle drawn as four line
/// segments contributes four units. Move and close commands are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathStats {
    /// Number of Bezier and line commands in the region
    pub paths_count: f32,
    /// Share of Bezier curve commands
    pub pct_bezier: f32,
    /// Share of horizontal line commands
    pub pct_horizontal: f32,
    /// Share of vertical line commands
    pub pct_vertical: f32,
    /// Share of oblique line commands
    pub pct_oblique: f32,
}

impl PathStats {
    /// Classify every command of `paths`.
    pub fn compute<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut total = 0usize;
        let mut bezier = 0usize;
        let mut horizontal = 0usize;
        let mut vertical = 0usize;
        let mut oblique = 0usize;

        for path in paths {
            for command in &path.commands {
                match command {
                    PathCommand::BezierCurve { .. } => {
                        bezier += 1;
                        total += 1;
                    }
                    PathCommand::Line { from, to } => {
                        total += 1;
                        if from.x == to.x {
                            vertical += 1;
                        } else if from.y == to.y {
                            horizontal += 1;
                        } else {
                            oblique += 1;
                        }
                    }
                    PathCommand::Move { .. } | PathCommand::Close => {}
                }
            }
        }

        if total == 0 {
            return Self::default();
        }

        let n = total as f64;
        Self {
            paths_count: total as f32,
            pct_bezier: round5(bezier as f64 / n),
            pct_horizontal: round5(horizontal as f64 / n),
            pct_vertical: round5(vertical as f64 / n),
            pct_oblique: round5(oblique as f64 / n),
        }
    }
}
