//! Restricting page content to a region.

use crate::model::{Glyph, Path, RasterImage, Rect};

use super::GlyphSelection;

/// Glyphs belonging to `bound` under the given selection rule.
pub fn glyphs_inside<'a>(
    bound: &Rect,
    glyphs: &'a [Glyph],
    selection: GlyphSelection,
) -> Vec<&'a Glyph> {
    glyphs
        .iter()
        .filter(|g| match selection {
            GlyphSelection::Contained => bound.contains(&g.rect),
            GlyphSelection::Intersecting => bound.intersects(&g.rect),
        })
        .collect()
}

/// Paths whose bounding rectangle lies fully inside `bound`.
///
/// Degenerate paths (no bounding rectangle) are dropped.
pub fn paths_inside<'a>(bound: &Rect, paths: &'a [Path]) -> Vec<&'a Path> {
    paths
        .iter()
        .filter(|p| p.bounding_rect().is_some_and(|r| bound.contains(&r)))
        .collect()
}

/// Images whose bounds lie fully inside `bound`.
pub fn images_inside<'a>(bound: &Rect, images: &'a [RasterImage]) -> Vec<&'a RasterImage> {
    images
        .iter()
        .filter(|i| bound.contains(&i.bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PathCommand, Point};

    #[test]
    fn test_glyph_equal_to_bound_is_inside() {
        let bound = Rect::new(0.0, 0.0, 10.0, 10.0);
        let glyphs = vec![Glyph::new("x", bound)];
        assert_eq!(
            glyphs_inside(&bound, &glyphs, GlyphSelection::Contained).len(),
            1
        );
    }

    #[test]
    fn test_straddling_glyph_only_intersects() {
        let bound = Rect::new(0.0, 0.0, 10.0, 10.0);
        let glyphs = vec![
            Glyph::new("a", Rect::new(1.0, 1.0, 4.0, 5.0)),
            Glyph::new("b", Rect::new(8.0, 1.0, 12.0, 5.0)),
            Glyph::new("c", Rect::new(20.0, 1.0, 24.0, 5.0)),
        ];
        let contained = glyphs_inside(&bound, &glyphs, GlyphSelection::Contained);
        let intersecting = glyphs_inside(&bound, &glyphs, GlyphSelection::Intersecting);
        assert_eq!(contained.len(), 1);
        assert_eq!(intersecting.len(), 2);
        assert_eq!(intersecting[1].value, "b");
    }

    #[test]
    fn test_degenerate_paths_dropped() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let paths = vec![
            Path::default(),
            Path::new(vec![PathCommand::line(
                Point::new(10.0, 10.0),
                Point::new(90.0, 10.0),
            )]),
            Path::new(vec![PathCommand::line(
                Point::new(10.0, 10.0),
                Point::new(190.0, 10.0),
            )]),
        ];
        assert_eq!(paths_inside(&bound, &paths).len(), 1);
    }

    #[test]
    fn test_images_inside() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let images = vec![
            RasterImage::new(Rect::new(10.0, 10.0, 50.0, 50.0)),
            RasterImage::new(Rect::new(60.0, 60.0, 120.0, 90.0)),
        ];
        assert_eq!(images_inside(&bound, &images).len(), 1);
    }
}
