//! Raster image coverage of a region.

use crate::model::{RasterImage, Rect};

/// Image count and mean coverage of a region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageStats {
    /// Number of images inside the region
    pub images_count: f32,
    /// Mean of image area over region area
    pub avg_proportion: f32,
}

impl ImageStats {
    /// Compute coverage of `images` relative to `bound`.
    ///
    /// A region with zero area reports a proportion of 0.
    pub fn compute<'a, I>(bound: &Rect, images: I) -> Self
    where
        I: IntoIterator<Item = &'a RasterImage>,
    {
        let areas: Vec<f64> = images.into_iter().map(RasterImage::area).collect();
        if areas.is_empty() {
            return Self::default();
        }

        let region_area = bound.area();
        let avg_proportion = if region_area > 0.0 {
            areas.iter().map(|a| a / region_area).sum::<f64>() / areas.len() as f64
        } else {
            0.0
        };

        Self {
            images_count: areas.len() as f32,
            avg_proportion: avg_proportion as f32,
        }
    }
}
