/// Page geometry and the fit-and-center rule for one image per page

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Measurement unit for page geometry and image placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pt,
    /// One px unit spans 96/72 pt, so A4 measures 446.46 x 631.42 px.
    #[default]
    Px,
    Mm,
}

impl Unit {
    /// PDF points covered by one unit
    pub fn points_per_unit(self) -> f64 {
        match self {
            Unit::Pt => 1.0,
            Unit::Px => 96.0 / 72.0,
            Unit::Mm => 72.0 / 25.4,
        }
    }
}

/// Paper format, portrait dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
    Custom { width_pt: f64, height_pt: f64 },
}

impl PageFormat {
    pub fn portrait_points(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Legal => (612.0, 1008.0),
            PageFormat::Custom {
                width_pt,
                height_pt,
            } => (width_pt.min(height_pt), width_pt.max(height_pt)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page dimensions in user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(format: PageFormat, orientation: Orientation, unit: Unit) -> Self {
        let (w, h) = format.portrait_points();
        let (w, h) = match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        let k = unit.points_per_unit();
        Self {
            width: w / k,
            height: h / k,
        }
    }

    /// Page size minus `margin` on every side.
    ///
    /// Errors when the margin leaves no room for content.
    pub fn content_area(&self, margin: f64) -> Result<(f64, f64)> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::ConfigError(format!(
                "margin must be a non-negative number, got {}",
                margin
            )));
        }
        let width = self.width - margin * 2.0;
        let height = self.height - margin * 2.0;
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::ConfigError(format!(
                "margin {} leaves no content area on a {:.2}x{:.2} page",
                margin, self.width, self.height
            )));
        }
        Ok((width, height))
    }
}

/// Axis-aligned rectangle, top-left origin, user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where one image lands on its page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub rect: Rect,
    /// Uniform factor applied to the natural size (1.0 when unscaled)
    pub scale: f64,
}

/// Fit an image of natural size `image_width` x `image_height` onto `page`.
///
/// Images larger than the content area in either axis shrink uniformly by
/// `min(content_w / w, content_h / h)`; smaller ones keep their natural
/// size. The result is centered on the full page, not on the content area.
pub fn place_image(
    page: PageSize,
    content: (f64, f64),
    image_width: f64,
    image_height: f64,
) -> Placement {
    let (max_width, max_height) = content;
    let mut width = image_width;
    let mut height = image_height;
    let mut scale = 1.0;

    if width > max_width || height > max_height {
        scale = (max_width / width).min(max_height / height);
        width *= scale;
        height *= scale;
    }

    Placement {
        rect: Rect {
            x: (page.width - width) / 2.0,
            y: (page.height - height) / 2.0,
            width,
            height,
        },
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn page(width: f64, height: f64) -> PageSize {
        PageSize { width, height }
    }

    #[test]
    fn default_a4_in_px() {
        let p = PageSize::new(PageFormat::A4, Orientation::Portrait, Unit::Px);
        assert!((p.width - 446.46).abs() < 1e-6);
        assert!((p.height - 631.4175).abs() < 1e-6);
        let (cw, ch) = p.content_area(20.0).unwrap();
        assert!((cw - 406.46).abs() < 1e-6);
        assert!((ch - 591.4175).abs() < 1e-6);
    }

    #[test]
    fn landscape_swaps_axes() {
        let p = PageSize::new(PageFormat::Letter, Orientation::Landscape, Unit::Pt);
        assert_eq!((p.width, p.height), (792.0, 612.0));
    }

    #[test]
    fn small_image_is_centered_unscaled() {
        let p = page(440.0, 540.0);
        let content = p.content_area(20.0).unwrap();
        assert_eq!(content, (400.0, 500.0));
        let placed = place_image(p, content, 100.0, 100.0);
        assert_eq!(placed.scale, 1.0);
        assert_eq!(
            placed.rect,
            Rect {
                x: 170.0,
                y: 220.0,
                width: 100.0,
                height: 100.0
            }
        );
    }

    #[test]
    fn wide_image_scales_by_min_ratio() {
        let p = page(740.0, 940.0);
        let content = p.content_area(20.0).unwrap();
        let placed = place_image(p, content, 2000.0, 1000.0);
        assert!((placed.scale - 0.35).abs() < EPS);
        assert!((placed.rect.width - 700.0).abs() < EPS);
        assert!((placed.rect.height - 350.0).abs() < EPS);
        assert!((placed.rect.x - 20.0).abs() < EPS);
        assert!((placed.rect.y - 295.0).abs() < EPS);
    }

    #[test]
    fn tall_image_keeps_aspect_ratio() {
        let p = page(440.0, 540.0);
        let content = p.content_area(20.0).unwrap();
        let placed = place_image(p, content, 300.0, 1200.0);
        assert!((placed.rect.height - 500.0).abs() < EPS);
        let ratio = placed.rect.width / placed.rect.height;
        assert!((ratio - 0.25).abs() < EPS);
    }

    #[test]
    fn one_axis_overflow_triggers_scaling() {
        let p = page(440.0, 540.0);
        let content = p.content_area(20.0).unwrap();
        let placed = place_image(p, content, 410.0, 10.0);
        assert!(placed.scale < 1.0);
        assert!((placed.rect.width - 400.0).abs() < EPS);
    }

    #[test]
    fn centering_ignores_margin() {
        // A page-sized image shrinks to the content area, then centers on the page.
        let p = page(100.0, 100.0);
        let content = p.content_area(10.0).unwrap();
        let placed = place_image(p, content, 100.0, 100.0);
        assert!((placed.rect.x - 10.0).abs() < EPS);
        assert!((placed.rect.width - 80.0).abs() < EPS);
    }

    #[test]
    fn oversized_margin_is_rejected() {
        let p = page(100.0, 100.0);
        assert!(matches!(p.content_area(50.0), Err(Error::ConfigError(_))));
        assert!(matches!(p.content_area(-1.0), Err(Error::ConfigError(_))));
    }
}
