//! Axis-aligned bounding boxes in XYXY order.

use serde::Serialize;

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax).
///
/// Coordinates are stored exactly as the bounding-box manifest gives them;
/// they may be pixel or normalized values. The type does NOT enforce that
/// min < max, so malformed boxes still reach the output unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct BBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BBox {
    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
}
