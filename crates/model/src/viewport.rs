//! Page viewport geometry reported by the host viewer

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Opaque handle of the DOM container hosting a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

/// Viewport of a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageViewport {
    /// Zoom factor, 1.0 renders one page unit as one pixel
    pub scale: f64,
    /// Page rotation in degrees (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: u16,
    /// Rendered width in pixels
    pub width: f64,
    /// Rendered height in pixels
    pub height: f64,
    /// PDF view box `[x0, y0, x1, y1]` in user-space units
    pub view_box: [f64; 4],
}

impl Default for PageViewport {
    fn default() -> Self {
        Self::letter(1.0)
    }
}

impl PageViewport {
    /// US letter page at the given zoom
    pub fn letter(scale: f64) -> Self {
        Self {
            scale,
            rotation: 0,
            width: 612.0 * scale,
            height: 792.0 * scale,
            view_box: [0.0, 0.0, 612.0, 792.0],
        }
    }

    /// The same page displayed with a different rotation
    ///
    /// The rendered size follows the rotation: quarter turns swap width and height.
    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = rotation % 360;
        let (width, height) = if self.is_quarter_turned() {
            (self.page_height(), self.page_width())
        } else {
            (self.page_width(), self.page_height())
        };
        self.width = width * self.scale;
        self.height = height * self.scale;
        self
    }

    /// Unscaled page width in stage units
    pub fn page_width(&self) -> f64 {
        self.view_box[2] - self.view_box[0]
    }

    /// Unscaled page height in stage units
    pub fn page_height(&self) -> f64 {
        self.view_box[3] - self.view_box[1]
    }

    fn is_quarter_turned(&self) -> bool {
        matches!(self.rotation % 360, 90 | 270)
    }

    /// Unscaled user-space to stage transform `[a, b, c, d, e, f]`
    ///
    /// Stage point is `(a * x + c * y + e, b * x + d * y + f)`, the layout the viewer
    /// uses for its page viewports.
    fn stage_transform(&self) -> [f64; 6] {
        let (a, b, c, d) = match self.rotation % 360 {
            90 => (0.0, 1.0, 1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, 1.0),
            270 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };
        let center_x = (self.view_box[0] + self.view_box[2]) / 2.0;
        let center_y = (self.view_box[1] + self.view_box[3]) / 2.0;
        let (offset_x, offset_y) = if self.is_quarter_turned() {
            (self.page_height() / 2.0, self.page_width() / 2.0)
        } else {
            (self.page_width() / 2.0, self.page_height() / 2.0)
        };
        [
            a,
            b,
            c,
            d,
            offset_x - a * center_x - c * center_y,
            offset_y - b * center_x - d * center_y,
        ]
    }

    /// Map a stage point (origin top-left of the displayed page, y down) into PDF user
    /// space (y up), undoing the page rotation
    pub fn to_pdf_point(&self, point: Point) -> [f64; 2] {
        let [a, b, c, d, e, f] = self.stage_transform();
        let det = a * d - b * c;
        let u = point.x - e;
        let v = point.y - f;
        [(d * u - c * v) / det, (a * v - b * u) / det]
    }

    /// Map a stage rectangle into a PDF `[x1, y1, x2, y2]` rect with `y1 <= y2`
    pub fn to_pdf_rect(&self, rect: Rect) -> [f64; 4] {
        let [x1, y1] = self.to_pdf_point(Point::new(rect.x, rect.y));
        let [x2, y2] = self.to_pdf_point(Point::new(rect.right(), rect.bottom()));
        [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]
    }

    /// Convert a container-pixel position into stage units
    pub fn to_stage(&self, point: Point) -> Point {
        if self.scale > 0.0 {
            point.scale(1.0 / self.scale)
        } else {
            point
        }
    }
}

/// Page lifecycle notification payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub container: ContainerId,
    pub viewport: PageViewport,
}

impl PageView {
    pub fn new(container: ContainerId, viewport: PageViewport) -> Self {
        Self {
            container,
            viewport,
        }
    }
}
