//! Scene graph for annotation shapes
//!
//! A [`ShapeGroup`] is the serializable vector representation of one annotation
//! instance. Shapes are stored in group-local coordinates; the group transform maps
//! them into stage space.

use crate::geometry::{Point, Rect, Transform};
use crate::kind::{AnnotationKind, ShapeStyle};
use crate::ModelError;
use serde::{Deserialize, Serialize};

/// Identifier of a shape group and of its store record
pub type GroupId = String;

/// Geometry of a single shape, in group-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeGeometry {
    Rect {
        rect: Rect,
    },
    Ellipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
    },
    /// Open or closed polyline, also used for free-hand paths
    Line {
        points: Vec<Point>,
        #[serde(default)]
        closed: bool,
    },
    Text {
        origin: Point,
        text: String,
        width: f64,
        height: f64,
    },
    Image {
        rect: Rect,
        /// Data URL of the bitmap
        src: String,
    },
}

impl ShapeGeometry {
    /// Local bounding box, `None` for a path without points
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            ShapeGeometry::Rect { rect } | ShapeGeometry::Image { rect, .. } => Some(*rect),
            ShapeGeometry::Ellipse { center, radius_x, radius_y } => Some(Rect::new(
                center.x - radius_x,
                center.y - radius_y,
                radius_x * 2.0,
                radius_y * 2.0,
            )),
            ShapeGeometry::Line { points, .. } => Rect::bounding(points.iter().copied()),
            ShapeGeometry::Text { origin, width, height, .. } => {
                Some(Rect::new(origin.x, origin.y, *width, *height))
            }
        }
    }

    /// Outline as a polyline in local coordinates
    ///
    /// Ellipses are sampled with `segments` steps; rectangles, text and images yield
    /// their closed corner path.
    pub fn outline(&self, segments: usize) -> Vec<Point> {
        match self {
            ShapeGeometry::Rect { rect } | ShapeGeometry::Image { rect, .. } => {
                closed_corners(rect)
            }
            ShapeGeometry::Text { .. } => self
                .bounds()
                .map(|r| closed_corners(&r))
                .unwrap_or_default(),
            ShapeGeometry::Ellipse { center, radius_x, radius_y } => {
                let steps = segments.max(4);
                (0..=steps)
                    .map(|i| {
                        let angle = std::f64::consts::TAU * i as f64 / steps as f64;
                        Point::new(
                            center.x + radius_x * angle.cos(),
                            center.y + radius_y * angle.sin(),
                        )
                    })
                    .collect()
            }
            ShapeGeometry::Line { points, closed } => {
                let mut outline = points.clone();
                if *closed {
                    if let Some(first) = points.first() {
                        outline.push(*first);
                    }
                }
                outline
            }
        }
    }
}

fn closed_corners(rect: &Rect) -> Vec<Point> {
    let mut corners = rect.corners().to_vec();
    corners.push(corners[0]);
    corners
}

/// One drawable shape with its styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: ShapeGeometry,
    pub style: ShapeStyle,
}

impl Shape {
    pub fn new(geometry: ShapeGeometry, style: ShapeStyle) -> Self {
        Self { geometry, style }
    }
}

/// Serializable vector representation of one annotation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeGroup {
    pub id: GroupId,
    pub page_number: u32,
    pub kind: AnnotationKind,
    pub transform: Transform,
    pub shapes: Vec<Shape>,
}

impl ShapeGroup {
    /// Create an empty group with a generated ID
    pub fn new(page_number: u32, kind: AnnotationKind, transform: Transform) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        Self::with_id(id, page_number, kind, transform)
    }

    /// Create an empty group with a specific ID (for re-hydration)
    pub fn with_id(
        id: impl Into<GroupId>,
        page_number: u32,
        kind: AnnotationKind,
        transform: Transform,
    ) -> Self {
        Self {
            id: id.into(),
            page_number,
            kind,
            transform,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Style of the first shape, which carries the group's appearance
    pub fn primary_style(&self) -> Option<&ShapeStyle> {
        self.shapes.first().map(|shape| &shape.style)
    }

    /// Bounding box of all shapes in group-local space
    pub fn local_bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.geometry.bounds())
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Bounding box in stage space, with the group transform applied
    pub fn client_rect(&self) -> Option<Rect> {
        let bounds = self.local_bounds()?;
        Rect::bounding(bounds.corners().map(|corner| self.transform.apply(corner)))
    }

    /// Stage box of the scaled but unrotated group, centred where the rotated group sits
    ///
    /// Matches [`Self::client_rect`] when the group is not rotated.
    pub fn unrotated_client_rect(&self) -> Option<Rect> {
        let bounds = self.local_bounds()?;
        let width = bounds.width * self.transform.scale_x.abs();
        let height = bounds.height * self.transform.scale_y.abs();
        let center = self.transform.apply(bounds.center());
        Some(Rect::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        ))
    }

    /// Outline of every shape mapped into stage space
    pub fn stage_outlines(&self, segments: usize) -> Vec<Vec<Point>> {
        self.shapes
            .iter()
            .map(|shape| {
                shape
                    .geometry
                    .outline(segments)
                    .into_iter()
                    .map(|point| self.transform.apply(point))
                    .collect()
            })
            .collect()
    }

    /// Check if a stage-space point hits this group (for selection)
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        self.client_rect()
            .is_some_and(|rect| rect.contains(point, tolerance))
    }

    pub fn to_serialized(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_serialized(serialized: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(serialized)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_group() -> ShapeGroup {
        let transform = Transform::translation(10.0, 10.0);
        let mut group = ShapeGroup::new(1, AnnotationKind::Rectangle, transform);
        group.push(Shape::new(
            ShapeGeometry::Rect {
                rect: Rect::new(0.0, 0.0, 90.0, 50.0),
            },
            ShapeStyle::default(),
        ));
        group
    }

    #[test]
    fn client_rect_applies_translation() {
        assert_eq!(rect_group().client_rect(), Some(Rect::new(10.0, 10.0, 90.0, 50.0)));
    }

    #[test]
    fn client_rect_of_rotated_group_is_axis_aligned() {
        let mut group = rect_group();
        group.transform.rotation = 90.0;
        let rect = group.client_rect().unwrap();
        assert!((rect.x - -40.0).abs() < 1e-9);
        assert!((rect.y - 10.0).abs() < 1e-9);
        assert!((rect.width - 50.0).abs() < 1e-9);
        assert!((rect.height - 90.0).abs() < 1e-9);
    }

    #[test]
    fn unrotated_client_rect_keeps_local_aspect() {
        let mut group = rect_group();
        group.transform.rotation = 90.0;
        group.transform.scale_x = 2.0;
        let rect = group.unrotated_client_rect().unwrap();
        let client = group.client_rect().unwrap();
        assert!((rect.width - 180.0).abs() < 1e-9);
        assert!((rect.height - 50.0).abs() < 1e-9);
        assert!((rect.center().x - client.center().x).abs() < 1e-9);
        assert!((rect.center().y - client.center().y).abs() < 1e-9);
    }

    #[test]
    fn empty_group_has_no_bounds() {
        let group = ShapeGroup::new(1, AnnotationKind::FreeHand, Transform::default());
        assert!(group.client_rect().is_none());
        assert!(!group.hit_test(&Point::new(0.0, 0.0), 5.0));
    }

    #[test]
    fn serialized_group_restores_identically() {
        let group = rect_group();
        let restored = ShapeGroup::from_serialized(&group.to_serialized().unwrap()).unwrap();
        assert_eq!(restored, group);
    }

    #[test]
    fn ellipse_outline_is_closed() {
        let geometry = ShapeGeometry::Ellipse {
            center: Point::new(0.0, 0.0),
            radius_x: 2.0,
            radius_y: 1.0,
        };
        let outline = geometry.outline(8);
        assert_eq!(outline.len(), 9);
        assert!(outline[0].distance_to(&outline[8]) < 1e-9);
    }

    #[test]
    fn malformed_serialization_is_an_error() {
        assert!(ShapeGroup::from_serialized("{\"id\": 3}").is_err());
    }
}
