//! Manipulation handles and transform calculation
//!
//! Provides handles for moving, resizing, and rotating shape groups. Handles sit on the
//! group's stage bounding box; dragging one yields a new group transform.

use pdf_annotator_model::{GroupId, Point, Rect, ShapeGroup, Transform};

/// Distance of the rotation handle above the top edge, in stage units
const ROTATE_HANDLE_OFFSET: f64 = 20.0;

/// Smallest width or height a resize may produce
const MIN_RESIZE_EXTENT: f64 = 1.0;

/// Share of a handle direction along a local axis needed to move that axis' edge
const SIDE_THRESHOLD: f64 = 0.25;

/// Type of manipulation handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    /// Corner handles for resizing
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,

    /// Edge handles for resizing in one dimension
    Top,
    Bottom,
    Left,
    Right,

    /// Rotation handle above the group
    Rotate,

    /// The group body itself
    Move,
}

impl HandleType {
    /// Outward direction of the handle in stage space
    fn direction(&self) -> (f64, f64) {
        let x = match self {
            HandleType::TopLeft | HandleType::BottomLeft | HandleType::Left => -1.0,
            HandleType::TopRight | HandleType::BottomRight | HandleType::Right => 1.0,
            _ => 0.0,
        };
        let y = match self {
            HandleType::TopLeft | HandleType::TopRight | HandleType::Top => -1.0,
            HandleType::BottomLeft | HandleType::BottomRight | HandleType::Bottom => 1.0,
            _ => 0.0,
        };
        (x, y)
    }
}

/// Manipulation handle with position and type
#[derive(Debug, Clone)]
pub struct ManipulationHandle {
    pub handle_type: HandleType,

    /// Position in stage coordinates
    pub position: Point,

    /// Radius of the hit area
    pub size: f64,

    pub group_id: GroupId,
}

impl ManipulationHandle {
    pub fn new(
        handle_type: HandleType,
        position: Point,
        size: f64,
        group_id: impl Into<GroupId>,
    ) -> Self {
        Self {
            handle_type,
            position,
            size,
            group_id: group_id.into(),
        }
    }

    /// Check if a point hits this handle
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        point.distance_to(&self.position) <= self.size + tolerance
    }
}

/// Generate manipulation handles for a group
///
/// Text markup follows the text it covers and gets no handles; it can only be moved or
/// deleted.
pub fn generate_handles(group: &ShapeGroup, handle_size: f64) -> Vec<ManipulationHandle> {
    if group.kind.is_text_markup() {
        return Vec::new();
    }
    let Some(bounds) = group.client_rect() else {
        return Vec::new();
    };

    let center = bounds.center();
    let (left, top, right, bottom) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());
    let rotate_y = top - ROTATE_HANDLE_OFFSET;
    let placements = [
        (HandleType::TopLeft, Point::new(left, top)),
        (HandleType::TopRight, Point::new(right, top)),
        (HandleType::BottomLeft, Point::new(left, bottom)),
        (HandleType::BottomRight, Point::new(right, bottom)),
        (HandleType::Top, Point::new(center.x, top)),
        (HandleType::Bottom, Point::new(center.x, bottom)),
        (HandleType::Left, Point::new(left, center.y)),
        (HandleType::Right, Point::new(right, center.y)),
        (HandleType::Rotate, Point::new(center.x, rotate_y)),
    ];

    placements
        .into_iter()
        .map(|(handle_type, position)| {
            ManipulationHandle::new(handle_type, position, handle_size, group.id.clone())
        })
        .collect()
}

/// Rotate a vector clockwise by `degrees` (y axis points down)
fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Active manipulation state
#[derive(Debug, Clone)]
pub struct ManipulationState {
    pub group_id: GroupId,

    pub handle_type: HandleType,

    /// Transform before manipulation started
    pub original_transform: Transform,

    /// Stage bounds before manipulation started
    pub original_bounds: Rect,

    /// Group-local bounds, unaffected by the transform
    pub original_local_bounds: Rect,

    /// Drag start position in stage coordinates
    pub drag_start: Point,

    pub current_position: Point,
}

impl ManipulationState {
    pub fn new(group: &ShapeGroup, handle_type: HandleType, drag_start: Point) -> Self {
        Self {
            group_id: group.id.clone(),
            handle_type,
            original_transform: group.transform,
            original_bounds: group.client_rect().unwrap_or_default(),
            original_local_bounds: group.local_bounds().unwrap_or_default(),
            drag_start,
            current_position: drag_start,
        }
    }

    pub fn update_position(&mut self, position: Point) {
        self.current_position = position;
    }

    /// Whether the pointer has left the drag start
    pub fn has_moved(&self) -> bool {
        self.current_position != self.drag_start
    }

    /// Calculate the group transform for the current drag position
    pub fn calculate_transform(&self) -> Transform {
        let delta_x = self.current_position.x - self.drag_start.x;
        let delta_y = self.current_position.y - self.drag_start.y;
        let original = self.original_transform;

        match self.handle_type {
            HandleType::Move => Transform {
                x: original.x + delta_x,
                y: original.y + delta_y,
                ..original
            },
            HandleType::Rotate => self.rotated(),
            _ => self.resized(delta_x, delta_y),
        }
    }

    /// Resize along the group's own axes
    ///
    /// Works in the scaled, unrotated frame of the group: the drag and the handle
    /// direction are rotated back by the group rotation, the matching local edges move,
    /// and the opposite edge keeps its stage position.
    fn resized(&self, delta_x: f64, delta_y: f64) -> Transform {
        let original = self.original_transform;
        let local = self.original_local_bounds;

        let (left, right) = ordered(local.x * original.scale_x, local.right() * original.scale_x);
        let (top, bottom) = ordered(
            local.y * original.scale_y,
            local.bottom() * original.scale_y,
        );
        let width = right - left;
        let height = bottom - top;
        if width <= 0.0 || height <= 0.0 {
            return original;
        }

        let (dir_x, dir_y) = self.handle_type.direction();
        let (side_x, side_y) = rotate(dir_x, dir_y, -original.rotation);
        let (dx, dy) = rotate(delta_x, delta_y, -original.rotation);

        let mut new_left = left;
        let mut new_right = right;
        let mut new_top = top;
        let mut new_bottom = bottom;
        if side_x < -SIDE_THRESHOLD {
            new_left = (left + dx).min(right - MIN_RESIZE_EXTENT);
        } else if side_x > SIDE_THRESHOLD {
            new_right = (right + dx).max(left + MIN_RESIZE_EXTENT);
        }
        if side_y < -SIDE_THRESHOLD {
            new_top = (top + dy).min(bottom - MIN_RESIZE_EXTENT);
        } else if side_y > SIDE_THRESHOLD {
            new_bottom = (bottom + dy).max(top + MIN_RESIZE_EXTENT);
        }
        let factor_x = (new_right - new_left) / width;
        let factor_y = (new_bottom - new_top) / height;

        let anchor_x = if side_x < -SIDE_THRESHOLD { right } else { left };
        let anchor_y = if side_y < -SIDE_THRESHOLD { bottom } else { top };
        let (fixed_x, fixed_y) = rotate(anchor_x, anchor_y, original.rotation);
        let (moved_x, moved_y) = rotate(
            anchor_x * factor_x,
            anchor_y * factor_y,
            original.rotation,
        );

        Transform {
            x: original.x + fixed_x - moved_x,
            y: original.y + fixed_y - moved_y,
            scale_x: original.scale_x * factor_x,
            scale_y: original.scale_y * factor_y,
            rotation: original.rotation,
        }
    }

    fn rotated(&self) -> Transform {
        let original = self.original_transform;
        let center = self.original_bounds.center();
        let angle = |point: Point| (point.y - center.y).atan2(point.x - center.x);
        let delta = angle(self.current_position) - angle(self.drag_start);

        // Rotate the group origin around the bounds centre by the same angle.
        let (dx, dy) = rotate(
            original.x - center.x,
            original.y - center.y,
            delta.to_degrees(),
        );
        Transform {
            x: center.x + dx,
            y: center.y + dy,
            rotation: (original.rotation + delta.to_degrees()).rem_euclid(360.0),
            ..original
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    (a.min(b), a.max(b))
}
