//! Drag-to-size shapes: rectangles and ellipses

use super::{AddedAnnotation, Editor, EditorBase, EditorContext, Refreshed};
use crate::input::{PointerEvent, PointerPhase};
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use crate::translate;
use pdf_annotator_model::{AnnotationKind, Point, Rect, Shape, ShapeGeometry, ShapeGroup};

/// Geometry produced by a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragShape {
    Rectangle,
    Ellipse,
}

impl DragShape {
    fn geometry(&self, width: f64, height: f64) -> ShapeGeometry {
        match self {
            DragShape::Rectangle => ShapeGeometry::Rect {
                rect: Rect::new(0.0, 0.0, width, height),
            },
            DragShape::Ellipse => ShapeGeometry::Ellipse {
                center: Point::new(width / 2.0, height / 2.0),
                radius_x: width / 2.0,
                radius_y: height / 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Draft {
    start: Point,
    current: Point,
}

/// Editor for rectangle and ellipse annotations
#[derive(Debug)]
pub struct DragShapeEditor {
    base: EditorBase,
    shape: DragShape,
    draft: Option<Draft>,
}

impl DragShapeEditor {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        let shape = match kind {
            AnnotationKind::Ellipse => DragShape::Ellipse,
            _ => DragShape::Rectangle,
        };
        Self {
            base: EditorBase::new(page_number, kind),
            shape,
            draft: None,
        }
    }

    /// Stage rectangle of the drag in progress
    pub fn draft_rect(&self) -> Option<Rect> {
        self.draft.map(|draft| Rect::from_corners(draft.start, draft.current))
    }
}

impl Editor for DragShapeEditor {
    fn base(&self) -> &EditorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EditorBase {
        &mut self.base
    }

    fn deactivate(&mut self) {
        self.draft = None;
        self.base.deactivate();
    }

    fn on_pointer(
        &mut self,
        surface: &mut DrawingSurface,
        event: PointerEvent,
        ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        if !self.base.is_active() {
            return None;
        }
        let point = surface.to_stage(event.position);

        match event.phase {
            PointerPhase::Down => {
                self.draft = Some(Draft {
                    start: point,
                    current: point,
                });
                None
            }
            PointerPhase::Move => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.current = point;
                }
                None
            }
            PointerPhase::Up => {
                let mut draft = self.draft.take()?;
                draft.current = point;
                let rect = Rect::from_corners(draft.start, draft.current);
                let min_size = ctx.config.min_shape_size;
                if rect.width < min_size || rect.height < min_size {
                    tracing::debug!(kind = %self.kind(), "discarding degenerate shape");
                    return None;
                }

                let mut group = self.base.new_group(Point::new(rect.x, rect.y));
                let geometry = self.shape.geometry(rect.width, rect.height);
                group.push(Shape::new(geometry, self.base.style().clone()));
                self.finish(surface, group, ctx)
            }
        }
    }

    fn build_payload(
        &self,
        group: &ShapeGroup,
        surface: &DrawingSurface,
        _raw: Option<&AnnotationRecord>,
        ctx: &EditorContext<'_>,
    ) -> Option<Refreshed> {
        let segments = ctx.config.ellipse_segments;
        Some(Refreshed {
            payload: translate::ink_payload(group, surface.viewport(), segments),
            rendered: None,
        })
    }
}
