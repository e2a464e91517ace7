//! Free-hand ink and free-hand highlight strokes

use super::{AddedAnnotation, Editor, EditorBase, EditorContext, Refreshed};
use crate::input::{PointerEvent, PointerPhase};
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use crate::translate;
use pdf_annotator_model::{AnnotationKind, Point, Rect, Shape, ShapeGeometry, ShapeGroup};

/// Minimum distance between captured points, in page units
const MIN_POINT_SPACING: f64 = 0.5;

#[derive(Debug)]
pub struct FreeHandEditor {
    base: EditorBase,
    stroke: Option<Vec<Point>>,
}

impl FreeHandEditor {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        Self {
            base: EditorBase::new(page_number, kind),
            stroke: None,
        }
    }

    fn is_highlight(&self) -> bool {
        self.kind() == AnnotationKind::FreeHighlight
    }

    fn capture(&mut self, point: Point) {
        if let Some(stroke) = self.stroke.as_mut() {
            if stroke.last().map_or(true, |last| last.distance_to(&point) >= MIN_POINT_SPACING) {
                stroke.push(point);
            }
        }
    }
}

impl Editor for FreeHandEditor {
    fn base(&self) -> &EditorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EditorBase {
        &mut self.base
    }

    fn deactivate(&mut self) {
        self.stroke = None;
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
                self.stroke = Some(vec![point]);
                None
            }
            PointerPhase::Move => {
                self.capture(point);
                None
            }
            PointerPhase::Up => {
                self.capture(point);
                let points = self.stroke.take()?;
                if points.len() < 2 {
                    return None;
                }

                let bounds = Rect::bounding(points.iter().copied())?;
                let mut group = self.base.new_group(Point::new(bounds.x, bounds.y));
                let local = points.iter().map(|p| p.offset(-bounds.x, -bounds.y)).collect();
                group.push(Shape::new(
                    ShapeGeometry::Line {
                        points: local,
                        closed: false,
                    },
                    self.base.style().clone(),
                ));
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
        let payload = if self.is_highlight() {
            translate::free_highlight_payload(group, surface.viewport())
        } else {
            translate::ink_payload(group, surface.viewport(), ctx.config.ellipse_segments)
        };
        Some(Refreshed {
            payload,
            rendered: None,
        })
    }
}
