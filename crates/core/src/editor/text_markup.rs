//! Text markup: highlight, strikeout and underline over selected text

use super::{AddedAnnotation, Editor, EditorBase, EditorContext, Refreshed};
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use crate::translate;
use pdf_annotator_model::{AnnotationKind, Point, Rect, Shape, ShapeGeometry, ShapeGroup};

#[derive(Debug)]
pub struct TextMarkupEditor {
    base: EditorBase,
}

impl TextMarkupEditor {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        Self {
            base: EditorBase::new(page_number, kind),
        }
    }

    /// Local geometry for one selected line box
    fn markup_geometry(&self, rect: Rect) -> ShapeGeometry {
        let line = |y: f64| ShapeGeometry::Line {
            points: vec![Point::new(rect.x, y), Point::new(rect.right(), y)],
            closed: false,
        };
        match self.kind() {
            AnnotationKind::Strikeout => line(rect.y + rect.height / 2.0),
            AnnotationKind::Underline => line(rect.bottom()),
            _ => ShapeGeometry::Rect { rect },
        }
    }
}

impl Editor for TextMarkupEditor {
    fn base(&self) -> &EditorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EditorBase {
        &mut self.base
    }

    fn add_text_rects(
        &mut self,
        surface: &mut DrawingSurface,
        rects: &[Rect],
        ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        if !self.base.is_active() {
            return None;
        }
        let rects: Vec<Rect> = rects
            .iter()
            .copied()
            .filter(|rect| !rect.is_empty())
            .collect();
        let bounds = rects.iter().copied().reduce(|acc, rect| acc.union(&rect))?;

        let mut group = self.base.new_group(Point::new(bounds.x, bounds.y));
        let style = self.base.style().clone();
        for rect in rects {
            let local = rect.offset(-bounds.x, -bounds.y);
            group.push(Shape::new(self.markup_geometry(local), style.clone()));
        }
        self.finish(surface, group, ctx)
    }

    fn build_payload(
        &self,
        group: &ShapeGroup,
        surface: &DrawingSurface,
        _raw: Option<&AnnotationRecord>,
        ctx: &EditorContext<'_>,
    ) -> Option<Refreshed> {
        let viewport = surface.viewport();
        let payload = match self.kind() {
            AnnotationKind::Highlight => translate::text_highlight_payload(group, viewport),
            _ => translate::ink_payload(group, viewport, ctx.config.ellipse_segments),
        };
        Some(Refreshed {
            payload,
            rendered: None,
        })
    }
}
