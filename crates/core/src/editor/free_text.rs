//! Free-text boxes
//!
//! A click anchors the box; the text arrives separately once the user commits the
//! input field. Text cannot be embedded as native glyphs, so the group is rasterized
//! and exported as a stamp bitmap.

use super::{AddedAnnotation, Editor, EditorBase, EditorContext, Refreshed};
use crate::input::{PointerEvent, PointerPhase};
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use crate::translate;
use pdf_annotator_model::{AnnotationKind, Point, Shape, ShapeGeometry, ShapeGroup};

/// Average glyph advance relative to the font size
const GLYPH_WIDTH_RATIO: f64 = 0.6;
const LINE_HEIGHT_RATIO: f64 = 1.2;

#[derive(Debug)]
pub struct FreeTextEditor {
    base: EditorBase,
    anchor: Option<Point>,
}

impl FreeTextEditor {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        Self {
            base: EditorBase::new(page_number, kind),
            anchor: None,
        }
    }

    /// Stage position of the box waiting for text
    pub fn pending_anchor(&self) -> Option<Point> {
        self.anchor
    }
}

fn text_extent(text: &str, font_size: f64) -> (f64, f64) {
    let lines: Vec<&str> = text.lines().collect();
    let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    (
        longest as f64 * font_size * GLYPH_WIDTH_RATIO,
        lines.len().max(1) as f64 * font_size * LINE_HEIGHT_RATIO,
    )
}

impl Editor for FreeTextEditor {
    fn base(&self) -> &EditorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EditorBase {
        &mut self.base
    }

    fn deactivate(&mut self) {
        self.anchor = None;
        self.base.deactivate();
    }

    fn on_pointer(
        &mut self,
        surface: &mut DrawingSurface,
        event: PointerEvent,
        _ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        if self.base.is_active() && event.phase == PointerPhase::Down {
            self.anchor = Some(surface.to_stage(event.position));
        }
        None
    }

    fn submit_text(
        &mut self,
        surface: &mut DrawingSurface,
        text: &str,
        ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        if !self.base.is_active() {
            return None;
        }
        let anchor = self.anchor.take()?;
        let text = text.trim_end();
        if text.trim().is_empty() {
            return None;
        }

        let style = self.base.style().clone();
        let (width, height) = text_extent(text, style.font_size);
        let mut group = self.base.new_group(anchor);
        group.push(Shape::new(
            ShapeGeometry::Text {
                origin: Point::new(0.0, 0.0),
                text: text.to_string(),
                width,
                height,
            },
            style,
        ));
        self.finish(surface, group, ctx)
    }

    fn build_payload(
        &self,
        group: &ShapeGroup,
        surface: &DrawingSurface,
        _raw: Option<&AnnotationRecord>,
        ctx: &EditorContext<'_>,
    ) -> Option<Refreshed> {
        match ctx.rasterizer.rasterize(group) {
            Some(bitmap) => Some(Refreshed {
                payload: translate::stamp_payload(group, surface.viewport(), &bitmap),
                rendered: Some(bitmap),
            }),
            None => {
                tracing::debug!(id = %group.id, "no raster available, exporting native free text");
                Some(Refreshed {
                    payload: translate::free_text_payload(group, surface.viewport()),
                    rendered: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PainterConfig;
    use crate::editor::test_support::{ctx, surface};
    use crate::host::NoRasterizer;
    use pdf_annotator_model::{AnnotationSpec, HostPayload, Rect};

    fn active(surface: &mut DrawingSurface, ctx: &EditorContext<'_>) -> FreeTextEditor {
        let mut editor = FreeTextEditor::new(1, AnnotationKind::FreeText);
        let spec = AnnotationSpec::new(AnnotationKind::FreeText);
        editor.activate(surface, &spec, None, ctx);
        editor
    }

    #[test]
    fn text_is_rasterized_into_stamp() {
        let config = PainterConfig::default();
        let ctx = ctx(&config);
        let mut surface = surface(1.0);
        let mut editor = active(&mut surface, &ctx);

        editor.on_pointer(&mut surface, PointerEvent::down(40.0, 50.0), &ctx);
        let added = editor
            .submit_text(&mut surface, "Hello\nWorld!", &ctx)
            .expect("text should be added");

        let font_size = config.shape_style.font_size;
        let expected = Rect::new(40.0, 50.0, 6.0 * font_size * 0.6, 2.0 * font_size * 1.2);
        assert_eq!(added.group.client_rect(), Some(expected));
        let rendered = added.rendered.as_deref().unwrap_or_default();
        assert!(rendered.starts_with("data:image/png"));
        assert!(matches!(added.payload, HostPayload::Stamp(_)));
        assert!(editor.pending_anchor().is_none());
    }

    #[test]
    fn falls_back_to_native_free_text_without_raster() {
        let config = PainterConfig::default();
        let rasterizer = NoRasterizer;
        let ctx = EditorContext {
            config: &config,
            rasterizer: &rasterizer,
        };
        let mut surface = surface(1.0);
        let mut editor = active(&mut surface, &ctx);

        editor.on_pointer(&mut surface, PointerEvent::down(0.0, 0.0), &ctx);
        let added = editor.submit_text(&mut surface, "note", &ctx).unwrap();
        let HostPayload::FreeText(free_text) = added.payload else {
            panic!("expected free text payload");
        };
        assert_eq!(free_text.value, "note");
        assert!(added.rendered.is_none());
    }

    #[test]
    fn text_without_anchor_or_content_is_ignored() {
        let config = PainterConfig::default();
        let ctx = ctx(&config);
        let mut surface = surface(1.0);
        let mut editor = active(&mut surface, &ctx);

        assert!(editor.submit_text(&mut surface, "orphan", &ctx).is_none());
        editor.on_pointer(&mut surface, PointerEvent::down(0.0, 0.0), &ctx);
        assert!(editor.submit_text(&mut surface, "   ", &ctx).is_none());
        assert!(surface.layer().is_empty());
    }
}
