//! Signature and stamp placement
//!
//! The chosen image arrives as a `data:` URL when the tool is activated. A preview
//! follows the pointer and a click places the image centred on it.

use super::{AddedAnnotation, Editor, EditorBase, EditorContext, Refreshed};
use crate::input::{PointerEvent, PointerPhase};
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use crate::translate;
use pdf_annotator_model::{
    AnnotationKind, AnnotationSpec, DataUrl, Point, Rect, Shape, ShapeGeometry, ShapeGroup,
};

#[derive(Debug)]
pub struct ImageEditor {
    base: EditorBase,
    source: Option<String>,
    size: Option<(f64, f64)>,
    preview: Option<Point>,
}

impl ImageEditor {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        Self {
            base: EditorBase::new(page_number, kind),
            source: None,
            size: None,
            preview: None,
        }
    }

    /// Stage rectangle the image would occupy if placed now
    pub fn preview_rect(&self) -> Option<Rect> {
        let center = self.preview?;
        let (width, height) = self.size?;
        let origin = center.offset(-width / 2.0, -height / 2.0);
        Some(Rect::new(origin.x, origin.y, width, height))
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

/// Placed size of an image at the configured default width, keeping its aspect ratio
///
/// SVG sources and undecodable bitmaps fall back to a square.
fn placed_size(source: &str, default_width: f64) -> (f64, f64) {
    let square = (default_width, default_width);
    let data_url = match DataUrl::parse(source) {
        Ok(data_url) => data_url,
        Err(err) => {
            tracing::warn!(error = %err, "image source is not a data URL, using square placement");
            return square;
        }
    };
    if data_url.is_svg() {
        return square;
    }

    match image::load_from_memory(&data_url.bytes) {
        Ok(decoded) if decoded.width() > 0 => {
            let aspect = f64::from(decoded.height()) / f64::from(decoded.width());
            (default_width, default_width * aspect)
        }
        Ok(_) => square,
        Err(err) => {
            tracing::warn!(
                error = %err,
                mime = %data_url.mime,
                "failed to decode image, using square placement"
            );
            square
        }
    }
}

impl Editor for ImageEditor {
    fn base(&self) -> &EditorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EditorBase {
        &mut self.base
    }

    fn activate(
        &mut self,
        _surface: &mut DrawingSurface,
        spec: &AnnotationSpec,
        transfer: Option<&str>,
        ctx: &EditorContext<'_>,
    ) {
        self.base.activate(spec, ctx.config);
        self.preview = None;
        match transfer {
            Some(source) => {
                self.size = Some(placed_size(source, ctx.config.stamp_default_width));
                self.source = Some(source.to_string());
            }
            None => {
                tracing::warn!(kind = %self.kind(), "activated without an image");
                self.source = None;
                self.size = None;
            }
        }
    }

    fn deactivate(&mut self) {
        self.preview = None;
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
            PointerPhase::Move => {
                self.preview = Some(point);
                None
            }
            PointerPhase::Up => None,
            PointerPhase::Down => {
                self.preview = Some(point);
                let Some(source) = self.source.clone() else {
                    tracing::warn!(kind = %self.kind(), "no image to place");
                    return None;
                };
                let rect = self.preview_rect()?;

                let mut group = self.base.new_group(Point::new(rect.x, rect.y));
                group.push(Shape::new(
                    ShapeGeometry::Image {
                        rect: Rect::new(0.0, 0.0, rect.width, rect.height),
                        src: source,
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
        raw: Option<&AnnotationRecord>,
        _ctx: &EditorContext<'_>,
    ) -> Option<Refreshed> {
        let source = group
            .shapes
            .iter()
            .find_map(|shape| match &shape.geometry {
                ShapeGeometry::Image { src, .. } => Some(src.clone()),
                _ => None,
            })
            .or_else(|| raw.and_then(|record| record.rendered.clone()))?;

        Some(Refreshed {
            payload: translate::stamp_payload(group, surface.viewport(), &source),
            rendered: Some(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PainterConfig;
    use crate::editor::test_support::{ctx, surface};
    use pdf_annotator_model::HostPayload;
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32) -> String {
        let mut bytes = Vec::new();
        image::RgbaImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png should encode");
        DataUrl::encode("image/png", &bytes)
    }

    #[test]
    fn signature_is_centred_on_click_with_image_aspect() {
        let config = PainterConfig::default().with_stamp_default_width(100.0);
        let ctx = ctx(&config);
        let mut surface = surface(1.0);
        let mut editor = ImageEditor::new(1, AnnotationKind::Signature);
        let source = png_data_url(40, 20);
        let spec = AnnotationSpec::new(AnnotationKind::Signature).once();
        editor.activate(&mut surface, &spec, Some(&source), &ctx);

        editor.on_pointer(&mut surface, PointerEvent::moved(150.0, 150.0), &ctx);
        assert_eq!(editor.preview_rect(), Some(Rect::new(100.0, 125.0, 100.0, 50.0)));

        let added = editor
            .on_pointer(&mut surface, PointerEvent::down(200.0, 200.0), &ctx)
            .expect("image should be placed");
        assert_eq!(added.group.client_rect(), Some(Rect::new(150.0, 175.0, 100.0, 50.0)));
        assert!(added.place_once);
        assert_eq!(added.rendered.as_deref(), Some(source.as_str()));
        let HostPayload::Stamp(stamp) = added.payload else {
            panic!("expected stamp payload");
        };
        assert!(!stamp.is_svg);
    }

    #[test]
    fn svg_and_broken_sources_fall_back_to_square() {
        assert_eq!(placed_size("data:image/svg+xml;base64,PHN2Zy8+", 80.0), (80.0, 80.0));
        assert_eq!(placed_size("data:image/png;base64,AAAA", 80.0), (80.0, 80.0));
        assert_eq!(placed_size("not a url", 80.0), (80.0, 80.0));
    }

    #[test]
    fn click_without_image_places_nothing() {
        let config = PainterConfig::default();
        let ctx = ctx(&config);
        let mut surface = surface(1.0);
        let mut editor = ImageEditor::new(1, AnnotationKind::Stamp);
        let spec = AnnotationSpec::new(AnnotationKind::Stamp);
        editor.activate(&mut surface, &spec, None, &ctx);

        assert!(!editor.has_source());
        let outcome = editor.on_pointer(&mut surface, PointerEvent::down(10.0, 10.0), &ctx);
        assert!(outcome.is_none());
        assert!(surface.layer().is_empty());
    }
}
