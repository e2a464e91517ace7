//! Translation from shape groups to host annotation-storage payloads
//!
//! All payloads are expressed in PDF user space for the group's page viewport. Vector
//! payloads carry the group rotation baked into their points; bitmap payloads keep the
//! unrotated box and carry the rotation in the `rotation` field.

use pdf_annotator_model::payload::{
    ANNOTATION_TYPE_FREETEXT, ANNOTATION_TYPE_HIGHLIGHT, ANNOTATION_TYPE_INK,
    ANNOTATION_TYPE_STAMP,
};
use pdf_annotator_model::{
    FreeTextPayload, HighlightPayload, HostPayload, InkPath, InkPayload, PageViewport, Point,
    Rect, ShapeGeometry, ShapeGroup, ShapeStyle, StampPayload,
};

/// Host page index of a one-based page number
pub fn page_index(page_number: u32) -> u32 {
    page_number.saturating_sub(1)
}

fn group_style(group: &ShapeGroup) -> ShapeStyle {
    group.primary_style().cloned().unwrap_or_default()
}

/// Mean scale of the group, applied to stroke widths
fn stroke_scale(group: &ShapeGroup) -> f64 {
    (group.transform.scale_x.abs() + group.transform.scale_y.abs()) / 2.0
}

fn padded(rect: Rect, padding: f64) -> Rect {
    Rect::new(
        rect.x - padding,
        rect.y - padding,
        rect.width + padding * 2.0,
        rect.height + padding * 2.0,
    )
}

fn pdf_rect(group: &ShapeGroup, viewport: &PageViewport, padding: f64) -> [f64; 4] {
    viewport.to_pdf_rect(padded(group.client_rect().unwrap_or_default(), padding))
}

/// Unrotated box of a bitmap-backed group
fn bitmap_rect(group: &ShapeGroup, viewport: &PageViewport) -> [f64; 4] {
    viewport.to_pdf_rect(group.unrotated_client_rect().unwrap_or_default())
}

/// Page rotation plus the group's own rotation, clockwise degrees in `0..360`
fn bitmap_rotation(group: &ShapeGroup, viewport: &PageViewport) -> u16 {
    let degrees = f64::from(viewport.rotation) + group.transform.rotation;
    (degrees.rem_euclid(360.0).round() as u16) % 360
}

fn to_pdf_points(points: &[Point], viewport: &PageViewport) -> Vec<[f64; 2]> {
    points
        .iter()
        .map(|point| viewport.to_pdf_point(*point))
        .collect()
}

/// Ink payload tracing every shape outline of the group
pub fn ink_payload(
    group: &ShapeGroup,
    viewport: &PageViewport,
    ellipse_segments: usize,
) -> HostPayload {
    let style = group_style(group);
    let thickness = style.stroke_width * stroke_scale(group);
    let paths = group
        .stage_outlines(ellipse_segments)
        .iter()
        .filter(|outline| !outline.is_empty())
        .map(|outline| to_pdf_points(outline, viewport))
        .map(|points| InkPath::from_points(&points))
        .collect();

    HostPayload::Ink(InkPayload {
        annotation_type: ANNOTATION_TYPE_INK,
        color: style.stroke.to_rgb(),
        thickness,
        opacity: style.opacity,
        paths,
        page_index: page_index(group.page_number),
        rect: pdf_rect(group, viewport, thickness / 2.0),
        rotation: viewport.rotation,
    })
}

/// Quad points of a stage-space quadrilateral given clockwise from top-left
fn quad_points(corners: &[Point; 4], viewport: &PageViewport) -> [f64; 8] {
    let [tl, tr, br, bl] = (*corners).map(|corner| viewport.to_pdf_point(corner));
    [tl[0], tl[1], tr[0], tr[1], bl[0], bl[1], br[0], br[1]]
}

/// Highlight payload over the rectangles of a text-markup group
pub fn text_highlight_payload(group: &ShapeGroup, viewport: &PageViewport) -> HostPayload {
    let style = group_style(group);
    let mut quads: Vec<f64> = Vec::new();
    let mut outlines: Vec<Vec<f64>> = Vec::new();

    for shape in &group.shapes {
        let ShapeGeometry::Rect { rect } = &shape.geometry else {
            continue;
        };
        let corners = rect.corners().map(|corner| group.transform.apply(corner));
        quads.extend_from_slice(&quad_points(&corners, viewport));
        outlines.push(
            corners
                .iter()
                .flat_map(|corner| viewport.to_pdf_point(*corner))
                .collect(),
        );
    }

    HostPayload::Highlight(HighlightPayload {
        annotation_type: ANNOTATION_TYPE_HIGHLIGHT,
        color: style.fill.unwrap_or(style.stroke).to_rgb(),
        opacity: style.opacity,
        thickness: 0.0,
        quad_points: quads,
        outlines,
        page_index: page_index(group.page_number),
        rect: pdf_rect(group, viewport, 0.0),
        rotation: viewport.rotation,
    })
}

/// Highlight payload for a free-hand highlight stroke
pub fn free_highlight_payload(group: &ShapeGroup, viewport: &PageViewport) -> HostPayload {
    let style = group_style(group);
    let thickness = style.stroke_width * stroke_scale(group);
    let outlines: Vec<Vec<f64>> = group
        .stage_outlines(0)
        .iter()
        .map(|outline| {
            outline
                .iter()
                .flat_map(|point| viewport.to_pdf_point(*point))
                .collect()
        })
        .collect();
    let bounds = padded(group.client_rect().unwrap_or_default(), thickness / 2.0);

    HostPayload::Highlight(HighlightPayload {
        annotation_type: ANNOTATION_TYPE_HIGHLIGHT,
        color: style.stroke.to_rgb(),
        opacity: style.opacity,
        thickness,
        quad_points: quad_points(&bounds.corners(), viewport).to_vec(),
        outlines,
        page_index: page_index(group.page_number),
        rect: viewport.to_pdf_rect(bounds),
        rotation: viewport.rotation,
    })
}

/// Stamp payload embedding a bitmap over the group's unrotated box
pub fn stamp_payload(group: &ShapeGroup, viewport: &PageViewport, bitmap_url: &str) -> HostPayload {
    HostPayload::Stamp(StampPayload {
        annotation_type: ANNOTATION_TYPE_STAMP,
        bitmap_id: group.id.clone(),
        bitmap_url: bitmap_url.to_string(),
        is_svg: bitmap_url.starts_with("data:image/svg+xml"),
        page_index: page_index(group.page_number),
        rect: bitmap_rect(group, viewport),
        rotation: bitmap_rotation(group, viewport),
    })
}

/// Native free-text payload, used when the text could not be rasterized
pub fn free_text_payload(group: &ShapeGroup, viewport: &PageViewport) -> HostPayload {
    let style = group_style(group);
    let value = group
        .shapes
        .iter()
        .find_map(|shape| match &shape.geometry {
            ShapeGeometry::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default();

    HostPayload::FreeText(FreeTextPayload {
        annotation_type: ANNOTATION_TYPE_FREETEXT,
        color: style.stroke.to_rgb(),
        font_size: style.font_size * group.transform.scale_y.abs(),
        value,
        page_index: page_index(group.page_number),
        rect: bitmap_rect(group, viewport),
        rotation: bitmap_rotation(group, viewport),
    })
}
