//! Host annotation-storage payloads
//!
//! These mirror the record shapes the host viewer's print/save pipeline reads from its
//! annotation storage. Field names and the numeric `annotationType` tags are part of
//! that contract and must not change.

use serde::{Deserialize, Serialize};

pub const ANNOTATION_TYPE_FREETEXT: u8 = 3;
pub const ANNOTATION_TYPE_HIGHLIGHT: u8 = 9;
pub const ANNOTATION_TYPE_STAMP: u8 = 13;
pub const ANNOTATION_TYPE_INK: u8 = 15;

/// One ink stroke as cubic bezier control points plus the raw points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkPath {
    /// `[x0, y0, c1x, c1y, c2x, c2y, x1, y1, ...]`
    pub bezier: Vec<f64>,
    /// `[x0, y0, x1, y1, ...]`
    pub points: Vec<f64>,
}

impl InkPath {
    /// Build a straight-segment path from PDF-space points
    pub fn from_points(points: &[[f64; 2]]) -> Self {
        let flat = points.iter().flat_map(|p| [p[0], p[1]]).collect();
        let mut bezier = Vec::with_capacity(2 + points.len().saturating_sub(1) * 6);
        if let Some(first) = points.first() {
            bezier.extend_from_slice(first);
        }
        for pair in points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            bezier.extend_from_slice(&[from[0], from[1], to[0], to[1], to[0], to[1]]);
        }
        Self {
            bezier,
            points: flat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkPayload {
    pub annotation_type: u8,
    pub color: [u8; 3],
    pub thickness: f64,
    pub opacity: f64,
    pub paths: Vec<InkPath>,
    pub page_index: u32,
    pub rect: [f64; 4],
    pub rotation: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPayload {
    pub annotation_type: u8,
    pub color: [u8; 3],
    pub opacity: f64,
    pub thickness: f64,
    /// Eight numbers per quad: top-left, top-right, bottom-left, bottom-right
    pub quad_points: Vec<f64>,
    pub outlines: Vec<Vec<f64>>,
    pub page_index: u32,
    pub rect: [f64; 4],
    pub rotation: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampPayload {
    pub annotation_type: u8,
    pub bitmap_id: String,
    /// Data URL of the appearance bitmap
    pub bitmap_url: String,
    pub is_svg: bool,
    pub page_index: u32,
    pub rect: [f64; 4],
    pub rotation: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTextPayload {
    pub annotation_type: u8,
    pub color: [u8; 3],
    pub font_size: f64,
    pub value: String,
    pub page_index: u32,
    pub rect: [f64; 4],
    pub rotation: u16,
}

/// Translated record written into the host annotation storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostPayload {
    Ink(InkPayload),
    Highlight(HighlightPayload),
    Stamp(StampPayload),
    FreeText(FreeTextPayload),
}

impl HostPayload {
    pub fn annotation_type(&self) -> u8 {
        match self {
            HostPayload::Ink(p) => p.annotation_type,
            HostPayload::Highlight(p) => p.annotation_type,
            HostPayload::Stamp(p) => p.annotation_type,
            HostPayload::FreeText(p) => p.annotation_type,
        }
    }

    /// Zero-based page index
    pub fn page_index(&self) -> u32 {
        match self {
            HostPayload::Ink(p) => p.page_index,
            HostPayload::Highlight(p) => p.page_index,
            HostPayload::Stamp(p) => p.page_index,
            HostPayload::FreeText(p) => p.page_index,
        }
    }

    pub fn rect(&self) -> [f64; 4] {
        match self {
            HostPayload::Ink(p) => p.rect,
            HostPayload::Highlight(p) => p.rect,
            HostPayload::Stamp(p) => p.rect,
            HostPayload::FreeText(p) => p.rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_path_emits_one_cubic_per_segment() {
        let path = InkPath::from_points(&[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0]]);
        assert_eq!(path.points.len(), 6);
        assert_eq!(path.bezier.len(), 2 + 2 * 6);
        assert_eq!(&path.bezier[..2], &[0.0, 0.0]);
        assert_eq!(&path.bezier[path.bezier.len() - 2..], &[10.0, 5.0]);
    }

    #[test]
    fn payload_uses_host_field_names() {
        let payload = HostPayload::Stamp(StampPayload {
            annotation_type: ANNOTATION_TYPE_STAMP,
            bitmap_id: "a".into(),
            bitmap_url: "data:image/png;base64,AA==".into(),
            is_svg: false,
            page_index: 0,
            rect: [0.0, 0.0, 1.0, 1.0],
            rotation: 0,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["annotationType"], 13);
        assert_eq!(json["pageIndex"], 0);
        assert!(json.get("bitmapId").is_some());
        assert!(json.get("isSvg").is_some());
    }

    #[test]
    fn untagged_payload_deserializes_to_matching_variant() {
        let json = serde_json::json!({
            "annotationType": 15,
            "color": [255, 0, 0],
            "thickness": 2.0,
            "opacity": 1.0,
            "paths": [],
            "pageIndex": 3,
            "rect": [0.0, 0.0, 1.0, 1.0],
            "rotation": 0
        });
        let payload: HostPayload = serde_json::from_value(json).unwrap();
        assert!(matches!(payload, HostPayload::Ink(_)));
        assert_eq!(payload.page_index(), 3);
    }
}
