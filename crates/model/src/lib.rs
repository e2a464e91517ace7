//! PDF annotator data model
//!
//! Plain data shared by the annotation core and its hosts: kinds, geometry, the
//! shape-group scene graph, page viewports and the host annotation-storage payloads.

pub mod data_url;
pub mod geometry;
pub mod kind;
pub mod payload;
pub mod scene;
pub mod viewport;

pub use data_url::DataUrl;
pub use geometry::{Color, Point, Rect, Transform};
pub use kind::{AnnotationKind, AnnotationSpec, PainterMode, ShapeStyle};
pub use payload::{
    FreeTextPayload, HighlightPayload, HostPayload, InkPath, InkPayload, StampPayload,
};
pub use scene::{GroupId, Shape, ShapeGeometry, ShapeGroup};
pub use viewport::{ContainerId, PageView, PageViewport};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unknown annotation kind: {0}")]
    UnknownKind(String),
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
