//! PDF Annotator Core Library
//!
//! Annotation editing and synchronization layer for a PDF viewer: per-page drawing
//! surfaces, per-kind editors, the annotation store and its translation into the host
//! viewer's annotation storage.

pub mod config;
pub mod editor;
pub mod error;
pub mod host;
pub mod input;
pub mod manipulation;
pub mod painter;
pub mod selector;
pub mod store;
pub mod surface;
pub mod translate;
pub mod web_selection;

pub use config::PainterConfig;
pub use editor::{
    AddedAnnotation, DragShape, DragShapeEditor, Editor, EditorBase, EditorConstructor,
    EditorContext, EditorRegistry, FreeHandEditor, FreeTextEditor, ImageEditor, Refreshed,
    TextMarkupEditor,
};
pub use error::{AnnotatorError, AnnotatorResult};
pub use host::{AnnotationStorageSink, MemoryHost, NoRasterizer, Rasterizer, ViewerHost};
pub use input::{Key, PointerEvent, PointerPhase};
pub use manipulation::{generate_handles, HandleType, ManipulationHandle, ManipulationState};
pub use painter::{Painter, Session, PAINTING_MARKER};
pub use selector::{Selector, SelectorEvent};
pub use store::{AnnotationRecord, AnnotationStore, AnnotationUpdate};
pub use surface::DrawingSurface;
pub use web_selection::{PageSelection, SelectionRange, TextSelection, WebSelection};
