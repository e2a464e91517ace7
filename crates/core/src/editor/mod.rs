//! Per-kind annotation editors
//!
//! Each editor owns the shape groups of one annotation kind on one page. Editors turn
//! pointer input into shape groups, re-hydrate persisted groups onto a surface, and
//! derive the host annotation-storage payload for their geometry.

mod drag_shape;
mod free_hand;
mod free_text;
mod registry;
mod stamp;
mod text_markup;

pub use drag_shape::{DragShape, DragShapeEditor};
pub use free_hand::FreeHandEditor;
pub use free_text::FreeTextEditor;
pub use registry::{EditorConstructor, EditorRegistry};
pub use stamp::ImageEditor;
pub use text_markup::TextMarkupEditor;

use crate::config::PainterConfig;
use crate::error::AnnotatorResult;
use crate::host::Rasterizer;
use crate::input::PointerEvent;
use crate::store::AnnotationRecord;
use crate::surface::DrawingSurface;
use pdf_annotator_model::{
    AnnotationKind, AnnotationSpec, GroupId, HostPayload, Point, Rect, ShapeGroup, ShapeStyle,
    Transform,
};
use std::collections::HashMap;

/// Shared collaborators handed to editors on every call
#[derive(Clone, Copy)]
pub struct EditorContext<'a> {
    pub config: &'a PainterConfig,
    pub rasterizer: &'a dyn Rasterizer,
}

impl<'a> EditorContext<'a> {
    pub fn new(config: &'a PainterConfig, rasterizer: &'a dyn Rasterizer) -> Self {
        Self { config, rasterizer }
    }
}

/// A shape finalized by user interaction (the editor's `onAdd`)
#[derive(Debug, Clone, PartialEq)]
pub struct AddedAnnotation {
    pub group: ShapeGroup,
    pub payload: HostPayload,
    pub rendered: Option<String>,
    /// The active tool places a single annotation and then deactivates
    pub place_once: bool,
}

/// Host payload recomputed for an existing group
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed {
    pub payload: HostPayload,
    pub rendered: Option<String>,
}

/// State every editor carries: identity, activation, style and owned groups
#[derive(Debug, Clone)]
pub struct EditorBase {
    page_number: u32,
    kind: AnnotationKind,
    active: bool,
    spec: Option<AnnotationSpec>,
    style: ShapeStyle,
    groups: HashMap<GroupId, ShapeGroup>,
}

impl EditorBase {
    pub fn new(page_number: u32, kind: AnnotationKind) -> Self {
        Self {
            page_number,
            kind,
            active: false,
            spec: None,
            style: ShapeStyle::default(),
            groups: HashMap::new(),
        }
    }

    pub fn activate(&mut self, spec: &AnnotationSpec, config: &PainterConfig) {
        self.style = spec.style.clone().unwrap_or_else(|| config.style_for(self.kind));
        self.spec = Some(spec.clone());
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn is_once(&self) -> bool {
        self.spec.as_ref().is_some_and(|spec| spec.is_once)
    }

    /// Start an empty group at a stage position
    pub fn new_group(&self, origin: Point) -> ShapeGroup {
        ShapeGroup::new(
            self.page_number,
            self.kind,
            Transform::translation(origin.x, origin.y),
        )
    }

    /// Take ownership of a group and put it on top of the surface layer
    pub fn insert(&mut self, surface: &mut DrawingSurface, group: ShapeGroup) {
        surface.add_to_layer(&group.id);
        self.groups.insert(group.id.clone(), group);
    }
}

/// Capability set shared by every annotation kind
pub trait Editor {
    fn base(&self) -> &EditorBase;
    fn base_mut(&mut self) -> &mut EditorBase;

    /// Kind-specific host payload for one of this editor's groups
    fn build_payload(
        &self,
        group: &ShapeGroup,
        surface: &DrawingSurface,
        raw: Option<&AnnotationRecord>,
        ctx: &EditorContext<'_>,
    ) -> Option<Refreshed>;

    /// Start accepting input on a surface
    ///
    /// `transfer` carries the chosen image for kinds that accept a transfer payload and
    /// is `None` for every other kind.
    fn activate(
        &mut self,
        _surface: &mut DrawingSurface,
        spec: &AnnotationSpec,
        _transfer: Option<&str>,
        ctx: &EditorContext<'_>,
    ) {
        self.base_mut().activate(spec, ctx.config);
    }

    /// Stop accepting input and drop any in-progress draft
    fn deactivate(&mut self) {
        self.base_mut().deactivate();
    }

    /// Pointer input in container pixels; returns the finalized shape, if any
    fn on_pointer(
        &mut self,
        _surface: &mut DrawingSurface,
        _event: PointerEvent,
        _ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        None
    }

    /// Text typed into a pending free-text box
    fn submit_text(
        &mut self,
        _surface: &mut DrawingSurface,
        _text: &str,
        _ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        None
    }

    /// Selection rectangles (stage units) for text-markup kinds
    fn add_text_rects(
        &mut self,
        _surface: &mut DrawingSurface,
        _rects: &[Rect],
        _ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        None
    }

    fn kind(&self) -> AnnotationKind {
        self.base().kind
    }

    fn page_number(&self) -> u32 {
        self.base().page_number
    }

    fn is_active(&self) -> bool {
        self.base().is_active()
    }

    fn group(&self, id: &str) -> Option<&ShapeGroup> {
        self.base().groups.get(id)
    }

    fn group_mut(&mut self, id: &str) -> Option<&mut ShapeGroup> {
        self.base_mut().groups.get_mut(id)
    }

    /// Re-hydrate persisted geometry onto a surface
    fn add_serialized_group_to_layer(
        &mut self,
        surface: &mut DrawingSurface,
        serialized: &str,
    ) -> AnnotatorResult<GroupId> {
        let group = ShapeGroup::from_serialized(serialized)?;
        let id = group.id.clone();
        self.base_mut().insert(surface, group);
        Ok(id)
    }

    /// Remove a group and its visual; `false` when the editor does not own it
    fn delete_group(&mut self, id: &str, surface: &mut DrawingSurface) -> bool {
        surface.remove_from_layer(id);
        self.base_mut().groups.remove(id).is_some()
    }

    /// Recompute the host payload after an external edit such as a transform
    ///
    /// The serialized snapshot replaces the owned group. Returns `None` when the group
    /// is no longer owned by this editor.
    fn refresh_pdfjs_annotation_storage(
        &mut self,
        surface: &DrawingSurface,
        id: &str,
        serialized: &str,
        raw: Option<&AnnotationRecord>,
        ctx: &EditorContext<'_>,
    ) -> AnnotatorResult<Option<Refreshed>> {
        if !self.base().groups.contains_key(id) {
            return Ok(None);
        }
        let group = ShapeGroup::from_serialized(serialized)?;
        let refreshed = self.build_payload(&group, surface, raw, ctx);
        self.base_mut().groups.insert(id.to_string(), group);
        Ok(refreshed)
    }

    /// Payload for a freshly finalized group, packaged as an `onAdd` result
    fn finish(
        &mut self,
        surface: &mut DrawingSurface,
        group: ShapeGroup,
        ctx: &EditorContext<'_>,
    ) -> Option<AddedAnnotation> {
        let refreshed = self.build_payload(&group, surface, None, ctx)?;
        let place_once = self.base().is_once();
        self.base_mut().insert(surface, group.clone());
        Some(AddedAnnotation {
            group,
            payload: refreshed.payload,
            rendered: refreshed.rendered,
            place_once,
        })
    }
}
