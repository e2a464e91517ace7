//! Painter: the orchestrator between the host viewer and the annotation editors
//!
//! The painter owns every piece of mutable session state: page surfaces, the editor
//! registry, the store, the selector and the text-selection bridge. Host events arrive
//! through its methods and are dispatched to whichever editor matches the current
//! annotation kind.
//!
//! Refreshing a host payload after a transform is the one deferred step. Transforms
//! queue a refresh that [`Painter::process_pending_refreshes`] completes later; a
//! refresh whose record or group disappeared in the meantime is dropped.

use crate::config::PainterConfig;
use crate::editor::{AddedAnnotation, Editor, EditorContext, EditorRegistry};
use crate::error::{AnnotatorError, AnnotatorResult};
use crate::host::{NoRasterizer, Rasterizer, ViewerHost};
use crate::input::{Key, PointerEvent};
use crate::selector::{Selector, SelectorEvent};
use crate::store::{AnnotationRecord, AnnotationStore, AnnotationUpdate};
use crate::surface::DrawingSurface;
use crate::web_selection::{TextSelection, WebSelection};
use pdf_annotator_model::{
    AnnotationKind, AnnotationSpec, ContainerId, GroupId, PageView, PainterMode, Transform,
};
use std::collections::{BTreeMap, VecDeque};

/// Body marker present while pointer input goes to the drawing surfaces
pub const PAINTING_MARKER: &str = "annotator-painting";

/// Cursor used while a rubber-stamp image follows the pointer
const RUBBER_STAMP_CURSOR: &str = "none";

/// Current tool and the image handed over with it
#[derive(Debug, Clone)]
pub struct Session {
    spec: Option<AnnotationSpec>,
    transfer: Option<String>,
    mode: PainterMode,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            spec: None,
            transfer: None,
            mode: PainterMode::Default,
        }
    }
}

impl Session {
    pub fn spec(&self) -> Option<&AnnotationSpec> {
        self.spec.as_ref()
    }

    pub fn kind(&self) -> Option<AnnotationKind> {
        self.spec.as_ref().map(|spec| spec.kind)
    }

    pub fn transfer(&self) -> Option<&str> {
        self.transfer.as_deref()
    }

    pub fn mode(&self) -> PainterMode {
        self.mode
    }
}

/// Host payload refresh waiting to complete
#[derive(Debug, Clone, PartialEq)]
struct PendingRefresh {
    id: GroupId,
    serialized: String,
}

pub struct Painter<H: ViewerHost> {
    host: H,
    config: PainterConfig,
    registry: EditorRegistry,
    surfaces: BTreeMap<u32, DrawingSurface>,
    store: AnnotationStore,
    selector: Selector,
    web_selection: WebSelection,
    session: Session,
    pending_refreshes: VecDeque<PendingRefresh>,
    rasterizer: Box<dyn Rasterizer>,
    on_default_mode: Option<Box<dyn FnMut()>>,
}

impl<H: ViewerHost> Painter<H> {
    pub fn new(host: H, config: PainterConfig) -> Self {
        Self {
            host,
            selector: Selector::new(config.handle_size, config.hit_tolerance),
            web_selection: WebSelection::new(config.line_merge_tolerance),
            config,
            registry: EditorRegistry::with_defaults(),
            surfaces: BTreeMap::new(),
            store: AnnotationStore::new(),
            session: Session::default(),
            pending_refreshes: VecDeque::new(),
            rasterizer: Box::new(NoRasterizer),
            on_default_mode: None,
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    pub fn with_registry(mut self, registry: EditorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Callback forcing the surrounding UI back to idle
    pub fn with_default_mode_callback(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_default_mode = Some(Box::new(callback));
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PainterConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> PainterMode {
        self.session.mode
    }

    pub fn surface(&self, page_number: u32) -> Option<&DrawingSurface> {
        self.surfaces.get(&page_number)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn editor_count(&self) -> usize {
        self.registry.editor_count()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selector.selected()
    }

    pub fn web_selection(&self) -> &WebSelection {
        &self.web_selection
    }

    pub fn pending_refresh_count(&self) -> usize {
        self.pending_refreshes.len()
    }

    pub fn find_editor(&self, page_number: u32, kind: AnnotationKind) -> Option<&dyn Editor> {
        self.registry.find(page_number, kind)
    }

    pub fn find_editor_for_group_id(&self, id: &str) -> Option<&dyn Editor> {
        self.registry.find_for_group(id)
    }

    /// Page mount or viewport change
    ///
    /// A CSS-only scale change rescales the existing surface in place. Anything else
    /// reclaims stale surfaces, replaces the page's surface and redraws the page's
    /// stored annotations onto it.
    pub fn init_canvas(
        &mut self,
        page_view: PageView,
        is_css_only_scale_change: bool,
        page_number: u32,
    ) {
        if is_css_only_scale_change {
            if let Some(surface) = self.surfaces.get_mut(&page_number) {
                tracing::debug!(page_number, scale = page_view.viewport.scale, "rescaled surface");
                surface.rescale(page_view.viewport);
                return;
            }
        }

        self.collect_stale_surfaces();
        self.drop_surface(page_number);
        self.surfaces.insert(page_number, DrawingSurface::new(page_number, page_view));
        tracing::debug!(page_number, container = page_view.container.0, "created surface");

        let records: Vec<AnnotationRecord> = self
            .store
            .get_by_page(page_number)
            .into_iter()
            .cloned()
            .collect();
        for record in &records {
            self.rehydrate(record);
        }
        self.enable_painting();
    }

    /// Page unmount
    pub fn destroy_canvas(&mut self, page_number: u32) -> bool {
        let dropped = self.drop_surface(page_number);
        if dropped {
            tracing::debug!(page_number, "destroyed surface");
        }
        dropped
    }

    fn drop_surface(&mut self, page_number: u32) -> bool {
        let existed = self.surfaces.remove(&page_number).is_some();
        self.registry.remove_page(page_number);
        self.selector.forget_page(page_number);
        existed
    }

    fn collect_stale_surfaces(&mut self) {
        let stale: Vec<u32> = self
            .surfaces
            .values()
            .filter(|surface| !self.host.is_attached(surface.container()))
            .map(DrawingSurface::page_number)
            .collect();
        for page_number in stale {
            tracing::debug!(page_number, "reclaiming detached surface");
            self.drop_surface(page_number);
        }
    }

    fn rehydrate(&mut self, record: &AnnotationRecord) {
        let Some(surface) = self.surfaces.get_mut(&record.page_number) else {
            return;
        };
        let Some(editor) = self.registry.get_or_create(record.page_number, record.kind) else {
            return;
        };
        match editor.add_serialized_group_to_layer(surface, &record.serialized) {
            Ok(id) => self.registry.index_group(&id, record.page_number, record.kind),
            Err(err) => {
                tracing::warn!(id = %record.id, error = %err, "failed to redraw stored annotation")
            }
        }
    }

    /// Bind the text-selection bridge to the viewer's text layer root
    pub fn init_web_selection(&mut self, root: ContainerId) {
        self.web_selection.create(root);
        if self.session.mode == PainterMode::Selection {
            self.web_selection.enable();
        }
    }

    /// Switch the current tool
    ///
    /// `None` returns the painter to idle. The transfer payload carries the chosen image
    /// for signature and stamp tools.
    pub fn activate(&mut self, spec: Option<AnnotationSpec>, transfer: Option<String>) {
        self.session.spec = spec;
        self.disable_painting();
        self.session.transfer = transfer;

        let mode = self
            .session
            .kind()
            .map_or(PainterMode::Default, |kind| kind.mode());
        self.set_mode(mode);
        self.enable_painting();
    }

    fn disable_painting(&mut self) {
        self.set_mode(PainterMode::Default);
        self.session.transfer = None;
        self.selector.deactivate_all();
        self.registry.deactivate_all();
    }

    fn set_mode(&mut self, mode: PainterMode) {
        self.session.mode = mode;
        self.host.set_body_class(PAINTING_MARKER, mode == PainterMode::Painting);
        for kind in AnnotationKind::ALL {
            self.host.set_body_class(&kind.css_marker(), false);
        }
        if mode != PainterMode::Default {
            if let Some(kind) = self.session.kind() {
                self.host.set_body_class(&kind.css_marker(), true);
            }
        }
        self.host.set_cursor(None);

        if mode == PainterMode::Selection {
            self.web_selection.enable();
        } else {
            self.web_selection.disable();
        }
    }

    fn enable_painting(&mut self) {
        let Some(spec) = self.session.spec.clone() else {
            return;
        };
        if spec.kind == AnnotationKind::Select {
            for page_number in self.surfaces.keys() {
                self.selector.activate(*page_number);
            }
            return;
        }
        if !self.registry.supports(spec.kind) {
            tracing::warn!(kind = %spec.kind, "no editor registered for annotation kind");
            return;
        }

        let ctx = EditorContext::new(&self.config, self.rasterizer.as_ref());
        let transfer = if spec.kind.accepts_transfer_payload() {
            self.session.transfer.as_deref()
        } else {
            None
        };
        for (page_number, surface) in self.surfaces.iter_mut() {
            if let Some(editor) = self.registry.get_or_create(*page_number, spec.kind) {
                editor.activate(surface, &spec, transfer, &ctx);
            }
        }

        if spec.kind.accepts_transfer_payload() {
            self.host.set_cursor(Some(RUBBER_STAMP_CURSOR));
        }
    }

    fn notify_default_mode(&mut self) {
        if let Some(callback) = self.on_default_mode.as_mut() {
            callback();
        }
    }

    /// Record a freshly finalized shape; handles place-once tools
    fn on_add(&mut self, added: AddedAnnotation) -> GroupId {
        let AddedAnnotation {
            group,
            payload,
            rendered,
            place_once,
        } = added;
        self.registry.index_group(&group.id, group.page_number, group.kind);
        if let Err(err) = self.store.save(&group, payload, rendered) {
            tracing::warn!(id = %group.id, error = %err, "failed to store annotation");
        }
        tracing::debug!(
            id = %group.id,
            kind = %group.kind,
            page = group.page_number,
            "annotation added"
        );

        if place_once {
            self.activate(None, None);
            self.notify_default_mode();
            self.selector.select(&group.id, group.page_number);
        }
        group.id
    }

    /// Pointer input on a page; returns the ID of a newly added annotation
    pub fn handle_pointer(&mut self, page_number: u32, event: PointerEvent) -> Option<GroupId> {
        let Some(surface) = self.surfaces.get_mut(&page_number) else {
            tracing::debug!(page_number, "pointer input for page without surface");
            return None;
        };

        if self.selector.is_active(page_number) {
            let outcome = self.selector.on_pointer(surface, &self.registry, event);
            if let Some(outcome) = outcome {
                self.handle_selector_event(outcome);
            }
            return None;
        }

        let kind = self.session.kind()?;
        let ctx = EditorContext::new(&self.config, self.rasterizer.as_ref());
        let editor = self.registry.find_mut(page_number, kind)?;
        let added = editor.on_pointer(surface, event, &ctx)?;
        Some(self.on_add(added))
    }

    /// Keyboard input
    ///
    /// Escape cancels a rubber-stamp placement; delete gestures remove the selection.
    pub fn handle_key(&mut self, key: &Key) {
        let placing_stamp = self
            .session
            .kind()
            .is_some_and(|kind| kind.accepts_transfer_payload());
        if *key == Key::Escape && placing_stamp {
            self.host.set_cursor(None);
            self.activate(None, None);
            self.notify_default_mode();
            return;
        }
        if let Some(outcome) = self.selector.on_key(key) {
            self.handle_selector_event(outcome);
        }
    }

    /// Completed native text selection; returns the IDs of the markup added
    pub fn handle_text_selection(&mut self, selection: &TextSelection) -> Vec<GroupId> {
        let Some(spec) = self.session.spec.clone().filter(|spec| spec.kind.is_text_markup()) else {
            return Vec::new();
        };

        let ctx = EditorContext::new(&self.config, self.rasterizer.as_ref());
        let mut added = Vec::new();
        for page in self.web_selection.complete(selection) {
            let Some(surface) = self.surfaces.get_mut(&page.page_number) else {
                tracing::debug!(page = page.page_number, "selection on page without surface");
                continue;
            };
            let Some(editor) = self.registry.get_or_create(page.page_number, spec.kind) else {
                continue;
            };
            if !editor.is_active() {
                editor.activate(surface, &spec, None, &ctx);
            }
            let factor = 1.0 / surface.scale();
            let rects: Vec<_> = page.rects.iter().map(|rect| rect.scale(factor)).collect();
            added.extend(editor.add_text_rects(surface, &rects, &ctx));
        }

        added.into_iter().map(|annotation| self.on_add(annotation)).collect()
    }

    /// Commit the text of a pending free-text box
    pub fn submit_free_text(&mut self, page_number: u32, text: &str) -> Option<GroupId> {
        let surface = self.surfaces.get_mut(&page_number)?;
        let ctx = EditorContext::new(&self.config, self.rasterizer.as_ref());
        let editor = self.registry.find_mut(page_number, AnnotationKind::FreeText)?;
        let added = editor.submit_text(surface, text, &ctx)?;
        Some(self.on_add(added))
    }

    /// Apply a transform to the selected group
    pub fn transform_selected(&mut self, transform: Transform) -> bool {
        match self.selector.transform(transform) {
            Some(outcome) => {
                self.handle_selector_event(outcome);
                true
            }
            None => false,
        }
    }

    fn handle_selector_event(&mut self, outcome: SelectorEvent) {
        match outcome {
            SelectorEvent::Selected(id) => tracing::debug!(%id, "selected"),
            SelectorEvent::Cleared => tracing::debug!("selection cleared"),
            SelectorEvent::TransformEnd { id, transform } => self.apply_transform(&id, transform),
            SelectorEvent::Delete(id) => {
                self.delete_annotation(&id);
            }
        }
    }

    /// Move the visual immediately and queue the payload refresh
    fn apply_transform(&mut self, id: &str, transform: Transform) {
        let group = self
            .registry
            .find_for_group_mut(id)
            .and_then(|editor| editor.group_mut(id));
        let Some(group) = group else {
            tracing::debug!(id, "transform for unknown group ignored");
            return;
        };
        group.transform = transform;
        match group.to_serialized() {
            Ok(serialized) => self.pending_refreshes.push_back(PendingRefresh {
                id: id.to_string(),
                serialized,
            }),
            Err(err) => tracing::warn!(id, error = %err, "failed to serialize transformed group"),
        }
    }

    /// Complete queued payload refreshes; returns how many updated the store
    pub fn process_pending_refreshes(&mut self) -> usize {
        let mut updated = 0;
        while let Some(refresh) = self.pending_refreshes.pop_front() {
            if self.complete_refresh(&refresh) {
                updated += 1;
            }
        }
        updated
    }

    fn complete_refresh(&mut self, refresh: &PendingRefresh) -> bool {
        let Some(raw) = self.store.annotation(&refresh.id).cloned() else {
            tracing::debug!(id = %refresh.id, "refresh for deleted annotation dropped");
            return false;
        };
        let Some((page_number, _)) = self.registry.owner_of(&refresh.id) else {
            return false;
        };
        let Some(surface) = self.surfaces.get(&page_number) else {
            return false;
        };
        let Some(editor) = self.registry.find_for_group_mut(&refresh.id) else {
            return false;
        };

        let ctx = EditorContext::new(&self.config, self.rasterizer.as_ref());
        let refreshed = editor.refresh_pdfjs_annotation_storage(
            surface,
            &refresh.id,
            &refresh.serialized,
            Some(&raw),
            &ctx,
        );
        match refreshed {
            Ok(Some(refreshed)) => self.store.update(
                &refresh.id,
                AnnotationUpdate {
                    serialized: Some(refresh.serialized.clone()),
                    payload: Some(refreshed.payload),
                    rendered: refreshed.rendered,
                },
            ),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(
                    id = %refresh.id,
                    error = %err,
                    "failed to refresh annotation payload"
                );
                false
            }
        }
    }

    /// Remove an annotation's record and its visual; repeated calls are no-ops
    pub fn delete_annotation(&mut self, id: &str) -> bool {
        let had_record = self.store.delete(id).is_some();
        let mut had_group = false;
        if let Some((page_number, kind)) = self.registry.unindex_group(id) {
            let editor = self.registry.find_mut(page_number, kind);
            let surface = self.surfaces.get_mut(&page_number);
            if let (Some(editor), Some(surface)) = (editor, surface) {
                had_group = editor.delete_group(id, surface);
            }
        }
        self.selector.forget(id);
        if had_record || had_group {
            tracing::debug!(id, "annotation deleted");
        }
        had_record || had_group
    }

    /// Flush translated records into the host's annotation storage
    pub fn reset_pdfjs_annotation_storage(&mut self) {
        self.store.reset_annotation_storage(&mut self.host);
    }

    /// Load previously exported records and draw those whose page is mounted
    ///
    /// # Errors
    /// Returns an error for a record whose kind has no registered editor; records before
    /// it stay imported.
    pub fn import_records(&mut self, records: Vec<AnnotationRecord>) -> AnnotatorResult<usize> {
        let mut imported = 0;
        for record in records {
            if !self.registry.supports(record.kind) {
                return Err(AnnotatorError::UnknownKind(record.kind));
            }
            if self.surfaces.contains_key(&record.page_number) {
                self.rehydrate(&record);
            }
            self.store.restore(record);
            imported += 1;
        }
        Ok(imported)
    }
}
