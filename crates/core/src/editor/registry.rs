//! Editor construction and lookup
//!
//! Editors are created lazily, one per `(page, kind)` pair. A reverse index from group
//! ID to owning editor keeps deletion and refresh lookups cheap.

use super::{
    DragShapeEditor, Editor, FreeHandEditor, FreeTextEditor, ImageEditor, TextMarkupEditor,
};
use pdf_annotator_model::{AnnotationKind, GroupId};
use std::collections::HashMap;

/// Builds the editor for one kind on one page
pub type EditorConstructor = fn(u32, AnnotationKind) -> Box<dyn Editor>;

fn drag_shape(page_number: u32, kind: AnnotationKind) -> Box<dyn Editor> {
    Box::new(DragShapeEditor::new(page_number, kind))
}

fn free_hand(page_number: u32, kind: AnnotationKind) -> Box<dyn Editor> {
    Box::new(FreeHandEditor::new(page_number, kind))
}

fn free_text(page_number: u32, kind: AnnotationKind) -> Box<dyn Editor> {
    Box::new(FreeTextEditor::new(page_number, kind))
}

fn text_markup(page_number: u32, kind: AnnotationKind) -> Box<dyn Editor> {
    Box::new(TextMarkupEditor::new(page_number, kind))
}

fn stamp(page_number: u32, kind: AnnotationKind) -> Box<dyn Editor> {
    Box::new(ImageEditor::new(page_number, kind))
}

type EditorKey = (u32, AnnotationKind);

pub struct EditorRegistry {
    constructors: HashMap<AnnotationKind, EditorConstructor>,
    editors: HashMap<EditorKey, Box<dyn Editor>>,
    owners: HashMap<GroupId, EditorKey>,
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for EditorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .field("editors", &self.editors.keys().collect::<Vec<_>>())
            .field("groups", &self.owners.len())
            .finish()
    }
}

impl EditorRegistry {
    /// Registry without any constructors
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
            editors: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Registry covering every kind that has an editor
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(AnnotationKind::Rectangle, drag_shape);
        registry.register(AnnotationKind::Ellipse, drag_shape);
        registry.register(AnnotationKind::FreeHand, free_hand);
        registry.register(AnnotationKind::FreeHighlight, free_hand);
        registry.register(AnnotationKind::FreeText, free_text);
        registry.register(AnnotationKind::Highlight, text_markup);
        registry.register(AnnotationKind::Strikeout, text_markup);
        registry.register(AnnotationKind::Underline, text_markup);
        registry.register(AnnotationKind::Signature, stamp);
        registry.register(AnnotationKind::Stamp, stamp);
        registry
    }

    pub fn register(&mut self, kind: AnnotationKind, constructor: EditorConstructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Stop constructing editors for a kind; existing editors stay alive
    pub fn unregister(&mut self, kind: AnnotationKind) -> bool {
        self.constructors.remove(&kind).is_some()
    }

    pub fn supports(&self, kind: AnnotationKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn find(&self, page_number: u32, kind: AnnotationKind) -> Option<&dyn Editor> {
        self.editors
            .get(&(page_number, kind))
            .map(|editor| editor.as_ref())
    }

    pub fn find_mut(
        &mut self,
        page_number: u32,
        kind: AnnotationKind,
    ) -> Option<&mut Box<dyn Editor>> {
        self.editors.get_mut(&(page_number, kind))
    }

    /// Existing editor for the pair, or a new one from the registered constructor
    ///
    /// Returns `None` (and logs) for kinds without a constructor.
    pub fn get_or_create(
        &mut self,
        page_number: u32,
        kind: AnnotationKind,
    ) -> Option<&mut Box<dyn Editor>> {
        let Some(constructor) = self.constructors.get(&kind).copied() else {
            tracing::warn!(%kind, page_number, "no editor registered for annotation kind");
            return None;
        };
        let editor = self.editors.entry((page_number, kind)).or_insert_with(|| {
            tracing::debug!(%kind, page_number, "created editor");
            constructor(page_number, kind)
        });
        Some(editor)
    }

    /// Page and kind of the editor owning a group
    pub fn owner_of(&self, id: &str) -> Option<(u32, AnnotationKind)> {
        self.owners.get(id).copied()
    }

    pub fn find_for_group(&self, id: &str) -> Option<&dyn Editor> {
        let (page_number, kind) = self.owner_of(id)?;
        self.find(page_number, kind)
    }

    pub fn find_for_group_mut(&mut self, id: &str) -> Option<&mut Box<dyn Editor>> {
        let (page_number, kind) = self.owner_of(id)?;
        self.find_mut(page_number, kind)
    }

    pub fn index_group(&mut self, id: &str, page_number: u32, kind: AnnotationKind) {
        self.owners.insert(id.to_string(), (page_number, kind));
    }

    pub fn unindex_group(&mut self, id: &str) -> Option<(u32, AnnotationKind)> {
        self.owners.remove(id)
    }

    /// Drop every editor of a page together with its group index entries
    pub fn remove_page(&mut self, page_number: u32) -> usize {
        let before = self.editors.len();
        self.editors.retain(|(page, _), _| *page != page_number);
        self.owners.retain(|_, (page, _)| *page != page_number);
        before - self.editors.len()
    }

    pub fn deactivate_all(&mut self) {
        for editor in self.editors.values_mut() {
            editor.deactivate();
        }
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_drawable_kind_has_a_constructor() {
        let registry = EditorRegistry::with_defaults();
        for kind in AnnotationKind::ALL {
            assert_eq!(registry.supports(kind), kind.has_editor(), "{kind}");
        }
    }

    #[test]
    fn editors_are_reused_per_page_and_kind() {
        let mut registry = EditorRegistry::with_defaults();
        let kind = AnnotationKind::Rectangle;
        registry.get_or_create(1, kind).unwrap();
        registry.get_or_create(1, kind).unwrap();
        registry.get_or_create(2, kind).unwrap();
        assert_eq!(registry.editor_count(), 2);
        let editor = registry.find(2, AnnotationKind::Rectangle);
        assert_eq!(editor.map(|e| e.page_number()), Some(2));
    }

    #[test]
    fn unknown_kind_creates_nothing() {
        let mut registry = EditorRegistry::with_defaults();
        assert!(registry.get_or_create(1, AnnotationKind::Select).is_none());

        registry.unregister(AnnotationKind::Stamp);
        assert!(registry.get_or_create(1, AnnotationKind::Stamp).is_none());
        assert_eq!(registry.editor_count(), 0);
    }

    #[test]
    fn removing_a_page_drops_editors_and_index() {
        let mut registry = EditorRegistry::with_defaults();
        registry.get_or_create(1, AnnotationKind::Ellipse).unwrap();
        registry.get_or_create(3, AnnotationKind::Ellipse).unwrap();
        registry.index_group("a", 1, AnnotationKind::Ellipse);
        registry.index_group("b", 3, AnnotationKind::Ellipse);

        assert_eq!(registry.remove_page(1), 1);
        assert!(registry.find_for_group("a").is_none());
        assert_eq!(registry.owner_of("b"), Some((3, AnnotationKind::Ellipse)));
        assert!(registry.find_for_group("b").is_some());
    }
}
