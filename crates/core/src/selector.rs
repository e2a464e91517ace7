//! Selection, moving, resizing, and rotating of existing shape groups
//!
//! The selector works on any group regardless of kind. It never mutates groups itself:
//! finished transforms are reported back so the painter can refresh the owning editor
//! and the store.

use crate::editor::EditorRegistry;
use crate::input::{Key, PointerEvent, PointerPhase};
use crate::manipulation::{generate_handles, HandleType, ManipulationState};
use crate::surface::DrawingSurface;
use pdf_annotator_model::{GroupId, Point, ShapeGroup, Transform};
use std::collections::BTreeSet;

/// Outcome of selector input
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    Selected(GroupId),
    Cleared,
    /// A drag finished with a new group transform
    TransformEnd { id: GroupId, transform: Transform },
    /// The user asked to delete the selected group
    Delete(GroupId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    id: GroupId,
    page_number: u32,
}

#[derive(Debug, Clone)]
pub struct Selector {
    pages: BTreeSet<u32>,
    selection: Option<Selection>,
    manipulation: Option<ManipulationState>,
    handle_size: f64,
    hit_tolerance: f64,
}

fn lookup<'a>(registry: &'a EditorRegistry, id: &str) -> Option<&'a ShapeGroup> {
    registry.find_for_group(id)?.group(id)
}

impl Selector {
    pub fn new(handle_size: f64, hit_tolerance: f64) -> Self {
        Self {
            pages: BTreeSet::new(),
            selection: None,
            manipulation: None,
            handle_size,
            hit_tolerance,
        }
    }

    /// Enter selection mode on a page
    pub fn activate(&mut self, page_number: u32) {
        self.pages.insert(page_number);
    }

    pub fn is_active(&self, page_number: u32) -> bool {
        self.pages.contains(&page_number)
    }

    /// Leave selection mode everywhere and drop the selection
    pub fn deactivate_all(&mut self) {
        self.pages.clear();
        self.clear();
    }

    pub fn select(&mut self, id: &str, page_number: u32) {
        self.manipulation = None;
        self.selection = Some(Selection {
            id: id.to_string(),
            page_number,
        });
    }

    pub fn clear(&mut self) {
        self.manipulation = None;
        self.selection = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.as_ref().map(|selection| selection.id.as_str())
    }

    pub fn selected_page(&self) -> Option<u32> {
        self.selection.as_ref().map(|selection| selection.page_number)
    }

    /// Forget a group that was removed elsewhere
    pub fn forget(&mut self, id: &str) {
        if self.selected() == Some(id) {
            self.clear();
        }
    }

    /// Drop the selection when its page goes away
    pub fn forget_page(&mut self, page_number: u32) {
        self.pages.remove(&page_number);
        if self.selected_page() == Some(page_number) {
            self.clear();
        }
    }

    fn pick<'a>(
        &self,
        surface: &DrawingSurface,
        registry: &'a EditorRegistry,
        point: &Point,
    ) -> Option<&'a ShapeGroup> {
        surface
            .layer()
            .iter()
            .rev()
            .filter_map(|id| lookup(registry, id))
            .find(|group| group.hit_test(point, self.hit_tolerance))
    }

    fn begin(
        &mut self,
        surface: &DrawingSurface,
        registry: &EditorRegistry,
        point: Point,
    ) -> Option<SelectorEvent> {
        let selected = self
            .selection
            .as_ref()
            .filter(|selection| selection.page_number == surface.page_number())
            .and_then(|selection| lookup(registry, &selection.id));

        if let Some(group) = selected {
            let handle = generate_handles(group, self.handle_size)
                .into_iter()
                .find(|handle| handle.hit_test(&point, self.hit_tolerance));
            if let Some(handle) = handle {
                self.manipulation =
                    Some(ManipulationState::new(group, handle.handle_type, point));
                return None;
            }
        }

        match self.pick(surface, registry, &point) {
            Some(group) => {
                let id = group.id.clone();
                let unchanged = self.selected() == Some(id.as_str());
                self.selection = Some(Selection {
                    id: id.clone(),
                    page_number: surface.page_number(),
                });
                self.manipulation = Some(ManipulationState::new(group, HandleType::Move, point));
                (!unchanged).then_some(SelectorEvent::Selected(id))
            }
            None if self.selection.is_some() => {
                self.clear();
                Some(SelectorEvent::Cleared)
            }
            None => None,
        }
    }

    /// Pointer input on an active page
    pub fn on_pointer(
        &mut self,
        surface: &DrawingSurface,
        registry: &EditorRegistry,
        event: PointerEvent,
    ) -> Option<SelectorEvent> {
        if !self.is_active(surface.page_number()) {
            return None;
        }
        let point = surface.to_stage(event.position);

        match event.phase {
            PointerPhase::Down => self.begin(surface, registry, point),
            PointerPhase::Move => {
                if let Some(state) = self.manipulation.as_mut() {
                    state.update_position(point);
                }
                None
            }
            PointerPhase::Up => {
                let mut state = self.manipulation.take()?;
                state.update_position(point);
                state.has_moved().then(|| SelectorEvent::TransformEnd {
                    id: state.group_id.clone(),
                    transform: state.calculate_transform(),
                })
            }
        }
    }

    /// Programmatic transform of the selected group
    pub fn transform(&mut self, transform: Transform) -> Option<SelectorEvent> {
        self.manipulation = None;
        let id = self.selected()?.to_string();
        Some(SelectorEvent::TransformEnd { id, transform })
    }

    /// Delete gesture on the selected group
    pub fn on_key(&mut self, key: &Key) -> Option<SelectorEvent> {
        if !key.is_delete_gesture() {
            return None;
        }
        let selection = self.selection.take()?;
        self.manipulation = None;
        Some(SelectorEvent::Delete(selection.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PainterConfig;
    use crate::editor::test_support::{ctx, drag, surface};
    use crate::editor::Editor;
    use pdf_annotator_model::{AnnotationKind, AnnotationSpec};

    /// Two overlapping rectangles on page 1: (10,10)-(100,60) below (50,30)-(150,90)
    fn scene() -> (DrawingSurface, EditorRegistry, GroupId, GroupId) {
        let config = PainterConfig::default();
        let ctx = ctx(&config);
        let mut surface = surface(1.0);
        let mut registry = EditorRegistry::with_defaults();
        let kind = AnnotationKind::Rectangle;
        let editor: &mut dyn Editor = registry.get_or_create(1, kind).unwrap().as_mut();
        editor.activate(&mut surface, &AnnotationSpec::new(kind), None, &ctx);
        let lower = drag(editor, &mut surface, &ctx, (10.0, 10.0), (100.0, 60.0))
            .unwrap()
            .group
            .id;
        let upper = drag(editor, &mut surface, &ctx, (50.0, 30.0), (150.0, 90.0))
            .unwrap()
            .group
            .id;
        registry.index_group(&lower, 1, AnnotationKind::Rectangle);
        registry.index_group(&upper, 1, AnnotationKind::Rectangle);
        (surface, registry, lower, upper)
    }

    fn selector() -> Selector {
        let mut selector = Selector::new(5.0, 2.0);
        selector.activate(1);
        selector
    }

    #[test]
    fn click_picks_topmost_group() {
        let (surface, registry, lower, upper) = scene();
        let mut selector = selector();

        let event = selector.on_pointer(&surface, &registry, PointerEvent::down(60.0, 40.0));
        assert_eq!(event, Some(SelectorEvent::Selected(upper.clone())));
        let release = selector.on_pointer(&surface, &registry, PointerEvent::up(60.0, 40.0));
        assert!(release.is_none());

        selector.on_pointer(&surface, &registry, PointerEvent::down(20.0, 20.0));
        assert_eq!(selector.selected(), Some(lower.as_str()));
    }

    #[test]
    fn drag_reports_move_transform() {
        let (surface, registry, lower, _) = scene();
        let mut selector = selector();

        selector.on_pointer(&surface, &registry, PointerEvent::down(20.0, 20.0));
        selector.on_pointer(&surface, &registry, PointerEvent::moved(25.0, 30.0));
        let event = selector.on_pointer(&surface, &registry, PointerEvent::up(30.0, 40.0));

        let Some(SelectorEvent::TransformEnd { id, transform }) = event else {
            panic!("expected transform end");
        };
        assert_eq!(id, lower);
        assert_eq!((transform.x, transform.y), (20.0, 30.0));
    }

    #[test]
    fn corner_handle_resizes_selected_group() {
        let (surface, registry, lower, _) = scene();
        let mut selector = selector();
        selector.select(&lower, 1);

        selector.on_pointer(&surface, &registry, PointerEvent::down(10.0, 10.0));
        let event = selector.on_pointer(&surface, &registry, PointerEvent::up(0.0, 0.0));
        let Some(SelectorEvent::TransformEnd { transform, .. }) = event else {
            panic!("expected transform end");
        };
        let mut group = lookup(&registry, &lower).unwrap().clone();
        group.transform = transform;
        let rect = group.client_rect().unwrap();
        let expected = [
            (rect.x, 0.0),
            (rect.y, 0.0),
            (rect.width, 100.0),
            (rect.height, 60.0),
        ];
        for (actual, expected) in expected {
            assert!((actual - expected).abs() < 1e-9, "{rect:?}");
        }
    }

    #[test]
    fn empty_click_clears_and_inactive_page_is_ignored() {
        let (surface, registry, lower, _) = scene();
        let mut selector = selector();
        selector.select(&lower, 1);

        let event = selector.on_pointer(&surface, &registry, PointerEvent::down(400.0, 400.0));
        assert_eq!(event, Some(SelectorEvent::Cleared));
        assert!(selector.selected().is_none());

        selector.deactivate_all();
        let event = selector.on_pointer(&surface, &registry, PointerEvent::down(20.0, 20.0));
        assert!(event.is_none());
    }

    #[test]
    fn delete_key_reports_selected_group() {
        let mut selector = selector();
        assert!(selector.on_key(&Key::Delete).is_none());

        selector.select("abc", 1);
        assert!(selector.on_key(&Key::Escape).is_none());
        assert_eq!(
            selector.on_key(&Key::Backspace),
            Some(SelectorEvent::Delete("abc".to_string()))
        );
        assert!(selector.selected().is_none());
    }
}
