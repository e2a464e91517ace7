//! Host viewer and drawing engine boundaries
//!
//! The painter never talks to the viewer directly; everything it needs from the page
//! DOM, the document body and the host's annotation storage goes through
//! [`ViewerHost`]. [`MemoryHost`] keeps all of it in memory for tests and the CLI.

use pdf_annotator_model::{ContainerId, HostPayload, ShapeGroup};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// The host viewer's native annotation storage
pub trait AnnotationStorageSink {
    fn storage_set_value(&mut self, key: &str, value: &HostPayload);
    fn storage_remove(&mut self, key: &str);
}

/// Everything the painter consumes from the host viewer
pub trait ViewerHost: AnnotationStorageSink {
    /// Whether a page container is still part of the document
    fn is_attached(&self, container: ContainerId) -> bool;

    /// Toggle a CSS class on the document body
    fn set_body_class(&mut self, class: &str, enabled: bool);

    /// Set or clear the custom cursor property
    fn set_cursor(&mut self, cursor: Option<&str>);
}

/// Raster output of the drawing engine
///
/// The host format cannot embed native text glyphs, so text-bearing groups are
/// rendered to a bitmap before export.
pub trait Rasterizer {
    /// Render a group to a PNG data URL, `None` when rendering is unavailable
    ///
    /// The bitmap covers the scaled group without its rotation; the payload carries the
    /// rotation.
    fn rasterize(&self, group: &ShapeGroup) -> Option<String>;
}

/// Rasterizer used when no drawing engine is wired in
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRasterizer;

impl Rasterizer for NoRasterizer {
    fn rasterize(&self, _group: &ShapeGroup) -> Option<String> {
        None
    }
}

/// In-memory host: attached containers, body classes, cursor and storage
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    attached: HashSet<ContainerId>,
    body_classes: BTreeSet<String>,
    cursor: Option<String>,
    storage: BTreeMap<String, HostPayload>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, container: ContainerId) {
        self.attached.insert(container);
    }

    pub fn detach(&mut self, container: ContainerId) {
        self.attached.remove(&container);
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    pub fn body_classes(&self) -> impl Iterator<Item = &str> {
        self.body_classes.iter().map(String::as_str)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn storage(&self) -> &BTreeMap<String, HostPayload> {
        &self.storage
    }
}

impl AnnotationStorageSink for MemoryHost {
    fn storage_set_value(&mut self, key: &str, value: &HostPayload) {
        self.storage.insert(key.to_string(), value.clone());
    }

    fn storage_remove(&mut self, key: &str) {
        self.storage.remove(key);
    }
}

impl ViewerHost for MemoryHost {
    fn is_attached(&self, container: ContainerId) -> bool {
        self.attached.contains(&container)
    }

    fn set_body_class(&mut self, class: &str, enabled: bool) {
        if enabled {
            self.body_classes.insert(class.to_string());
        } else {
            self.body_classes.remove(class);
        }
    }

    fn set_cursor(&mut self, cursor: Option<&str>) {
        self.cursor = cursor.map(str::to_string);
    }
}

/// Rasterizer that tags each group with a fake PNG data URL, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FakeRasterizer;

#[cfg(test)]
impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, group: &ShapeGroup) -> Option<String> {
        Some(format!("data:image/png;base64,{}", group.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_host_tracks_body_classes() {
        let mut host = MemoryHost::new();
        host.set_body_class("a", true);
        host.set_body_class("b", true);
        host.set_body_class("a", false);
        assert_eq!(host.body_classes().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn detached_containers_are_reported() {
        let mut host = MemoryHost::new();
        host.attach(ContainerId(1));
        assert!(host.is_attached(ContainerId(1)));
        host.detach(ContainerId(1));
        assert!(!host.is_attached(ContainerId(1)));
    }
}
