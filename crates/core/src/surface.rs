//! Per-page drawing surfaces

use pdf_annotator_model::{ContainerId, GroupId, PageView, PageViewport, Point};

/// Drawing stage bound to one mounted page
///
/// Holds the viewport the page was rendered with and the z-ordered layer of group
/// IDs drawn on it. The groups themselves are owned by their editors.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    page_number: u32,
    container: ContainerId,
    viewport: PageViewport,
    layer: Vec<GroupId>,
}

impl DrawingSurface {
    pub fn new(page_number: u32, page_view: PageView) -> Self {
        Self {
            page_number,
            container: page_view.container,
            viewport: page_view.viewport,
            layer: Vec::new(),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    /// Apply a CSS-only scale change in place; the layer is kept
    pub fn rescale(&mut self, viewport: PageViewport) {
        self.viewport = viewport;
    }

    /// Stage size in pixels at the current scale
    pub fn stage_size(&self) -> (f64, f64) {
        (self.viewport.width, self.viewport.height)
    }

    /// Convert a container-pixel position into stage units
    pub fn to_stage(&self, point: Point) -> Point {
        self.viewport.to_stage(point)
    }

    /// Group IDs bottom to top
    pub fn layer(&self) -> &[GroupId] {
        &self.layer
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layer.iter().any(|existing| existing == id)
    }

    /// Put a group on top; re-adding an existing ID moves it to the top
    pub fn add_to_layer(&mut self, id: &str) {
        self.remove_from_layer(id);
        self.layer.push(id.to_string());
    }

    pub fn remove_from_layer(&mut self, id: &str) -> bool {
        let before = self.layer.len();
        self.layer.retain(|existing| existing != id);
        self.layer.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> DrawingSurface {
        DrawingSurface::new(1, PageView::new(ContainerId(7), PageViewport::letter(2.0)))
    }

    #[test]
    fn layer_keeps_z_order_and_moves_readded_ids_to_top() {
        let mut surface = surface();
        surface.add_to_layer("a");
        surface.add_to_layer("b");
        surface.add_to_layer("a");
        assert_eq!(surface.layer(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut surface = surface();
        surface.add_to_layer("a");
        assert!(surface.remove_from_layer("a"));
        assert!(!surface.remove_from_layer("a"));
    }

    #[test]
    fn rescale_updates_stage_size() {
        let mut surface = surface();
        assert_eq!(surface.stage_size(), (1224.0, 1584.0));
        surface.rescale(PageViewport::letter(1.0));
        assert_eq!(surface.stage_size(), (612.0, 792.0));
        assert_eq!(surface.to_stage(Point::new(10.0, 10.0)), Point::new(10.0, 10.0));
    }
}
