//! Bridge from native text selection to text-markup geometry
//!
//! The host reports a finished selection as client rectangles per page, one per text
//! run. Runs on the same line are merged so each line yields a single markup box.

use pdf_annotator_model::{ContainerId, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rectangles of a selected range on one page, in container pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub page_number: u32,
    pub rects: Vec<Rect>,
}

/// A completed native text selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSelection {
    pub ranges: Vec<SelectionRange>,
}

/// Merged line rectangles of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSelection {
    pub page_number: u32,
    pub rects: Vec<Rect>,
}

#[derive(Debug, Clone)]
pub struct WebSelection {
    root: Option<ContainerId>,
    enabled: bool,
    line_tolerance: f64,
}

impl WebSelection {
    pub fn new(line_tolerance: f64) -> Self {
        Self {
            root: None,
            enabled: false,
            line_tolerance,
        }
    }

    /// Attach selection capture to the viewer's text layer root
    pub fn create(&mut self, root: ContainerId) {
        tracing::debug!(root = root.0, "text selection bridge attached");
        self.root = Some(root);
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn a completed selection into per-page line rectangles
    ///
    /// Yields nothing while the bridge is detached or disabled.
    pub fn complete(&self, selection: &TextSelection) -> Vec<PageSelection> {
        if self.root.is_none() || !self.enabled {
            tracing::debug!("selection ignored, bridge inactive");
            return Vec::new();
        }

        let mut pages: BTreeMap<u32, Vec<Rect>> = BTreeMap::new();
        for range in &selection.ranges {
            pages
                .entry(range.page_number)
                .or_default()
                .extend(range.rects.iter().copied().filter(|rect| !rect.is_empty()));
        }

        pages
            .into_iter()
            .filter(|(_, rects)| !rects.is_empty())
            .map(|(page_number, rects)| PageSelection {
                page_number,
                rects: merge_lines(rects, self.line_tolerance),
            })
            .collect()
    }
}

fn same_line(a: &Rect, b: &Rect, tolerance: f64) -> bool {
    (a.y - b.y).abs() <= tolerance && (a.bottom() - b.bottom()).abs() <= tolerance
}

/// Merge runs sharing a line, top to bottom then left to right
fn merge_lines(mut rects: Vec<Rect>, tolerance: f64) -> Vec<Rect> {
    rects.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Rect> = Vec::new();
    for rect in rects {
        let merged = lines
            .iter_mut()
            .find(|line| same_line(line, &rect, tolerance));
        match merged {
            Some(line) => *line = line.union(&rect),
            None => lines.push(rect),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> WebSelection {
        let mut bridge = WebSelection::new(2.0);
        bridge.create(ContainerId(1));
        bridge.enable();
        bridge
    }

    fn range(page_number: u32, rects: Vec<Rect>) -> SelectionRange {
        SelectionRange { page_number, rects }
    }

    #[test]
    fn runs_on_one_line_are_merged() {
        let selection = TextSelection {
            ranges: vec![SelectionRange {
                page_number: 2,
                rects: vec![
                    Rect::new(60.0, 100.5, 40.0, 12.0),
                    Rect::new(10.0, 100.0, 45.0, 12.0),
                    Rect::new(10.0, 120.0, 80.0, 12.0),
                    Rect::new(30.0, 140.0, 0.0, 12.0),
                ],
            }],
        };

        let pages = bridge().complete(&selection);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 2);
        assert_eq!(
            pages[0].rects,
            vec![
                Rect::new(10.0, 100.0, 90.0, 12.5),
                Rect::new(10.0, 120.0, 80.0, 12.0),
            ]
        );
    }

    #[test]
    fn selection_spanning_pages_is_split() {
        let selection = TextSelection {
            ranges: vec![
                range(3, vec![Rect::new(0.0, 0.0, 10.0, 10.0)]),
                range(1, vec![Rect::new(0.0, 700.0, 10.0, 10.0)]),
                range(2, Vec::new()),
            ],
        };
        let pages: Vec<u32> = bridge()
            .complete(&selection)
            .iter()
            .map(|page| page.page_number)
            .collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn disabled_bridge_yields_nothing() {
        let selection = TextSelection {
            ranges: vec![range(1, vec![Rect::new(0.0, 0.0, 10.0, 10.0)])],
        };
        let mut bridge = bridge();
        bridge.disable();
        assert!(!bridge.is_enabled());
        assert!(bridge.complete(&selection).is_empty());

        let unattached = WebSelection::new(2.0);
        assert!(unattached.complete(&selection).is_empty());
    }
}
