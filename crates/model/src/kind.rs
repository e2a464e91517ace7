//! Annotation kinds and the tool specification handed in by the toolbar.

use crate::geometry::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interaction mode the viewer body is switched into while a kind is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainterMode {
    /// Nothing active, the viewer behaves normally.
    Default,
    /// Native text selection is captured and turned into markup.
    Selection,
    /// Pointer input goes to the drawing surface.
    Painting,
}

/// Annotation type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Select,
    Highlight,
    Strikeout,
    Underline,
    FreeText,
    Rectangle,
    Ellipse,
    FreeHand,
    FreeHighlight,
    Signature,
    Stamp,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 11] = [
        AnnotationKind::Select,
        AnnotationKind::Highlight,
        AnnotationKind::Strikeout,
        AnnotationKind::Underline,
        AnnotationKind::FreeText,
        AnnotationKind::Rectangle,
        AnnotationKind::Ellipse,
        AnnotationKind::FreeHand,
        AnnotationKind::FreeHighlight,
        AnnotationKind::Signature,
        AnnotationKind::Stamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Select => "select",
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Strikeout => "strikeout",
            AnnotationKind::Underline => "underline",
            AnnotationKind::FreeText => "free_text",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Ellipse => "ellipse",
            AnnotationKind::FreeHand => "free_hand",
            AnnotationKind::FreeHighlight => "free_highlight",
            AnnotationKind::Signature => "signature",
            AnnotationKind::Stamp => "stamp",
        }
    }

    /// Mode the painter switches into when this kind becomes current.
    pub fn mode(&self) -> PainterMode {
        if self.is_text_markup() {
            PainterMode::Selection
        } else {
            PainterMode::Painting
        }
    }

    /// Highlight family driven by native text selection.
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight | AnnotationKind::Strikeout | AnnotationKind::Underline
        )
    }

    /// Rubber-stamp kinds: an image follows the cursor until placed or cancelled.
    pub fn accepts_transfer_payload(&self) -> bool {
        matches!(self, AnnotationKind::Signature | AnnotationKind::Stamp)
    }

    /// Whether shapes of this kind are owned by a per-page editor.
    ///
    /// `Select` is served by the selector and never gets an editor.
    pub fn has_editor(&self) -> bool {
        !matches!(self, AnnotationKind::Select)
    }

    /// Body-level CSS marker applied while the kind is current.
    pub fn css_marker(&self) -> String {
        format!("annotator-kind-{}", self.as_str().replace('_', "-"))
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationKind {
    type Err = crate::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        AnnotationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| crate::ModelError::UnknownKind(s.to_string()))
    }
}

/// Stroke and fill styling carried by a tool and copied onto the shapes it draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub stroke: Color,
    pub stroke_width: f64,
    pub fill: Option<Color>,
    pub opacity: f64,
    pub font_size: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: Color::RED,
            stroke_width: 2.0,
            fill: None,
            opacity: 1.0,
            font_size: 16.0,
        }
    }
}

impl ShapeStyle {
    pub fn highlight() -> Self {
        Self {
            stroke: Color::YELLOW,
            stroke_width: 0.0,
            fill: Some(Color::YELLOW),
            opacity: 0.5,
            font_size: 16.0,
        }
    }

    pub fn free_highlight() -> Self {
        Self {
            stroke: Color::YELLOW,
            stroke_width: 12.0,
            fill: None,
            opacity: 0.5,
            font_size: 16.0,
        }
    }
}

/// Tool selection coming from the toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpec {
    pub kind: AnnotationKind,
    /// Display name of the tool, kept for logging.
    #[serde(default)]
    pub name: String,
    /// Style override. `None` uses the configured default for the kind.
    #[serde(default)]
    pub style: Option<ShapeStyle>,
    /// Place a single annotation, then fall back to default mode.
    #[serde(default)]
    pub is_once: bool,
}

impl AnnotationSpec {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            name: kind.to_string(),
            style: None,
            is_once: false,
        }
    }

    pub fn once(mut self) -> Self {
        self.is_once = true;
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = Some(style);
        self
    }
}
