//! Painter configuration
//!
//! Tunables for shape creation, hit testing and export. Configuration can be loaded
//! from a JSON file, environment variables, or created programmatically.

use crate::error::{AnnotatorError, AnnotatorResult};
use pdf_annotator_model::{AnnotationKind, ShapeStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the painter and its editors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Drag-to-size shapes smaller than this (in page units) are discarded
    pub min_shape_size: f64,
    /// Extra hit area around groups and handles, in page units
    pub hit_tolerance: f64,
    /// Handle radius for the selector, in page units
    pub handle_size: f64,
    /// Number of segments used when exporting ellipses as ink paths
    pub ellipse_segments: usize,
    /// Default placed width of signature and stamp images, in page units
    pub stamp_default_width: f64,
    /// Vertical tolerance when merging selection rectangles into lines
    pub line_merge_tolerance: f64,
    /// Style for rectangle, ellipse, free-hand and free-text shapes
    pub shape_style: ShapeStyle,
    /// Style for text highlights
    pub highlight_style: ShapeStyle,
    /// Style for strikeout and underline lines
    pub markup_line_style: ShapeStyle,
    /// Style for free-hand highlights
    pub free_highlight_style: ShapeStyle,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            min_shape_size: 2.0,
            hit_tolerance: 4.0,
            handle_size: 5.0,
            ellipse_segments: 48,
            stamp_default_width: 150.0,
            line_merge_tolerance: 2.0,
            shape_style: ShapeStyle::default(),
            highlight_style: ShapeStyle::highlight(),
            markup_line_style: ShapeStyle {
                stroke_width: 1.0,
                ..ShapeStyle::default()
            },
            free_highlight_style: ShapeStyle::free_highlight(),
        }
    }
}

impl PainterConfig {
    /// Default style for shapes drawn with the given kind
    pub fn style_for(&self, kind: AnnotationKind) -> ShapeStyle {
        match kind {
            AnnotationKind::Highlight => self.highlight_style.clone(),
            AnnotationKind::Strikeout | AnnotationKind::Underline => self.markup_line_style.clone(),
            AnnotationKind::FreeHighlight => self.free_highlight_style.clone(),
            _ => self.shape_style.clone(),
        }
    }

    pub fn with_min_shape_size(mut self, size: f64) -> Self {
        self.min_shape_size = size;
        self
    }

    pub fn with_hit_tolerance(mut self, tolerance: f64) -> Self {
        self.hit_tolerance = tolerance;
        self
    }

    pub fn with_stamp_default_width(mut self, width: f64) -> Self {
        self.stamp_default_width = width;
        self
    }

    pub fn with_ellipse_segments(mut self, segments: usize) -> Self {
        self.ellipse_segments = segments;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PDF_ANNOTATOR_MIN_SHAPE_SIZE`
    /// - `PDF_ANNOTATOR_HIT_TOLERANCE`
    /// - `PDF_ANNOTATOR_ELLIPSE_SEGMENTS`
    /// - `PDF_ANNOTATOR_STAMP_WIDTH`
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> AnnotatorResult<Self> {
        Self::default().apply_env()
    }

    /// Applies environment overrides on top of this configuration
    pub fn apply_env(mut self) -> AnnotatorResult<Self> {
        if let Some(value) = env_value::<f64>("PDF_ANNOTATOR_MIN_SHAPE_SIZE")? {
            self.min_shape_size = value;
        }
        if let Some(value) = env_value::<f64>("PDF_ANNOTATOR_HIT_TOLERANCE")? {
            self.hit_tolerance = value;
        }
        if let Some(value) = env_value::<usize>("PDF_ANNOTATOR_ELLIPSE_SEGMENTS")? {
            self.ellipse_segments = value;
        }
        if let Some(value) = env_value::<f64>("PDF_ANNOTATOR_STAMP_WIDTH")? {
            self.stamp_default_width = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Loads configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or holds invalid values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnnotatorResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> AnnotatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AnnotatorResult<()> {
        if self.min_shape_size.is_nan() || self.min_shape_size < 0.0 {
            return Err(invalid("min_shape_size"));
        }
        if self.hit_tolerance.is_nan() || self.hit_tolerance < 0.0 {
            return Err(invalid("hit_tolerance"));
        }
        if self.ellipse_segments < 4 {
            return Err(invalid("ellipse_segments"));
        }
        if self.stamp_default_width.is_nan() || self.stamp_default_width <= 0.0 {
            return Err(invalid("stamp_default_width"));
        }
        Ok(())
    }
}

fn invalid(field: &str) -> AnnotatorError {
    AnnotatorError::InvalidConfig(field.to_string())
}

fn env_value<T: std::str::FromStr>(name: &str) -> AnnotatorResult<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(name)),
        Err(_) => Ok(None),
    }
}
