//! UI controllers
//!
//! Host-agnostic controllers for the reader view: the selection controller
//! drives the annotate toolbar and compose modal, the hover controller maps
//! pointer position over a highlight marker back to its annotation. Hosts
//! forward selection-change and pointer events and apply the returned state
//! to their own widgets.

mod hover;
mod selection;

pub use hover::{
    delete_annotation, AnnotationView, HoverController, MarkerHit, Tooltip, TOOLTIP_MAX_LINES,
};
pub use selection::{
    ComposeDraft, ComposeError, SelectionController, SelectionError, SelectionSnapshot,
    SelectionState, TOOLBAR_OFFSET,
};

/// A point in host viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A bounding rectangle in host viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}
