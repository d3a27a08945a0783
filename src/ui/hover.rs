//! Hover controller
//!
//! Maps pointer events over highlight markers back to the owning annotation:
//! hover shows a rendered-comment tooltip anchored above the marker, click
//! opens a read-only view with a context snippet taken from the live
//! displayed tree. Privileged viewers additionally get edit and delete
//! affordances on the view.

use std::sync::Arc;

use crate::annotations::Annotation;
use crate::html::{range_snippet, Node};
use crate::render::{ContentRenderer, RenderOptions};
use crate::store::{AnnotationStore, PersistenceError};
use crate::ui::{Point, Rect};

/// Tooltip body clipping, in lines.
pub const TOOLTIP_MAX_LINES: usize = 4;

/// The marker element the pointer is over: nearest ancestor carrying the
/// annotation-id data attribute, plus its bounding rectangle.
#[derive(Debug, Clone)]
pub struct MarkerHit {
    pub annotation_id: String,
    pub rect: Rect,
}

/// Tooltip shown while hovering a commented marker.
#[derive(Debug, Clone)]
pub struct Tooltip {
    pub annotation_id: String,
    /// Anchor point: horizontal center of the marker, at its top edge.
    pub anchor: Point,
    /// The comment rendered through the rich-content renderer.
    pub comment_html: String,
    pub max_lines: usize,
}

/// Read-only view opened by clicking a marker.
#[derive(Debug, Clone)]
pub struct AnnotationView {
    pub annotation: Annotation,
    /// Context-padded excerpt of the annotated span, from the live tree.
    pub snippet_html: String,
    pub comment_html: String,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Maps marker hover/click events to tooltip and view-modal state.
pub struct HoverController {
    renderer: Arc<dyn ContentRenderer>,
    options: RenderOptions,
    snippet_context: usize,
    hovered: Option<String>,
}

impl HoverController {
    pub fn new(renderer: Arc<dyn ContentRenderer>, options: RenderOptions) -> Self {
        Self {
            renderer,
            options,
            snippet_context: crate::html::DEFAULT_CONTEXT,
            hovered: None,
        }
    }

    pub fn with_snippet_context(mut self, context: usize) -> Self {
        self.snippet_context = context;
        self
    }

    /// The id of the currently hovered marker, if any.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Pointer entered a marker.
    ///
    /// Returns the tooltip to show, or `None` when the marker's annotation
    /// is unknown or has an empty comment (empty markers stay silent; they
    /// remain clickable handles for privileged viewers).
    pub fn on_marker_enter(&mut self, store: &AnnotationStore, hit: &MarkerHit) -> Option<Tooltip> {
        let annotation = store.get(&hit.annotation_id)?;
        self.hovered = Some(annotation.id.clone());

        if annotation.comment.is_empty() {
            return None;
        }

        Some(Tooltip {
            annotation_id: annotation.id.clone(),
            anchor: Point {
                x: hit.rect.center_x(),
                y: hit.rect.y,
            },
            comment_html: self.renderer.render(&annotation.comment, &self.options),
            max_lines: TOOLTIP_MAX_LINES,
        })
    }

    /// Pointer left the marker: clear the hover id and tooltip anchor.
    pub fn on_marker_leave(&mut self) {
        self.hovered = None;
    }

    /// Click on a marker: open the read-only view.
    ///
    /// The snippet is taken against the live displayed tree, not a reparsed
    /// copy, so it reflects exactly what the reader sees.
    pub fn on_marker_click(
        &self,
        store: &AnnotationStore,
        live_root: &[Node],
        hit: &MarkerHit,
        privileged: bool,
    ) -> Option<AnnotationView> {
        let annotation = store.get(&hit.annotation_id)?;
        Some(AnnotationView {
            annotation: annotation.clone(),
            snippet_html: range_snippet(
                live_root,
                annotation.start,
                annotation.end,
                self.snippet_context,
            ),
            comment_html: self.renderer.render(&annotation.comment, &self.options),
            can_edit: privileged,
            can_delete: privileged,
        })
    }
}

/// Delete an annotation from the view modal and persist the removal.
/// Removing an unknown id is a no-op that still saves the current set.
pub async fn delete_annotation(
    store: &mut AnnotationStore,
    annotation_id: &str,
) -> Result<(), PersistenceError> {
    store.remove(annotation_id);
    store.save().await
}
