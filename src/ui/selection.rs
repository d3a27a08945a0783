//! Selection controller
//!
//! Explicit state machine for turning a live text selection into an
//! annotation: `Idle → ToolbarVisible → Composing → Idle`. The host forwards
//! every selection-change event with a snapshot of the current selection
//! (tree range plus bounding rectangle); the controller decides whether the
//! selection is eligible and where the floating toolbar goes. Confirming a
//! compose mutates the annotation store and saves it; failures surface to
//! the caller without rolling the mutation back.

use thiserror::Error;

use crate::anchor::{slice_chars, TextWalk, TreeRange};
use crate::annotations::Annotation;
use crate::store::{AnnotationStore, StoreError};
use crate::ui::{Point, Rect};

/// Toolbar offset from the selection rectangle, in host pixels.
pub const TOOLBAR_OFFSET: f64 = 8.0;

/// Selection validation errors, surfaced as a transient user-facing notice.
/// The selection itself is left as-is for the user to retry.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Selection is collapsed")]
    Collapsed,

    #[error("Selection is outside the annotatable content")]
    OutOfBounds,
}

/// Compose-phase errors
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("No annotation is being composed")]
    NotComposing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the host saw at the moment of a selection-change event.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    pub range: TreeRange,
    pub rect: Rect,
}

/// Captured input for the compose modal.
#[derive(Debug, Clone)]
pub struct ComposeDraft {
    pub start: usize,
    pub end: usize,
    /// Plain text of the selected span, for the modal's preview.
    pub selected_text: String,
    /// Id of the annotation being edited, `None` when composing a new one.
    pub editing: Option<String>,
    /// Pre-seeded comment when editing.
    pub initial_comment: String,
}

/// Controller states
#[derive(Debug, Clone)]
pub enum SelectionState {
    Idle,
    ToolbarVisible {
        snapshot: SelectionSnapshot,
        /// Where the floating annotate affordance goes.
        anchor: Point,
    },
    Composing {
        draft: ComposeDraft,
    },
}

/// Drives the selection-to-annotation flow for one content root.
pub struct SelectionController {
    state: SelectionState,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Handle a selection-change event.
    ///
    /// A missing, collapsed, or out-of-content selection hides the toolbar;
    /// anything else shows it next to the selection rectangle. Events
    /// arriving while the compose modal is open are ignored (the modal owns
    /// the flow until confirm or cancel).
    pub fn on_selection_change(
        &mut self,
        walk: &TextWalk,
        selection: Option<SelectionSnapshot>,
    ) -> &SelectionState {
        if matches!(self.state, SelectionState::Composing { .. }) {
            return &self.state;
        }

        self.state = match selection {
            Some(snapshot)
                if !snapshot.range.is_collapsed()
                    && walk.range_to_offsets(&snapshot.range).is_some() =>
            {
                let anchor = Point {
                    x: snapshot.rect.right() + TOOLBAR_OFFSET,
                    y: snapshot.rect.y - TOOLBAR_OFFSET,
                };
                SelectionState::ToolbarVisible { snapshot, anchor }
            }
            _ => SelectionState::Idle,
        };
        &self.state
    }

    /// Start composing an annotation from the current selection.
    ///
    /// Re-validates against the live selection, computes the offset range,
    /// and captures the selected text for the modal preview. On any
    /// rejection the controller returns to `Idle` without opening the modal;
    /// the host should clear the native selection only on success.
    pub fn begin_annotation(
        &mut self,
        walk: &TextWalk,
        flattened: &str,
        selection: Option<SelectionSnapshot>,
    ) -> Result<&ComposeDraft, SelectionError> {
        let Some(snapshot) = selection else {
            self.state = SelectionState::Idle;
            return Err(SelectionError::OutOfBounds);
        };

        let Some((start, end)) = walk.range_to_offsets(&snapshot.range) else {
            self.state = SelectionState::Idle;
            return Err(SelectionError::OutOfBounds);
        };
        if start == end {
            self.state = SelectionState::Idle;
            return Err(SelectionError::Collapsed);
        }

        self.state = SelectionState::Composing {
            draft: ComposeDraft {
                start,
                end,
                selected_text: slice_chars(flattened, start, end),
                editing: None,
                initial_comment: String::new(),
            },
        };
        match &self.state {
            SelectionState::Composing { draft } => Ok(draft),
            _ => unreachable!("state set above"),
        }
    }

    /// Re-enter composing for an existing annotation, pre-seeded with its
    /// range and comment.
    pub fn begin_edit(&mut self, annotation: &Annotation, flattened: &str) -> &ComposeDraft {
        self.state = SelectionState::Composing {
            draft: ComposeDraft {
                start: annotation.start,
                end: annotation.end,
                selected_text: slice_chars(flattened, annotation.start, annotation.end),
                editing: Some(annotation.id.clone()),
                initial_comment: annotation.comment.clone(),
            },
        };
        match &self.state {
            SelectionState::Composing { draft } => draft,
            _ => unreachable!("state set above"),
        }
    }

    /// Confirm the compose: add or update the annotation, then save.
    ///
    /// The controller returns to `Idle` either way. A save failure is
    /// returned to the caller, but the in-memory mutation stays; retrying
    /// the save is the recovery path.
    pub async fn confirm(
        &mut self,
        store: &mut AnnotationStore,
        comment: &str,
    ) -> Result<String, ComposeError> {
        let state = std::mem::replace(&mut self.state, SelectionState::Idle);
        let SelectionState::Composing { draft } = state else {
            self.state = state;
            return Err(ComposeError::NotComposing);
        };

        let id = match draft.editing {
            Some(id) => {
                store.update(&id, comment)?;
                id
            }
            None => store.add(draft.start, draft.end, comment)?.id.clone(),
        };

        store.save().await.map_err(StoreError::from)?;
        Ok(id)
    }

    /// Abandon the compose. No store mutation.
    pub fn cancel(&mut self) {
        self.state = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{flatten_text, TreePoint};
    use crate::html::parse_html;
    use crate::store::InMemoryPersistence;
    use std::sync::Arc;

    fn fixture() -> (Vec<crate::html::Node>, TextWalk, String) {
        let nodes = parse_html("<p>The quick brown fox jumps over the lazy dog.</p>").unwrap();
        let walk = TextWalk::build(&nodes);
        let text = flatten_text(&nodes);
        (nodes, walk, text)
    }

    fn snapshot(start: usize, end: usize) -> SelectionSnapshot {
        SelectionSnapshot {
            range: TreeRange {
                start: TreePoint {
                    path: vec![0, 0],
                    offset: start,
                },
                end: TreePoint {
                    path: vec![0, 0],
                    offset: end,
                },
            },
            rect: Rect {
                x: 100.0,
                y: 50.0,
                width: 80.0,
                height: 20.0,
            },
        }
    }

    #[test]
    fn test_no_selection_is_idle() {
        let (_, walk, _) = fixture();
        let mut controller = SelectionController::new();
        controller.on_selection_change(&walk, None);
        assert!(matches!(controller.state(), SelectionState::Idle));
    }

    #[test]
    fn test_collapsed_selection_is_idle() {
        let (_, walk, _) = fixture();
        let mut controller = SelectionController::new();
        controller.on_selection_change(&walk, Some(snapshot(4, 4)));
        assert!(matches!(controller.state(), SelectionState::Idle));
    }

    #[test]
    fn test_valid_selection_positions_toolbar() {
        let (_, walk, _) = fixture();
        let mut controller = SelectionController::new();
        controller.on_selection_change(&walk, Some(snapshot(4, 15)));

        let SelectionState::ToolbarVisible { anchor, .. } = controller.state() else {
            panic!("expected toolbar");
        };
        assert_eq!(anchor.x, 188.0); // rect.right() + 8
        assert_eq!(anchor.y, 42.0); // rect.top - 8
    }

    #[test]
    fn test_out_of_content_selection_is_idle() {
        let (_, walk, _) = fixture();
        let mut controller = SelectionController::new();
        // Path points at the <p> element itself, not a text leaf.
        let mut snap = snapshot(0, 5);
        snap.range.start.path = vec![0];
        controller.on_selection_change(&walk, Some(snap));
        assert!(matches!(controller.state(), SelectionState::Idle));
    }

    #[test]
    fn test_begin_annotation_captures_selected_text() {
        let (_, walk, text) = fixture();
        let mut controller = SelectionController::new();
        controller.on_selection_change(&walk, Some(snapshot(4, 15)));

        let draft = controller
            .begin_annotation(&walk, &text, Some(snapshot(4, 15)))
            .unwrap();
        assert_eq!((draft.start, draft.end), (4, 15));
        assert_eq!(draft.selected_text, "quick brown");
        assert!(draft.editing.is_none());
    }

    #[test]
    fn test_begin_annotation_rejects_collapsed() {
        let (_, walk, text) = fixture();
        let mut controller = SelectionController::new();
        controller.on_selection_change(&walk, Some(snapshot(4, 15)));

        let err = controller
            .begin_annotation(&walk, &text, Some(snapshot(7, 7)))
            .unwrap_err();
        assert!(matches!(err, SelectionError::Collapsed));
        assert!(matches!(controller.state(), SelectionState::Idle));
    }

    #[test]
    fn test_selection_changes_ignored_while_composing() {
        let (_, walk, text) = fixture();
        let mut controller = SelectionController::new();
        controller
            .begin_annotation(&walk, &text, Some(snapshot(4, 15)))
            .unwrap();

        controller.on_selection_change(&walk, None);
        assert!(matches!(controller.state(), SelectionState::Composing { .. }));
    }

    #[tokio::test]
    async fn test_confirm_adds_and_saves() {
        let (_, walk, text) = fixture();
        let persistence = Arc::new(InMemoryPersistence::default());
        let mut store = AnnotationStore::new("article-1", persistence.clone());

        let mut controller = SelectionController::new();
        controller
            .begin_annotation(&walk, &text, Some(snapshot(4, 15)))
            .unwrap();
        let id = controller.confirm(&mut store, "nice description").await.unwrap();

        assert!(matches!(controller.state(), SelectionState::Idle));
        let annotation = store.get(&id).unwrap();
        assert_eq!((annotation.start, annotation.end), (4, 15));
        assert_eq!(annotation.comment, "nice description");

        // Saved wholesale: a fresh store sees it.
        let mut reloaded = AnnotationStore::new("article-1", persistence);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.annotations().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_edit_updates_comment() {
        let (_, _, text) = fixture();
        let mut store = AnnotationStore::new("article-1", Arc::new(InMemoryPersistence::default()));
        let id = store.add(4, 15, "old").unwrap().id.clone();
        let annotation = store.get(&id).unwrap().clone();

        let mut controller = SelectionController::new();
        let draft = controller.begin_edit(&annotation, &text);
        assert_eq!(draft.initial_comment, "old");
        assert_eq!(draft.selected_text, "quick brown");

        let confirmed = controller.confirm(&mut store, "new").await.unwrap();
        assert_eq!(confirmed, id);
        assert_eq!(store.get(&id).unwrap().comment, "new");
    }

    #[tokio::test]
    async fn test_cancel_discards_without_mutation() {
        let (_, walk, text) = fixture();
        let mut store = AnnotationStore::new("article-1", Arc::new(InMemoryPersistence::default()));

        let mut controller = SelectionController::new();
        controller
            .begin_annotation(&walk, &text, Some(snapshot(4, 15)))
            .unwrap();
        controller.cancel();

        assert!(matches!(controller.state(), SelectionState::Idle));
        assert!(store.annotations().is_empty());
        assert!(matches!(
            controller.confirm(&mut store, "x").await.unwrap_err(),
            ComposeError::NotComposing
        ));
    }
}
