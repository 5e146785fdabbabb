//! Editor session: one project in edit.
//!
//! The session is `Empty` until an image is uploaded or a saved project
//! is opened, then `Editing`. AI edits run in two phases so a caller's
//! event loop can await the gateway without holding the session:
//! [`EditorSession::begin_edit`] snapshots the request and marks it in
//! flight, [`EditorSession::complete_edit`] commits the result onto the
//! history. Only one edit may be in flight, and a result that arrives
//! after a new upload is dropped. While an edit is in flight the cursor
//! is frozen and saving is refused, so the result always lands on the
//! snapshot it was generated from.

use canvas_core::actions::CreativeAction;
use canvas_core::error::CoreError;
use canvas_core::history::EditHistory;
use canvas_core::image::{
    data_url_mime, default_project_name, display_name, validate_image_mime, ImageFile,
};
use canvas_core::types::{self, ProjectId, Timestamp};
use canvas_db::{KeyValueStore, Project, ProjectRepo};
use canvas_gemini::{AiGateway, GenerationError};

use crate::error::SessionError;

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded.
    Empty,
    /// An original image is loaded; history may be empty.
    Editing,
}

/// An AI edit that has been started but not committed.
///
/// Carries everything the gateway call needs, so the session can be
/// released while the request runs.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    epoch: u64,
    action: CreativeAction,
    image: String,
    mime_type: String,
    instruction: String,
}

impl PendingEdit {
    /// Data URL of the image being edited.
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Full instruction text for the image model.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// A single project being edited.
#[derive(Debug, Default)]
pub struct EditorSession {
    project_id: Option<ProjectId>,
    created_at: Option<Timestamp>,
    name: String,
    original: Option<ImageFile>,
    history: EditHistory,
    prompt: String,
    error: Option<String>,
    /// Bumped on every upload/open; pending edits from an older epoch are stale.
    epoch: u64,
    /// Epoch of the edit currently in flight, if any.
    in_flight: Option<u64>,
}

impl EditorSession {
    /// An empty session with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a saved project. The history cursor starts at the newest
    /// snapshot.
    pub fn open(project: Project) -> Self {
        tracing::debug!(project_id = %project.id, edits = project.history.len(), "Opening project");
        Self {
            project_id: Some(project.id),
            created_at: Some(project.created_at),
            name: project.name,
            original: Some(project.original_image),
            history: EditHistory::from_snapshots(project.history),
            epoch: 1,
            ..Self::default()
        }
    }

    // ---- accessors ----

    pub fn state(&self) -> SessionState {
        if self.original.is_some() {
            SessionState::Editing
        } else {
            SessionState::Empty
        }
    }

    /// Id of the stored record this session saves into, once saved.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn original(&self) -> Option<&ImageFile> {
        self.original.as_ref()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Draft prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Use a suggestion (or coached prompt) as the draft.
    pub fn apply_suggestion(&mut self, suggestion: &str) {
        self.prompt = suggestion.to_string();
    }

    /// Last surfaced error message, as it would be shown to the user.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether an AI edit is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The image currently shown: the snapshot under the cursor, else the
    /// original upload.
    pub fn current_image(&self) -> Option<&str> {
        self.history
            .current_image(self.original.as_ref().map(|o| o.data.as_str()))
    }

    /// MIME type of [`current_image`](Self::current_image).
    ///
    /// Generated snapshots may differ from the upload's type, so the data
    /// URL header wins over the original's declared type.
    pub fn current_mime_type(&self) -> Option<&str> {
        let original = self.original.as_ref()?;
        Some(
            self.history
                .current_snapshot()
                .and_then(data_url_mime)
                .unwrap_or(original.mime_type.as_str()),
        )
    }

    // ---- transitions ----

    /// Load a new source image, discarding all edits of the previous one.
    ///
    /// A non-image file is rejected and leaves the session untouched. The
    /// session detaches from any previously opened project, so the next
    /// save creates a new record.
    pub fn upload(&mut self, file: ImageFile) -> Result<(), SessionError> {
        validate_image_mime(&file.mime_type)?;

        tracing::info!(name = %file.name, mime_type = %file.mime_type, size = file.size, "Image uploaded");

        self.name = default_project_name(&file.name);
        self.original = Some(file);
        self.history.reset();
        self.error = None;
        self.prompt.clear();
        self.project_id = None;
        self.created_at = None;
        self.epoch += 1;
        self.in_flight = None;
        Ok(())
    }

    /// Step back one snapshot. No-op while an edit is in flight.
    pub fn undo(&mut self) {
        if self.can_undo() {
            self.history.undo();
        }
    }

    /// Step forward one snapshot. No-op while an edit is in flight.
    pub fn redo(&mut self) {
        if self.can_redo() {
            self.history.redo();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.is_busy() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_busy() && self.history.can_redo()
    }

    /// Move the cursor to `index` (`-1` = original) by stepping through
    /// undo/redo.
    pub fn seek(&mut self, index: isize) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::EditInFlight);
        }
        let last = self.history.len() as isize - 1;
        if index < -1 || index > last {
            return Err(CoreError::Validation(format!(
                "History index {index} out of range -1..={last}"
            ))
            .into());
        }
        while self.history.index() > index {
            self.history.undo();
        }
        while self.history.index() < index {
            self.history.redo();
        }
        Ok(())
    }

    /// Start an AI edit on the current image.
    ///
    /// Fails with [`SessionError::EditInFlight`] while another edit is
    /// pending, with a validation error when the action needs a prompt
    /// and has none, and with [`SessionError::NoImage`] when nothing is
    /// loaded.
    pub fn begin_edit(&mut self, action: CreativeAction) -> Result<PendingEdit, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::EditInFlight);
        }
        if let Err(e) = action.validate() {
            self.error = Some(validation_message(&e));
            return Err(e.into());
        }

        let image = self.current_image().ok_or(SessionError::NoImage)?.to_string();
        let mime_type = self
            .current_mime_type()
            .ok_or(SessionError::NoImage)?
            .to_string();

        self.error = None;
        self.in_flight = Some(self.epoch);

        tracing::info!(action = %action, mime_type = %mime_type, "AI edit started");

        Ok(PendingEdit {
            epoch: self.epoch,
            instruction: action.instruction(),
            action,
            image,
            mime_type,
        })
    }

    /// Commit the gateway's answer for `pending`.
    ///
    /// On success the snapshot is applied to the history (discarding any
    /// redo branch). On failure the error message is surfaced and the
    /// history is untouched. A result for an image that has since been
    /// replaced is dropped with [`SessionError::StaleResult`].
    pub fn complete_edit(
        &mut self,
        pending: PendingEdit,
        result: Result<String, GenerationError>,
    ) -> Result<(), SessionError> {
        if pending.epoch != self.epoch || self.in_flight != Some(pending.epoch) {
            tracing::warn!(action = %pending.action, "Dropping stale AI edit result");
            return Err(SessionError::StaleResult);
        }
        self.in_flight = None;

        match result {
            Ok(snapshot) => {
                self.history.apply_edit(snapshot);
                tracing::info!(
                    action = %pending.action,
                    index = self.history.index(),
                    "AI edit applied"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(action = %pending.action, error = %e, "AI edit failed");
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Forget the in-flight edit; its result will be dropped as stale.
    pub fn abandon_edit(&mut self) {
        if self.in_flight.take().is_some() {
            // Move to a new epoch so a late completion cannot match.
            self.epoch += 1;
        }
    }

    /// Run `action` through `gateway` and commit the result.
    ///
    /// Dropping the returned future before it completes abandons the edit,
    /// leaving the session free for the next one.
    pub async fn apply_ai_edit(
        &mut self,
        gateway: &dyn AiGateway,
        action: CreativeAction,
    ) -> Result<(), SessionError> {
        let pending = self.begin_edit(action)?;
        let guard = AbandonOnDrop {
            session: self,
            armed: true,
        };
        let result = gateway
            .edit_image(pending.image(), pending.mime_type(), pending.instruction())
            .await;
        guard.complete(pending, result)
    }

    /// Ask the gateway for edit ideas for the current image.
    pub async fn suggestions(
        &mut self,
        gateway: &dyn AiGateway,
    ) -> Result<Vec<String>, SessionError> {
        let image = self.current_image().ok_or(SessionError::NoImage)?;
        let mime_type = self.current_mime_type().ok_or(SessionError::NoImage)?;

        match gateway.suggestions(image, mime_type).await {
            Ok(suggestions) => Ok(suggestions),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Persist the project: full history, whatever the cursor position.
    ///
    /// Assigns an id and creation time on the first save. The session
    /// keeps its state, so a failed save loses nothing. Refused while an
    /// edit is in flight.
    pub fn save(&mut self, store: &dyn KeyValueStore) -> Result<Project, SessionError> {
        if self.is_busy() {
            return Err(SessionError::EditInFlight);
        }
        let original = self.original.clone().ok_or(SessionError::NoImage)?;
        let now = types::now();

        let project = Project {
            id: self
                .project_id
                .clone()
                .unwrap_or_else(types::new_project_id),
            name: display_name(&self.name),
            original_image: original,
            history: self.history.snapshots().to_vec(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        };

        match ProjectRepo::save(store, &project) {
            Ok(saved) => {
                self.project_id = Some(saved.id.clone());
                self.created_at = Some(saved.created_at);
                self.name = saved.name.clone();
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(project_id = %project.id, error = %e, "Failed to save project");
                self.error = Some(format!("Failed to save project: {e}"));
                Err(e.into())
            }
        }
    }
}

/// Abandons the session's in-flight edit unless completed first.
struct AbandonOnDrop<'a> {
    session: &'a mut EditorSession,
    armed: bool,
}

impl AbandonOnDrop<'_> {
    fn complete(
        mut self,
        pending: PendingEdit,
        result: Result<String, GenerationError>,
    ) -> Result<(), SessionError> {
        self.armed = false;
        self.session.complete_edit(pending, result)
    }
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("AI edit request dropped before completion");
            self.session.abandon_edit();
        }
    }
}

/// Strip the `Validation failed: ` prefix for display.
fn validation_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}
