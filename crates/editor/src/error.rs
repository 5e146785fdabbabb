use canvas_core::error::CoreError;
use canvas_db::StorageError;
use canvas_gemini::{GenerationError, SuggestionError};

/// Errors surfaced by [`EditorSession`](crate::EditorSession) operations.
///
/// None of these are fatal; the session stays usable after every one.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Bad input (non-image upload, missing prompt, bad cursor target).
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The operation needs an image and none is loaded.
    #[error("No image loaded")]
    NoImage,

    /// Another AI edit is still pending.
    #[error("An edit is already in progress")]
    EditInFlight,

    /// The image changed while the edit was pending; the result was dropped.
    #[error("The image changed while the edit was running; result discarded")]
    StaleResult,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    /// Saving failed (backend I/O, quota exceeded).
    #[error("Failed to save project: {0}")]
    Storage(#[from] StorageError),
}
