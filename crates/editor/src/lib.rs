//! Editor session orchestration.
//!
//! - [`EditorSession`] holds one project in edit: its original image,
//!   linear edit history and pending AI request, and saves it through
//!   [`canvas_db::ProjectRepo`].
//! - [`CoachConversation`] keeps the prompt-coach message log.

pub mod coach;
pub mod error;
pub mod session;

pub use coach::{CoachConversation, CoachMessage, CoachRole};
pub use error::SessionError;
pub use session::{EditorSession, PendingEdit, SessionState};
