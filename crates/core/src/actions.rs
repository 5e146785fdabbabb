//! Creative actions a user can run against the current image.
//!
//! Every action ends up as one instruction string sent to the image
//! model; this module owns the wording and the "needs a prompt" checks.

use std::fmt;

use crate::error::CoreError;

/// Error shown when a plain edit is requested without a description.
pub const MISSING_EDIT_PROMPT: &str = "Please provide a description of the changes.";

/// Error shown when the emotion action is requested without a prompt.
pub const MISSING_EMOTION_PROMPT: &str =
    "Please describe an emotion or scene in the text box first.";

const REMIX_INSTRUCTION: &str = "Reinterpret this image in a completely different, surprising \
artistic style. For example, you could try minimalist line art, abstract expressionism, \
cinematic, or surrealism. Generate a single, visually unique version.";

const EXPAND_INSTRUCTION: &str = "Expand the existing scene outward as if zooming out, \
revealing the environment beyond the current frame. This is also known as \"outpainting\". \
Maintain the original color palette and art style for a seamless and consistent result.";

/// One AI operation on the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreativeAction {
    /// Apply the user's own description.
    Edit(String),
    /// Restyle the image in a surprising artistic style.
    Remix,
    /// Express the emotional tone of the user's prompt.
    Emotion(String),
    /// Outpaint beyond the current frame.
    Expand,
}

impl CreativeAction {
    /// Parse an action name as used on the command line.
    ///
    /// `prompt` is attached to the actions that take one.
    pub fn from_name(name: &str, prompt: Option<String>) -> Result<Self, CoreError> {
        let prompt = prompt.unwrap_or_default();
        match name {
            "edit" => Ok(Self::Edit(prompt)),
            "remix" => Ok(Self::Remix),
            "emotion" => Ok(Self::Emotion(prompt)),
            "expand" => Ok(Self::Expand),
            other => Err(CoreError::Validation(format!(
                "Unknown action '{other}'. Must be one of: edit, remix, emotion, expand"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Edit(_) => "edit",
            Self::Remix => "remix",
            Self::Emotion(_) => "emotion",
            Self::Expand => "expand",
        }
    }

    /// Check that prompt-driven actions actually carry a prompt.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Edit(prompt) if prompt.trim().is_empty() => {
                Err(CoreError::Validation(MISSING_EDIT_PROMPT.to_string()))
            }
            Self::Emotion(prompt) if prompt.trim().is_empty() => {
                Err(CoreError::Validation(MISSING_EMOTION_PROMPT.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Full instruction text for the image model.
    pub fn instruction(&self) -> String {
        match self {
            Self::Edit(prompt) => format!(
                "Edit this image based on the following user request: \"{}\". Strictly adhere \
                 to the user's request. Try to maintain the original aspect ratio where possible.",
                prompt.trim()
            ),
            Self::Remix => REMIX_INSTRUCTION.to_string(),
            Self::Emotion(prompt) => format!(
                "Analyze the emotional tone of this user prompt: \"{}\". Then, subtly edit the \
                 provided image to visually express that emotion. For example: for warmth, add a \
                 soft glow and warm tones; for calmness, add a blue haze; for chaos, add abstract \
                 blur motion. Apply the changes gracefully.",
                prompt.trim()
            ),
            Self::Expand => EXPAND_INSTRUCTION.to_string(),
        }
    }
}

impl fmt::Display for CreativeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
