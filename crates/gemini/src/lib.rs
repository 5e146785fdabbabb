//! Gemini REST client and the AI edit gateway.
//!
//! Provides typed `generateContent` request/response messages, an HTTP
//! wrapper around the endpoint, environment-driven configuration, and
//! the [`AiGateway`] trait the editor session talks to.

pub mod api;
pub mod config;
pub mod gateway;
pub mod messages;

pub use api::{GeminiApi, GeminiApiError};
pub use config::{ConfigError, GeminiConfig};
pub use gateway::{AiGateway, Coaching, CoachingError, GeminiGateway, GenerationError, SuggestionError};
