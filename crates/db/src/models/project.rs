//! Project record model.

use canvas_core::image::ImageFile;
use canvas_core::types::{ProjectId, Timestamp};
use serde::{Deserialize, Serialize};

/// A saved project, as persisted in the project collection.
///
/// Timestamps are stored as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub original_image: ImageFile,
    /// Full snapshots in chronological edit order.
    pub history: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: Timestamp,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: Timestamp,
}

impl Project {
    /// Newest snapshot, or the original upload when there are no edits.
    pub fn latest_image(&self) -> &str {
        self.history
            .last()
            .map(String::as_str)
            .unwrap_or(&self.original_image.data)
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            edit_count: self.history.len(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing view of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub edit_count: usize,
    pub updated_at: Timestamp,
}
