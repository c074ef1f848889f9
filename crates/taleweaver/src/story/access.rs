//! Ownership check for authoring actions.
//!
//! Staff may edit any story; everyone else only the stories they created.

use thiserror::Error;

use crate::store::{OwnershipStore, StorageError};

/// Who is asking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub is_staff: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_staff: false,
        }
    }

    pub fn staff(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_staff: true,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("sign in to edit stories")]
    Unauthenticated,

    #[error("you do not own story {story_id}")]
    Forbidden { story_id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Require a signed-in viewer.
pub fn require_user(viewer: &Viewer) -> Result<&str, AccessError> {
    viewer.user_id().ok_or(AccessError::Unauthenticated)
}

/// Allow staff, or the recorded owner of `story_id`.
pub async fn authorize_author(
    viewer: &Viewer,
    story_id: &str,
    ownership: &dyn OwnershipStore,
) -> Result<(), AccessError> {
    let user_id = require_user(viewer)?;
    if viewer.is_staff {
        return Ok(());
    }
    match ownership.owner(story_id).await? {
        Some(owner) if owner == user_id => Ok(()),
        _ => Err(AccessError::Forbidden {
            story_id: story_id.to_string(),
        }),
    }
}
