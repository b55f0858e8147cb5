/// Tags for grouping habits ("Health", "Mindfulness", ...)

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, TagId};

/// Longest allowed tag name, in characters
pub const MAX_TAG_NAME_LEN: usize = 50;

/// A label that can be attached to any number of habits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Unique display name
    pub name: String,
}

impl Tag {
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTagName("Tag name cannot be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_TAG_NAME_LEN {
            return Err(DomainError::InvalidTagName(
                format!("Tag name cannot be longer than {} characters", MAX_TAG_NAME_LEN)
            ));
        }

        Ok(Self {
            id: TagId::new(),
            name: trimmed.to_string(),
        })
    }
}
