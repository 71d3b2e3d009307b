use serde::{Deserialize, Serialize};

use cragsupply_core::validate::required_text;
use cragsupply_core::{CategoryId, DomainResult, Entity};

const NAME_MAX: usize = 50;

/// Caller-supplied category fields (no identity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
}

/// A named grouping of products (e.g. "Ropes", "Harnesses").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    /// Validate `draft` and bind it to `id`.
    pub fn new(id: CategoryId, draft: CategoryDraft) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: required_text("category name", &draft.name, NAME_MAX)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}
