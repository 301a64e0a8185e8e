use serde::{Deserialize, Serialize};

/// How the engine executes a model's insert template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertMode {
    /// The template ends in `RETURNING id`; the generated id is scanned and
    /// stored on the model.
    #[default]
    Returning,
    /// The caller assigned the id already. The template returns nothing and
    /// must affect exactly one row.
    Exec,
}

impl InsertMode {
    pub fn returns_id(&self) -> bool {
        matches!(self, InsertMode::Returning)
    }
}
