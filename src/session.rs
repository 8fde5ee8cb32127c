// Session scripts: the form's edits and button presses replayed in order.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::draft::{Field, QuoteDraft};
use crate::error::AppError;

/// One user action against the draft.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Set { field: Field, value: String },
    AddItem,
    EditItem { index: usize },
    SaveItem,
    CancelEdit,
    DeleteItem { index: usize },
}

impl Action {
    pub fn set(field: Field, value: &str) -> Self {
        Action::Set {
            field,
            value: value.to_string(),
        }
    }

    pub fn apply(&self, draft: &mut QuoteDraft) -> Result<(), AppError> {
        match self {
            Action::Set { field, value } => draft.set_field(*field, value)?,
            Action::AddItem => draft.add_item()?,
            Action::EditItem { index } => draft.edit_item(*index)?,
            Action::SaveItem => draft.save_item()?,
            Action::CancelEdit => draft.cancel_edit()?,
            Action::DeleteItem { index } => draft.delete_item(*index)?,
        }
        Ok(())
    }
}

pub fn parse_script(json: &str) -> Result<Vec<Action>, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::ScriptError(format!("JSON inválido: {}", e)))
}

pub fn load_script(path: &Path) -> Result<Vec<Action>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::ScriptError(format!("{}: {}", path.display(), e)))?;
    let actions = parse_script(&content)?;
    info!(path = %path.display(), actions = actions.len(), "script loaded");
    Ok(actions)
}

/// Apply `actions` in order, stopping at the first failure.
pub fn replay(draft: &mut QuoteDraft, actions: &[Action]) -> Result<(), AppError> {
    for (n, action) in actions.iter().enumerate() {
        debug!(step = n + 1, ?action, "applying");
        action
            .apply(draft)
            .map_err(|e| AppError::ScriptError(format!("ação {}: {}", n + 1, e)))?;
    }
    Ok(())
}

/// Expand `DESCRIÇÃO;QTD;COR` into the actions that add it as an item.
/// Missing trailing parts are left blank.
pub fn item_actions(item: &str) -> Result<Vec<Action>, AppError> {
    let parts: Vec<&str> = item.split(';').collect();
    if parts.len() > 3 {
        return Err(AppError::ItemError(format!(
            "esperado DESCRIÇÃO;QTD;COR, recebido '{}'",
            item
        )));
    }
    let part = |i: usize| parts.get(i).map(|s| s.trim()).unwrap_or("");
    Ok(vec![
        Action::set(Field::ItemDescription, part(0)),
        Action::set(Field::ItemQuantity, part(1)),
        Action::set(Field::ItemColor, part(2)),
        Action::AddItem,
    ])
}
