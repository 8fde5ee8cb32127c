// In-memory quote draft and the line item workflow.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{AppError, WorkflowError};
use crate::format::{
    digits_only, format_currency, format_phone, format_tax_id, normalize_date_input,
    parse_quantity, storage_to_display_date, today_storage,
};

/// Digit caps, matching the input limits of the quote form.
pub const TAX_ID_MAX_DIGITS: usize = 14;
pub const PHONE_MAX_DIGITS: usize = 11;

// ============================================================================
// Data Structures
// ============================================================================

/// Customer identity. Tax id and phone hold raw digits only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRecord {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
}

impl CustomerRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.tax_id.is_empty() && self.phone.is_empty()
    }

    pub fn tax_id_display(&self) -> String {
        format_tax_id(&self.tax_id)
    }

    pub fn phone_display(&self) -> String {
        format_phone(&self.phone)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub description: String,
    /// `None` when the quantity was left blank or was not a number.
    pub quantity: Option<i64>,
    pub color: String,
}

impl LineItem {
    pub fn new(description: &str, quantity: Option<i64>, color: &str) -> Self {
        Self {
            description: description.to_string(),
            quantity,
            color: color.to_string(),
        }
    }

    pub fn quantity_display(&self) -> String {
        self.quantity.map(|q| q.to_string()).unwrap_or_default()
    }
}

/// The item entry fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEntry {
    pub description: String,
    pub quantity: String,
    pub color: String,
}

impl ItemEntry {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_item(&self) -> LineItem {
        LineItem {
            description: self.description.clone(),
            quantity: parse_quantity(&self.quantity),
            color: self.color.clone(),
        }
    }

    fn load(&mut self, item: &LineItem) {
        self.description = item.description.clone();
        self.quantity = item.quantity_display();
        self.color = item.color.clone();
    }
}

/// Every editable field of the quote form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Field {
    CustomerName,
    CustomerTaxId,
    CustomerPhone,
    ItemDescription,
    ItemQuantity,
    ItemColor,
    Observations,
    TotalAmount,
    QuoteDate,
}

impl FromStr for Field {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::CustomerName),
            "cnpj" | "cpf" | "tax_id" => Ok(Field::CustomerTaxId),
            "phone" => Ok(Field::CustomerPhone),
            "description" => Ok(Field::ItemDescription),
            "quantity" => Ok(Field::ItemQuantity),
            "color" => Ok(Field::ItemColor),
            "observations" => Ok(Field::Observations),
            "total" | "total_amount" => Ok(Field::TotalAmount),
            "date" => Ok(Field::QuoteDate),
            other => Err(WorkflowError::UnknownField(other.to_string())),
        }
    }
}

impl TryFrom<String> for Field {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::CustomerName => "name",
            Field::CustomerTaxId => "tax_id",
            Field::CustomerPhone => "phone",
            Field::ItemDescription => "description",
            Field::ItemQuantity => "quantity",
            Field::ItemColor => "color",
            Field::Observations => "observations",
            Field::TotalAmount => "total",
            Field::QuoteDate => "date",
        };
        f.write_str(name)
    }
}

/// Frozen view of a draft, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSnapshot {
    pub customer: CustomerRecord,
    pub items: Vec<LineItem>,
    pub observations: String,
    pub total_display: Option<String>,
    /// `YYYY-MM-DD`, or empty when no date was set.
    pub quote_date: String,
}

// ============================================================================
// Quote Draft
// ============================================================================

/// The quote being composed. Lives for one session and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDraft {
    customer: CustomerRecord,
    items: Vec<LineItem>,
    observations: String,
    total_digits: String,
    quote_date: String,
    entry: ItemEntry,
    editing: Option<usize>,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteDraft {
    /// Fresh draft dated today.
    pub fn new() -> Self {
        Self::with_date(&today_storage())
    }

    /// Fresh draft with a fixed storage-format date.
    pub fn with_date(quote_date: &str) -> Self {
        Self {
            customer: CustomerRecord::default(),
            items: Vec::new(),
            observations: String::new(),
            total_digits: String::new(),
            quote_date: quote_date.to_string(),
            entry: ItemEntry::default(),
            editing: None,
        }
    }

    pub fn customer(&self) -> &CustomerRecord {
        &self.customer
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    pub fn entry(&self) -> &ItemEntry {
        &self.entry
    }

    pub fn quote_date(&self) -> &str {
        &self.quote_date
    }

    pub fn total_digits(&self) -> &str {
        &self.total_digits
    }

    /// Index of the item being edited, if any.
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    /// Form-style view of [`Self::editing`]: `-1` when idle.
    pub fn editing_index(&self) -> isize {
        self.editing.map(|i| i as isize).unwrap_or(-1)
    }

    /// Formatted total, or `None` while nothing was typed.
    pub fn total_amount_display(&self) -> Option<String> {
        if self.total_digits.is_empty() {
            None
        } else {
            Some(format_currency(&self.total_digits))
        }
    }

    // ------------------------------------------------------------------------
    // Field edits
    // ------------------------------------------------------------------------

    /// Apply a raw edit to one field.
    ///
    /// Tax id, phone and total keep only their digits; the date accepts
    /// either `YYYY-MM-DD` or `DD/MM/YYYY` and an empty value clears it.
    pub fn set_field(&mut self, field: Field, raw: &str) -> Result<(), AppError> {
        match field {
            Field::CustomerName => self.customer.name = raw.to_string(),
            Field::CustomerTaxId => {
                self.customer.tax_id = digits_only(raw).chars().take(TAX_ID_MAX_DIGITS).collect()
            }
            Field::CustomerPhone => {
                self.customer.phone = digits_only(raw).chars().take(PHONE_MAX_DIGITS).collect()
            }
            Field::ItemDescription => self.entry.description = raw.to_string(),
            Field::ItemQuantity => self.entry.quantity = raw.to_string(),
            Field::ItemColor => self.entry.color = raw.to_string(),
            Field::Observations => self.observations = raw.to_string(),
            Field::TotalAmount => self.total_digits = digits_only(raw),
            Field::QuoteDate => {
                self.quote_date = if raw.trim().is_empty() {
                    String::new()
                } else {
                    normalize_date_input(raw)?
                };
            }
        }
        debug!(%field, "field updated");
        Ok(())
    }

    /// The value an input for `field` shows.
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::CustomerName => self.customer.name.clone(),
            Field::CustomerTaxId => self.customer.tax_id_display(),
            Field::CustomerPhone => self.customer.phone_display(),
            Field::ItemDescription => self.entry.description.clone(),
            Field::ItemQuantity => self.entry.quantity.clone(),
            Field::ItemColor => self.entry.color.clone(),
            Field::Observations => self.observations.clone(),
            Field::TotalAmount => self.total_amount_display().unwrap_or_default(),
            Field::QuoteDate => storage_to_display_date(&self.quote_date)
                .unwrap_or_else(|_| self.quote_date.clone()),
        }
    }

    // ------------------------------------------------------------------------
    // Item workflow
    // ------------------------------------------------------------------------

    /// Append the entry fields as a new item. Only valid while idle.
    pub fn add_item(&mut self) -> Result<(), WorkflowError> {
        if self.editing.is_some() {
            return Err(WorkflowError::NotIdle);
        }
        self.items.push(self.entry.to_item());
        self.entry.clear();
        debug!(count = self.items.len(), "item added");
        Ok(())
    }

    /// Load `items[index]` into the entry fields and start editing it.
    pub fn edit_item(&mut self, index: usize) -> Result<(), WorkflowError> {
        let item = self.items.get(index).ok_or(WorkflowError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        self.entry.load(item);
        self.editing = Some(index);
        debug!(index, "editing item");
        Ok(())
    }

    /// Write the entry fields back over the item being edited.
    pub fn save_item(&mut self) -> Result<(), WorkflowError> {
        let index = self.editing.ok_or(WorkflowError::NotEditing)?;
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(WorkflowError::IndexOutOfRange { index, len })?;
        *slot = self.entry.to_item();
        self.entry.clear();
        self.editing = None;
        debug!(index, "item saved");
        Ok(())
    }

    pub fn cancel_edit(&mut self) -> Result<(), WorkflowError> {
        if self.editing.is_none() {
            return Err(WorkflowError::NotEditing);
        }
        self.entry.clear();
        self.editing = None;
        debug!("edit cancelled");
        Ok(())
    }

    /// Remove `items[index]`.
    ///
    /// An edit in progress on this item or any later one is cancelled, since
    /// its index no longer names the item that was loaded.
    pub fn delete_item(&mut self, index: usize) -> Result<(), WorkflowError> {
        if index >= self.items.len() {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.remove(index);
        if matches!(self.editing, Some(editing) if editing >= index) {
            self.entry.clear();
            self.editing = None;
            debug!(index, "edit cancelled by delete");
        }
        debug!(index, count = self.items.len(), "item deleted");
        Ok(())
    }

    pub fn snapshot(&self) -> QuoteSnapshot {
        QuoteSnapshot {
            customer: self.customer.clone(),
            items: self.items.clone(),
            observations: self.observations.clone(),
            total_display: self.total_amount_display(),
            quote_date: self.quote_date.clone(),
        }
    }
}
