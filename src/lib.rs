//! Quote (orçamento) builder for Vidraçaria Ambires.
//!
//! A [`QuoteDraft`] holds the customer, the line items and the footer fields
//! while they are edited. [`generate_quote`] lays out a snapshot of it and
//! writes the PDF.

pub mod draft;
pub mod error;
pub mod format;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod session;

use std::path::{Path, PathBuf};
use tracing::info;

pub use draft::{CustomerRecord, Field, LineItem, QuoteDraft, QuoteSnapshot};
pub use error::{AppError, WorkflowError};
pub use layout::Layout;
pub use render::{render_quote, Document, DrawOp};

/// `orcamento<date>.pdf`, or `orcamento.pdf` for an undated quote.
pub fn quote_file_name(quote_date: &str) -> String {
    format!("orcamento{}.pdf", quote_date)
}

/// Render `draft` into `output_path`.
///
/// The draft is only read, so a failure leaves it exactly as it was.
pub fn generate_quote_to(draft: &QuoteDraft, output_path: &Path) -> Result<Document, AppError> {
    let snapshot = draft.snapshot();
    let document = render_quote(&snapshot, &Layout::default())?;
    pdf::write_pdf(&document, output_path)?;
    info!(
        path = %output_path.display(),
        items = snapshot.items.len(),
        pages = document.pages.len(),
        "quote generated"
    );
    Ok(document)
}

/// Render `draft` into `out_dir`, named after the quote date.
pub fn generate_quote(draft: &QuoteDraft, out_dir: &Path) -> Result<PathBuf, AppError> {
    let path = out_dir.join(quote_file_name(draft.quote_date()));
    generate_quote_to(draft, &path)?;
    Ok(path)
}
