//! Cart Export
//!
//! Convenience export of the cart as JSON (items plus summary) or CSV, and
//! the matching JSON import. These are user-facing conveniences, not a
//! guaranteed interchange format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{items::CartItem, pricing::CartTotals};

/// Errors from export serialization or import parsing.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The payload could not be serialized or parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Full cart export payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartExport {
    /// The cart lines.
    pub items: Vec<CartItem>,

    /// Derived summary at export time.
    pub summary: CartTotals,

    /// When the export was produced.
    pub export_date: DateTime<Utc>,
}

impl CartExport {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export payload back from JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError::Json`] for malformed payloads.
    pub fn from_json(raw: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Render cart lines as CSV with a header row. Every field is quoted; quotes
/// inside fields are doubled.
#[must_use]
pub fn to_csv(items: &[CartItem]) -> String {
    let header = ["Name", "Price", "Quantity", "Total", "Category", "Brand"]
        .map(str::to_owned);

    let mut rows = vec![csv_row(&header)];

    for item in items {
        rows.push(csv_row(&[
            item.name.clone(),
            item.price.to_string(),
            item.quantity.to_string(),
            item.line_total().round_dp(2).to_string(),
            item.category.clone(),
            item.brand.clone(),
        ]));
    }

    rows.join("\n")
}

fn csv_row(fields: &[String; 6]) -> String {
    let quoted: Vec<String> = fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect();

    quoted.join(",")
}
