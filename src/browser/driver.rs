use serde::{Deserialize, Serialize};

use super::dom::Document;
use crate::forms::error::FormError;

/// One entry of a live `<select>` control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    #[serde(default)]
    pub value: Option<String>,
}

// ============================================================================
// BrowserDriver trait — live DOM access consumed by form filling
// ============================================================================

/// Live browser queries. Controls are addressed by the absolute XPath
/// `Document::locator_of` produces for them.
///
/// Every query may fail with `LiveControlUnavailable` when the control is
/// gone or stale.
pub trait BrowserDriver {
    /// Snapshot the current document, optionally without frame subtrees.
    fn current_document(&mut self, exclude_iframes: bool) -> Result<Document, FormError>;

    fn is_visible(&mut self, locator: &str) -> Result<bool, FormError>;

    fn is_selected(&mut self, locator: &str) -> Result<bool, FormError>;

    /// Options of a select control, in document order.
    fn list_options(&mut self, locator: &str) -> Result<Vec<SelectOption>, FormError>;
}
