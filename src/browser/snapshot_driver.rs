use super::dom::{Document, NodeId};
use super::driver::{BrowserDriver, SelectOption};
use crate::forms::error::FormError;

// ============================================================================
// SnapshotDriver — offline driver over a saved document
// ============================================================================

/// Answers live queries from a fixed document instead of a browser.
///
/// Snapshots drop frame subtrees on request. Live queries see the whole
/// stored document; frame elements keep their positions either way.
///
/// Used to replay saved snapshots and in tests. Visibility and selection are
/// read from attributes: `hidden`, an inline `display:none` or
/// `visibility:hidden` style on the node or an ancestor, and `type=hidden`
/// hide a control; `checked` or `selected` select it.
#[derive(Debug, Clone)]
pub struct SnapshotDriver {
    document: Option<Document>,
}

impl SnapshotDriver {
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// A driver whose document can never be snapshotted.
    pub fn unavailable() -> Self {
        Self { document: None }
    }

    fn document(&self) -> Result<&Document, FormError> {
        self.document
            .as_ref()
            .ok_or_else(|| FormError::DocumentUnavailable("no snapshot loaded".into()))
    }

    fn locate(&self, locator: &str) -> Result<(&Document, NodeId), FormError> {
        let doc = self.document()?;
        let node = doc
            .find_node(locator)
            .ok_or_else(|| FormError::LiveControlUnavailable {
                locator: locator.to_string(),
                reason: "no such element".into(),
            })?;
        Ok((doc, node))
    }
}

fn hides(doc: &Document, node: NodeId) -> bool {
    let el = doc.element(node);
    if el.has_attribute("hidden") {
        return true;
    }
    if el.tag == "input" && el.attribute("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return true;
    }
    el.attribute("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

impl BrowserDriver for SnapshotDriver {
    fn current_document(&mut self, exclude_iframes: bool) -> Result<Document, FormError> {
        let doc = self.document()?;
        if exclude_iframes {
            Ok(doc.without_frames())
        } else {
            Ok(doc.clone())
        }
    }

    fn is_visible(&mut self, locator: &str) -> Result<bool, FormError> {
        let (doc, node) = self.locate(locator)?;
        let mut current = Some(node);
        while let Some(id) = current {
            if hides(doc, id) {
                return Ok(false);
            }
            current = doc.parent(id);
        }
        Ok(true)
    }

    fn is_selected(&mut self, locator: &str) -> Result<bool, FormError> {
        let (doc, node) = self.locate(locator)?;
        let el = doc.element(node);
        Ok(el.has_attribute("checked") || el.has_attribute("selected"))
    }

    fn list_options(&mut self, locator: &str) -> Result<Vec<SelectOption>, FormError> {
        let (doc, node) = self.locate(locator)?;
        Ok(doc
            .element(node)
            .children
            .iter()
            .filter(|c| doc.element(**c).tag == "option")
            .map(|c| SelectOption {
                text: doc.text_content(*c),
                value: doc.element(*c).attribute("value").map(str::to_string),
            })
            .collect())
    }
}
