use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::info;

use crate::forms::error::FormError;
use crate::forms::form_model::{ElementClone, FormInput, InputType};

// ============================================================================
// Wire model: nested element tree as produced by the browser helper
// ============================================================================

/// One element of a serialized DOM tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Text of the element's own text children
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

impl DomNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }
}

// ============================================================================
// Document snapshot
// ============================================================================

pub type NodeId = usize;

/// Element stored in a snapshot, with links to its neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Immutable snapshot of a document, nodes stored in document order.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    nodes: Vec<Element>,
}

fn is_frame(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("iframe") || tag.eq_ignore_ascii_case("frame")
}

impl Document {
    /// Flatten a serialized tree. With `exclude_iframes`, frame elements are
    /// kept but their subtrees are dropped.
    pub fn from_root(root: &DomNode, exclude_iframes: bool) -> Self {
        let mut doc = Document { nodes: Vec::new() };
        doc.push(root, None, exclude_iframes);
        doc
    }

    pub fn from_json(value: serde_json::Value, exclude_iframes: bool) -> Result<Self, FormError> {
        let root: DomNode = serde_json::from_value(value).map_err(|e| FormError::JsonParse {
            context: "document snapshot".into(),
            source: e,
        })?;
        Ok(Self::from_root(&root, exclude_iframes))
    }

    fn push(&mut self, node: &DomNode, parent: Option<NodeId>, exclude_iframes: bool) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Element {
            tag: node.tag.to_lowercase(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            parent,
            children: Vec::new(),
        });

        if !(exclude_iframes && is_frame(&node.tag)) {
            for child in &node.children {
                let child_id = self.push(child, Some(id), exclude_iframes);
                self.nodes[id].children.push(child_id);
            }
        }
        id
    }

    /// Rebuild the nested tree below `id`.
    pub fn to_node(&self, id: NodeId) -> DomNode {
        let el = &self.nodes[id];
        DomNode {
            tag: el.tag.clone(),
            attributes: el.attributes.clone(),
            text: el.text.clone(),
            children: el.children.iter().map(|c| self.to_node(*c)).collect(),
        }
    }

    /// Copy of this snapshot with frame subtrees dropped.
    pub fn without_frames(&self) -> Document {
        Document::from_root(&self.to_node(self.root()), true)
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// The `id` attribute if set, else the `name` attribute.
    pub fn identifying_name(&self, id: NodeId) -> Option<&str> {
        let el = &self.nodes[id];
        el.attribute("id").or_else(|| el.attribute("name"))
    }

    pub fn input_type(&self, id: NodeId) -> InputType {
        let el = &self.nodes[id];
        InputType::from_control(&el.tag, el.attribute("type"))
    }

    /// Concatenated text of the element and its descendants, whitespace collapsed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let el = &self.nodes[id];
        if let Some(text) = &el.text {
            out.push_str(text);
            out.push(' ');
        }
        for child in &el.children {
            self.collect_text(*child, out);
        }
    }

    /// First element in document order satisfying `predicate`.
    pub fn find_element(&self, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.nodes.iter().position(predicate)
    }

    /// First element whose `name` or `id` attribute satisfies `predicate`.
    pub fn find_by_identity(&self, predicate: impl Fn(&str) -> bool) -> Option<NodeId> {
        self.find_element(|el| {
            el.attribute("name").is_some_and(&predicate) || el.attribute("id").is_some_and(&predicate)
        })
    }

    /// First element in document order whose `name` or `id` equals `name`.
    pub fn find_by_name_or_id(&self, name: &str) -> Option<NodeId> {
        self.find_by_identity(|value| value == name)
    }

    /// First `tag` element whose `name` or `id` equals `name`.
    pub fn find_control(&self, tag: &str, name: &str) -> Option<NodeId> {
        self.find_element(|el| {
            el.tag.eq_ignore_ascii_case(tag)
                && (el.attribute("name") == Some(name) || el.attribute("id") == Some(name))
        })
    }

    /// Snapshot node a resolved form input refers to.
    pub fn belonging_node(&self, input: &FormInput) -> Option<NodeId> {
        let tag = match input.input_type {
            InputType::Select => "select",
            InputType::Textarea => "textarea",
            _ => "input",
        };
        let node = self.find_control(tag, &input.name);
        if node.is_none() {
            info!("Cannot find element {} id/name: {}", tag.to_uppercase(), input.name);
        }
        node
    }

    /// Absolute positional XPath, e.g. `/HTML[1]/BODY[1]/FORM[1]/INPUT[2]`.
    pub fn locator_of(&self, id: NodeId) -> String {
        let mut steps = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let el = &self.nodes[node];
            steps.push(format!("{}[{}]", el.tag.to_uppercase(), self.position_among_siblings(node)));
            current = el.parent;
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// 1-based position among same-tag siblings.
    fn position_among_siblings(&self, id: NodeId) -> usize {
        let tag = &self.nodes[id].tag;
        match self.nodes[id].parent {
            Some(parent) => {
                self.nodes[parent]
                    .children
                    .iter()
                    .take_while(|c| **c != id)
                    .filter(|c| &self.nodes[**c].tag == tag)
                    .count()
                    + 1
            }
            None => 1,
        }
    }

    /// Resolve an absolute positional XPath produced by `locator_of`.
    ///
    /// Steps without a position predicate select the first match.
    pub fn find_node(&self, xpath: &str) -> Option<NodeId> {
        let path = xpath.strip_prefix('/')?;
        let mut steps = path.split('/');

        let (root_tag, root_pos) = parse_step(steps.next()?)?;
        if root_pos != 1 || !self.nodes.first()?.tag.eq_ignore_ascii_case(root_tag) {
            return None;
        }

        let mut current = self.root();
        for step in steps {
            let (tag, pos) = parse_step(step)?;
            current = *self.nodes[current]
                .children
                .iter()
                .filter(|c| self.nodes[**c].tag.eq_ignore_ascii_case(tag))
                .nth(pos - 1)?;
        }
        Some(current)
    }

    /// Shallow copy of an element: attributes and full text content.
    pub fn clone_element(&self, id: NodeId) -> ElementClone {
        let el = &self.nodes[id];
        ElementClone {
            tag: el.tag.clone(),
            attributes: el.attributes.clone(),
            text: self.text_content(id),
        }
    }

    /// SHA-1 of the snapshot's canonical JSON.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(&self.nodes).unwrap_or_default();
        let mut hasher = Sha1::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Parse `TAG[n]` or `TAG` into tag and 1-based position.
fn parse_step(step: &str) -> Option<(&str, usize)> {
    match step.split_once('[') {
        Some((tag, rest)) => {
            let pos: usize = rest.strip_suffix(']')?.parse().ok()?;
            (pos > 0 && !tag.is_empty()).then_some((tag, pos))
        }
        None => (!step.is_empty()).then_some((step, 1)),
    }
}
