use serde::Serialize;

use crate::error::ExtractionFailure;
use crate::metadata::{NodeKind, XmlNode};

/// A node of the tree handed to a tree widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayNode {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::node_count).sum::<usize>()
    }
}

/// Label shown for an XML node.
pub fn label_for(node: &XmlNode) -> String {
    match node.kind {
        NodeKind::ProcessingInstruction | NodeKind::Declaration => {
            format!("<?{} {}?>", node.name, node.value)
        }
        NodeKind::Element => format!("<{}>", node.name),
        NodeKind::Attribute => format!("ATTRIBUTE: {}", node.name),
        NodeKind::Text | NodeKind::CData => node.value.clone(),
        NodeKind::Comment => format!("<!--{}-->", node.value),
        NodeKind::Document | NodeKind::DocumentType => node.name.clone(),
    }
}

/// Rebuild an XML subtree as a display tree, attributes before children.
pub fn to_display_node(node: &XmlNode) -> DisplayNode {
    DisplayNode {
        label: label_for(node),
        children: node
            .attributes
            .iter()
            .chain(&node.children)
            .map(to_display_node)
            .collect(),
    }
}

/// Convert an optional XML root into the top level of a display tree.
///
/// An absent root gives an empty tree.
pub fn convert_tree(root: Option<&XmlNode>) -> Vec<DisplayNode> {
    root.map(to_display_node).into_iter().collect()
}

/// Turn the outcome of an XMP read into what the tree view shows.
pub fn project_xmp(result: Result<Option<XmlNode>, ExtractionFailure>) -> Vec<DisplayNode> {
    match result {
        Ok(root) => convert_tree(root.as_ref()),
        Err(err) => {
            log::warn!("Failed to read XMP metadata: {err}");
            vec![failed_xmp(&err)]
        }
    }
}

pub fn failed_xmp(err: &ExtractionFailure) -> DisplayNode {
    DisplayNode::leaf(format!("Failed to read XMP metadata. Error: {err}"))
}

/// The cleared tree, shown before a file has been loaded.
pub fn cleared_tree() -> Vec<DisplayNode> {
    vec![DisplayNode::leaf(super::NONE_PLACEHOLDER)]
}
