//! Plain-text rendering of the projections, for the terminal and for logs.

use crate::projection::{DisplayNode, IptcListing, item_text};

/// Lines of the IPTC list: a header per section with its items indented below.
pub fn iptc_lines(listing: &IptcListing, indent: usize) -> Vec<String> {
    match listing {
        IptcListing::Message(text) => vec![text.clone()],
        IptcListing::Groups(groups) => {
            let pad = " ".repeat(indent);
            let mut lines = Vec::new();
            for group in groups {
                lines.push(group.header());
                lines.extend(group.tags.iter().map(|t| format!("{pad}{}", item_text(t))));
            }
            lines
        }
    }
}

/// Lines of the tree in pre-order, `indent` spaces per level.
pub fn tree_lines(nodes: &[DisplayNode], indent: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for node in nodes {
        push_node(&mut lines, node, 0, indent);
    }
    lines
}

fn push_node(lines: &mut Vec<String>, node: &DisplayNode, depth: usize, indent: usize) {
    lines.push(format!("{}{}", " ".repeat(depth * indent), node.label));
    for child in &node.children {
        push_node(lines, child, depth + 1, indent);
    }
}
