//! Display-ready projections of extracted metadata.
//!
//! Both projections are pure: the IPTC one groups tags by section, the XMP one
//! rebuilds the XML tree with a text label per node. An extraction failure is
//! never propagated past them, it becomes a single placeholder entry instead.

mod iptc;
mod tree;

pub use iptc::{IptcListing, TagGroup, group_by_section, item_text, project_iptc};
pub use tree::{
    DisplayNode, cleared_tree, convert_tree, failed_xmp, label_for, project_xmp, to_display_node,
};

/// Text shown in an empty view.
pub const NONE_PLACEHOLDER: &str = "none";
