//! IPTC and XMP metadata extraction.
//!
//! - [`read_iptc`]: IPTC-IIM datasets from JPEG APP13 (Photoshop 8BIM resources)
//! - [`read_xmp`]: the XMP packet of a JPEG, PNG or `.xmp` sidecar as a generic XML tree
//!
//! Nothing here interprets the metadata: tags come back in file order with their
//! raw values, and the XMP tree keeps every node of the packet.

mod dom;
mod iim;
mod reader;

pub use dom::{NodeKind, XmlNode, parse_xmp_document};
pub use iim::{IptcTag, decode_datasets, iptc_blocks, join_resource_segments};
pub use reader::{read_iptc, read_xmp};
