//! # metadata-viewer
//!
//! Read the IPTC and XMP metadata embedded in an image and turn it into
//! display-ready structures: IPTC tags grouped by section, and the XMP packet
//! as a labeled tree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metadata_viewer::pipeline::{load_metadata, ImageFileSource};
//! use metadata_viewer::render::{iptc_lines, tree_lines};
//! use std::path::Path;
//!
//! let report = load_metadata(&ImageFileSource, Path::new("photo.jpg"));
//!
//! for line in iptc_lines(&report.iptc, 2) {
//!     println!("{line}");
//! }
//! for line in tree_lines(&report.xmp, 2) {
//!     println!("{line}");
//! }
//! ```
//!
//! Extraction failures never escape [`pipeline::load_metadata`]: each view
//! independently shows a single `Failed to read ... metadata. Error: ...` entry.
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use metadata_viewer::metadata::{read_iptc, read_xmp};
//! use metadata_viewer::projection::{convert_tree, group_by_section};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), metadata_viewer::ExtractionFailure> {
//! let path = Path::new("photo.jpg");
//!
//! for group in group_by_section(&read_iptc(path)?) {
//!     println!("{} ({} tags)", group.header(), group.tags.len());
//! }
//!
//! let tree = convert_tree(read_xmp(path)?.as_ref());
//! println!("{} top-level node(s)", tree.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Files
//!
//! | Format | IPTC | XMP |
//! |--------|------|-----|
//! | JPEG (`.jpg`, `.jpeg`) | APP13 Photoshop resource 0x0404 | APP1 |
//! | PNG (`.png`) | - | `iTXt` `XML:com.adobe.xmp` |
//! | Sidecar (`.xmp`) | - | whole file |
//!
//! ## Modules
//!
//! - [`metadata`]: IPTC-IIM and XMP extraction
//! - [`projection`]: IPTC grouping and XMP tree conversion
//! - [`pipeline`]: file kinds, file collection and the load operation
//! - [`render`]: plain-text rendering of the projections
//! - [`config`]: configuration types and loading/saving

pub mod config;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod projection;
pub mod render;

pub use error::ExtractionFailure;
