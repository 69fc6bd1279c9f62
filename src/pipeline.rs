use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ExtractionFailure;
use crate::metadata::{self, IptcTag, XmlNode};
use crate::projection::{self, DisplayNode, IptcListing};

/// Extensions of the files metadata can be read from.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    // IPTC + XMP
    "jpg", "jpeg",
    // XMP in iTXt
    "png",
    // XMP sidecar
    "xmp",
];

/// How metadata is stored in a file, determined by its extension.
///
/// # Example
///
/// ```rust
/// use metadata_viewer::pipeline::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("photo.JPG")), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_path(Path::new("photo.xmp")), Some(ImageKind::Sidecar));
/// assert_eq!(ImageKind::from_path(Path::new("photo.bmp")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageKind {
    /// JPEG: IPTC in APP13, XMP in APP1
    Jpeg,
    /// PNG: XMP in an iTXt chunk, no IPTC
    Png,
    /// Standalone `.xmp` file
    Sidecar,
}

impl ImageKind {
    /// Determine the kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "xmp" => Some(Self::Sidecar),
            _ => None,
        }
    }
}

/// Where metadata comes from.
///
/// [`ImageFileSource`] reads real files; tests and embedders can supply their own.
pub trait MetadataSource {
    fn read_iptc(&self, path: &Path) -> Result<Vec<IptcTag>, ExtractionFailure>;
    fn read_xmp(&self, path: &Path) -> Result<Option<XmlNode>, ExtractionFailure>;
}

/// Reads metadata from image files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileSource;

impl MetadataSource for ImageFileSource {
    fn read_iptc(&self, path: &Path) -> Result<Vec<IptcTag>, ExtractionFailure> {
        metadata::read_iptc(path)
    }

    fn read_xmp(&self, path: &Path) -> Result<Option<XmlNode>, ExtractionFailure> {
        metadata::read_xmp(path)
    }
}

/// Everything the viewer shows for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataReport {
    pub path: PathBuf,
    pub kind: Option<ImageKind>,
    pub iptc: IptcListing,
    pub xmp: Vec<DisplayNode>,
}

impl MetadataReport {
    /// Both views reset to the "none" placeholder.
    pub fn cleared(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: ImageKind::from_path(path),
            iptc: IptcListing::none(),
            xmp: projection::cleared_tree(),
        }
    }
}

/// Read and project the IPTC and XMP metadata of one file.
///
/// The two reads are independent: a failure in one shows up as its placeholder
/// and does not stop the other.
pub fn load_metadata(source: &dyn MetadataSource, path: &Path) -> MetadataReport {
    log::info!("Loading metadata: {}", path.display());

    let iptc = projection::project_iptc(source.read_iptc(path));
    let xmp = projection::project_xmp(source.read_xmp(path));

    log::debug!(
        "{}: {} IPTC tag(s), {} XMP node(s)",
        path.display(),
        iptc.tag_count(),
        xmp.iter().map(DisplayNode::node_count).sum::<usize>()
    );

    MetadataReport {
        path: path.to_path_buf(),
        kind: ImageKind::from_path(path),
        iptc,
        xmp,
    }
}

/// Collect files with one of `extensions` from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks).
pub fn collect_images(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if has_extension(path, extensions) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && has_extension(p, extensions) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has one of the given extensions (case-insensitive).
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn default_extensions() -> Vec<String> {
        IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    /// A source with canned answers that counts how often it is asked.
    struct StubSource {
        iptc: fn() -> Result<Vec<IptcTag>, ExtractionFailure>,
        xmp: fn() -> Result<Option<XmlNode>, ExtractionFailure>,
        calls: Cell<usize>,
    }

    impl MetadataSource for StubSource {
        fn read_iptc(&self, _path: &Path) -> Result<Vec<IptcTag>, ExtractionFailure> {
            self.calls.set(self.calls.get() + 1);
            (self.iptc)()
        }

        fn read_xmp(&self, _path: &Path) -> Result<Option<XmlNode>, ExtractionFailure> {
            self.calls.set(self.calls.get() + 1);
            (self.xmp)()
        }
    }

    fn locked<T>() -> Result<T, ExtractionFailure> {
        Err(ExtractionFailure::message("file locked"))
    }

    fn some_tags() -> Result<Vec<IptcTag>, ExtractionFailure> {
        Ok(vec![IptcTag::new(2, "Keywords", "sea"), IptcTag::new(1, "ModelVersion", "4")])
    }

    fn some_xmp() -> Result<Option<XmlNode>, ExtractionFailure> {
        Ok(Some(XmlNode::document().with_child(XmlNode::element("x:xmpmeta"))))
    }

    // ── ImageKind::from_path ──────────────────────────────────────────

    #[test]
    fn image_kind_jpeg() {
        assert_eq!(ImageKind::from_path(Path::new("photo.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("photo.jpeg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("PHOTO.JPG")), Some(ImageKind::Jpeg));
    }

    #[test]
    fn image_kind_png_and_sidecar() {
        assert_eq!(ImageKind::from_path(Path::new("image.PNG")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("photo.xmp")), Some(ImageKind::Sidecar));
    }

    #[test]
    fn image_kind_unsupported() {
        assert_eq!(ImageKind::from_path(Path::new("doc.pdf")), None);
        assert_eq!(ImageKind::from_path(Path::new("noext")), None);
    }

    // ── load_metadata ────────────────────────────────────────────────

    #[test]
    fn load_projects_both_views() {
        let source = StubSource { iptc: some_tags, xmp: some_xmp, calls: Cell::new(0) };
        let report = load_metadata(&source, Path::new("photo.jpg"));

        assert_eq!(report.kind, Some(ImageKind::Jpeg));
        assert_eq!(report.iptc.tag_count(), 2);
        assert_eq!(report.xmp.len(), 1);
        assert_eq!(report.xmp[0].label, "#document");
        assert_eq!(report.xmp[0].children[0].label, "<x:xmpmeta>");
    }

    #[test]
    fn iptc_failure_does_not_stop_xmp() {
        let source = StubSource { iptc: locked, xmp: some_xmp, calls: Cell::new(0) };
        let report = load_metadata(&source, Path::new("photo.jpg"));

        assert_eq!(source.calls.get(), 2);
        assert_eq!(
            report.iptc,
            IptcListing::Message("Failed to read IPTC metadata. Error: file locked".into())
        );
        assert_eq!(report.xmp[0].label, "#document");
    }

    #[test]
    fn xmp_failure_does_not_affect_iptc() {
        let source = StubSource { iptc: some_tags, xmp: locked, calls: Cell::new(0) };
        let report = load_metadata(&source, Path::new("photo.jpg"));

        assert_eq!(report.iptc.tag_count(), 2);
        assert_eq!(
            report.xmp,
            vec![DisplayNode::leaf("Failed to read XMP metadata. Error: file locked")]
        );
    }

    #[test]
    fn loading_twice_gives_equal_reports() {
        let source = StubSource { iptc: some_tags, xmp: some_xmp, calls: Cell::new(0) };
        let first = load_metadata(&source, Path::new("a.jpg"));
        let second = load_metadata(&source, Path::new("a.jpg"));
        assert_eq!(first, second);
    }

    #[test]
    fn cleared_report_shows_none() {
        let report = MetadataReport::cleared(Path::new("a.png"));
        assert_eq!(report.iptc, IptcListing::Message("none".into()));
        assert_eq!(report.xmp, vec![DisplayNode::leaf("none")]);
    }

    #[test]
    fn file_source_reads_sidecar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.xmp");
        fs::write(&path, "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>").unwrap();

        let report = load_metadata(&ImageFileSource, &path);
        assert_eq!(report.iptc, IptcListing::Groups(Vec::new()));
        let meta = &report.xmp[0].children[0];
        assert_eq!(meta.label, "<x:xmpmeta>");
        assert_eq!(meta.children[0].label, "ATTRIBUTE: xmlns:x");
        assert_eq!(meta.children[0].children[0].label, "adobe:ns:meta/");
    }

    // ── collect_images ───────────────────────────────────────────────

    #[test]
    fn collect_images_single_file() {
        let dir = TempDir::new().unwrap();
        let jpg = dir.path().join("test.jpg");
        fs::write(&jpg, b"fake").unwrap();

        let images = collect_images(&[jpg.clone()], &default_extensions());
        assert_eq!(images, vec![jpg]);
    }

    #[test]
    fn collect_images_skips_unsupported() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("readme.txt");
        fs::write(&txt, b"hello").unwrap();

        assert!(collect_images(&[txt], &default_extensions()).is_empty());
    }

    #[test]
    fn collect_images_directory_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(sub.join("b.png"), b"fake").unwrap();
        fs::write(sub.join("b.xmp"), b"fake").unwrap();
        fs::write(sub.join("c.txt"), b"fake").unwrap();

        let images = collect_images(&[dir.path().to_path_buf()], &default_extensions());
        assert_eq!(images.len(), 3);
    }

    #[test]
    fn collect_images_custom_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.png"), b"fake").unwrap();

        let images = collect_images(&[dir.path().to_path_buf()], &["PNG".to_string()]);
        assert_eq!(images, vec![dir.path().join("b.png")]);
    }

    #[test]
    fn collect_images_nonexistent_path() {
        let images = collect_images(&[PathBuf::from("/nonexistent/path")], &default_extensions());
        assert!(images.is_empty());
    }
}
