use img_parts::Bytes;
use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::png::Png;
use std::path::Path;

use super::dom::{XmlNode, parse_xmp_document};
use super::iim::{IptcTag, PHOTOSHOP_HEADER, decode_datasets, iptc_blocks, join_resource_segments};
use crate::error::ExtractionFailure;
use crate::pipeline::ImageKind;

const MARKER_APP1: u8 = 0xE1;
const MARKER_APP13: u8 = 0xED;
/// XMP namespace identifier at the start of a JPEG APP1 segment.
const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
/// PNG iTXt keyword for an embedded XMP packet.
const PNG_XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";
const PNG_ITXT: [u8; 4] = *b"iTXt";

/// Read the IPTC datasets of an image, in file order.
///
/// Consecutive Photoshop APP13 segments are joined before their resources are
/// walked. PNG files and XMP sidecars never carry IPTC-IIM, so they yield an
/// empty list.
pub fn read_iptc(path: &Path) -> Result<Vec<IptcTag>, ExtractionFailure> {
    match kind_of(path)? {
        ImageKind::Jpeg => {
            let jpeg = load_jpeg(path)?;
            let is_photoshop = |s: &JpegSegment| {
                s.marker() == MARKER_APP13 && s.contents().starts_with(PHOTOSHOP_HEADER)
            };

            let mut tags = Vec::new();
            for run in jpeg
                .segments()
                .chunk_by(|a, b| is_photoshop(a) && is_photoshop(b))
                .filter(|run| is_photoshop(&run[0]))
            {
                let resources = join_resource_segments(run.iter().map(|s| &s.contents()[..]));
                for block in iptc_blocks(&resources)? {
                    tags.extend(decode_datasets(block)?);
                }
            }
            log::debug!("{} IPTC dataset(s) in {}", tags.len(), path.display());
            Ok(tags)
        }
        ImageKind::Png | ImageKind::Sidecar => Ok(Vec::new()),
    }
}

/// Read the XMP packet of an image as a generic XML tree.
///
/// Returns `Ok(None)` when the file has no XMP packet.
pub fn read_xmp(path: &Path) -> Result<Option<XmlNode>, ExtractionFailure> {
    let packet = match kind_of(path)? {
        ImageKind::Jpeg => jpeg_xmp_packet(&load_jpeg(path)?),
        ImageKind::Png => png_xmp_packet(&load_png(path)?)?,
        ImageKind::Sidecar => Some(std::fs::read(path)?),
    };

    let Some(packet) = packet else {
        log::debug!("No XMP packet found in {}", path.display());
        return Ok(None);
    };

    let xml = String::from_utf8_lossy(&packet);
    // Packets are often padded with NULs up to the segment size
    let xml = xml.trim_end_matches('\0');
    parse_xmp_document(xml).map(Some)
}

fn kind_of(path: &Path) -> Result<ImageKind, ExtractionFailure> {
    ImageKind::from_path(path).ok_or_else(|| {
        ExtractionFailure::UnsupportedFormat(
            path.extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        )
    })
}

fn load_jpeg(path: &Path) -> Result<Jpeg, ExtractionFailure> {
    let bytes = std::fs::read(path)?;
    Jpeg::from_bytes(Bytes::from(bytes))
        .map_err(|e| ExtractionFailure::Malformed(format!("not a readable JPEG: {e}")))
}

fn load_png(path: &Path) -> Result<Png, ExtractionFailure> {
    let bytes = std::fs::read(path)?;
    Png::from_bytes(Bytes::from(bytes))
        .map_err(|e| ExtractionFailure::Malformed(format!("not a readable PNG: {e}")))
}

fn jpeg_xmp_packet(jpeg: &Jpeg) -> Option<Vec<u8>> {
    jpeg.segments()
        .iter()
        .filter(|s| s.marker() == MARKER_APP1)
        .find_map(|s| {
            s.contents()
                .strip_prefix(XMP_NAMESPACE)
                .map(<[u8]>::to_vec)
        })
}

fn png_xmp_packet(png: &Png) -> Result<Option<Vec<u8>>, ExtractionFailure> {
    for chunk in png.chunks() {
        if chunk.kind() != PNG_ITXT {
            continue;
        }
        if let Some(text) = itxt_text(chunk.contents(), PNG_XMP_KEYWORD)? {
            return Ok(Some(text.to_vec()));
        }
    }
    Ok(None)
}

/// Return the text of an iTXt chunk if its keyword matches.
///
/// Layout: keyword NUL, compression flag, compression method,
/// language tag NUL, translated keyword NUL, text.
fn itxt_text<'a>(data: &'a [u8], keyword: &[u8]) -> Result<Option<&'a [u8]>, ExtractionFailure> {
    let Some(key_end) = data.iter().position(|&b| b == 0) else {
        return Ok(None);
    };
    if &data[..key_end] != keyword {
        return Ok(None);
    }

    let rest = &data[key_end + 1..];
    if rest.len() < 2 {
        return Err(ExtractionFailure::Malformed("truncated iTXt chunk".into()));
    }
    if rest[0] != 0 {
        return Err(ExtractionFailure::Malformed(
            "compressed XMP iTXt chunks are not supported".into(),
        ));
    }

    let mut rest = &rest[2..];
    // language tag, then translated keyword
    for _ in 0..2 {
        let end = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            ExtractionFailure::Malformed("unterminated iTXt header field".into())
        })?;
        rest = &rest[end + 1..];
    }
    Ok(Some(rest))
}
