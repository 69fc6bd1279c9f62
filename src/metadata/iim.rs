use serde::Serialize;

use crate::error::ExtractionFailure;

/// Header of a JPEG APP13 segment holding Photoshop image resources.
pub(crate) const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const RESOURCE_SIGNATURE: &[u8] = b"8BIM";
/// Image resource id of the IPTC-IIM block.
const RESOURCE_IPTC: u16 = 0x0404;
const TAG_MARKER: u8 = 0x1C;
/// ISO 2022 escape designating UTF-8, carried by dataset 1:90.
const UTF8_DESIGNATION: &[u8] = b"\x1B%G";

/// One IPTC dataset as read from the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IptcTag {
    /// IIM record number.
    pub section: i32,
    /// Dataset name, or the dataset number when it has no well-known name.
    pub id: String,
    pub data: String,
}

impl IptcTag {
    pub fn new(section: i32, id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            section,
            id: id.into(),
            data: data.into(),
        }
    }
}

/// Join the bodies of APP13 segments that together hold one run of
/// Photoshop resources.
///
/// Large resources are split across consecutive segments, each repeating the
/// `Photoshop 3.0` header; the result has a single header followed by the
/// concatenated resource data.
pub fn join_resource_segments<'a>(segments: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut joined = PHOTOSHOP_HEADER.to_vec();
    for segment in segments {
        if let Some(body) = segment.strip_prefix(PHOTOSHOP_HEADER) {
            joined.extend_from_slice(body);
        }
    }
    joined
}

/// Pull the IPTC-IIM payloads out of an APP13 segment body.
///
/// Resources other than 0x0404 are skipped. A segment without the Photoshop
/// header yields nothing.
pub fn iptc_blocks(app13: &[u8]) -> Result<Vec<&[u8]>, ExtractionFailure> {
    let Some(mut data) = app13.strip_prefix(PHOTOSHOP_HEADER) else {
        return Ok(Vec::new());
    };

    let mut blocks = Vec::new();
    while data.len() >= 12 && data.starts_with(RESOURCE_SIGNATURE) {
        let resource_id = u16::from_be_bytes([data[4], data[5]]);
        // Pascal name: length byte + name, padded to even
        let name_len = data[6] as usize;
        let name_padded = if (name_len + 1) % 2 == 0 { name_len + 1 } else { name_len + 2 };
        let size_start = 6 + name_padded;
        if size_start + 4 > data.len() {
            return Err(ExtractionFailure::Malformed(
                "truncated image resource header".into(),
            ));
        }
        let size = u32::from_be_bytes([
            data[size_start],
            data[size_start + 1],
            data[size_start + 2],
            data[size_start + 3],
        ]) as usize;
        let body_start = size_start + 4;
        let body_end = body_start + size;
        if body_end > data.len() {
            return Err(ExtractionFailure::Malformed(format!(
                "image resource 0x{resource_id:04X} runs past the end of the segment"
            )));
        }

        if resource_id == RESOURCE_IPTC {
            blocks.push(&data[body_start..body_end]);
        }

        let next = if size % 2 == 0 { body_end } else { body_end + 1 };
        data = &data[next.min(data.len())..];
    }

    Ok(blocks)
}

/// Decode a block of IIM datasets into tags, in file order.
pub fn decode_datasets(mut data: &[u8]) -> Result<Vec<IptcTag>, ExtractionFailure> {
    let mut tags = Vec::new();
    let mut utf8 = false;

    while !data.is_empty() {
        // Some writers pad the block with zeros
        if data.iter().all(|&b| b == 0) {
            break;
        }
        if data[0] != TAG_MARKER {
            return Err(ExtractionFailure::Malformed(format!(
                "expected IPTC tag marker 0x1C, found 0x{:02X}",
                data[0]
            )));
        }
        if data.len() < 5 {
            return Err(ExtractionFailure::Malformed("truncated IPTC dataset header".into()));
        }

        let record = data[1];
        let dataset = data[2];
        let raw_len = u16::from_be_bytes([data[3], data[4]]);
        let mut pos = 5;

        let len = if raw_len & 0x8000 != 0 {
            // Extended dataset: low bits give the size of the length field
            let width = (raw_len & 0x7FFF) as usize;
            if width == 0 || width > 4 || pos + width > data.len() {
                return Err(ExtractionFailure::Malformed(format!(
                    "invalid extended length in dataset {record}:{dataset}"
                )));
            }
            let len = data[pos..pos + width]
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | b as usize);
            pos += width;
            len
        } else {
            raw_len as usize
        };

        if pos + len > data.len() {
            return Err(ExtractionFailure::Malformed(format!(
                "dataset {record}:{dataset} runs past the end of the IPTC block"
            )));
        }

        let value = &data[pos..pos + len];
        if (record, dataset) == (1, 90) {
            utf8 = value
                .windows(UTF8_DESIGNATION.len())
                .any(|w| w == UTF8_DESIGNATION);
        }
        tags.push(IptcTag {
            section: record as i32,
            id: dataset_name(record, dataset)
                .map(str::to_string)
                .unwrap_or_else(|| dataset.to_string()),
            data: format_value(record, dataset, value, utf8),
        });

        data = &data[pos + len..];
    }

    Ok(tags)
}

/// Datasets whose payload is a big-endian binary number.
fn is_numeric(record: u8, dataset: u8) -> bool {
    matches!(
        (record, dataset),
        (1, 0) | (1, 20) | (1, 22) | (1, 120) | (1, 122) | (2, 0) | (2, 200) | (2, 201)
    )
}

/// Datasets that are never text.
fn is_binary(record: u8, dataset: u8) -> bool {
    matches!((record, dataset), (1, 90) | (2, 202))
}

fn format_value(record: u8, dataset: u8, value: &[u8], utf8: bool) -> String {
    if is_numeric(record, dataset) && !value.is_empty() && value.len() <= 4 {
        let n = value.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
        return n.to_string();
    }
    if is_binary(record, dataset) {
        return value
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
    }
    let text = match std::str::from_utf8(value) {
        Ok(s) => s.to_string(),
        Err(_) if utf8 => String::from_utf8_lossy(value).into_owned(),
        // No UTF-8 designation: legacy IIM text is ISO-8859-1
        Err(_) => value.iter().map(|&b| b as char).collect(),
    };
    text.trim_end_matches('\0').to_string()
}

fn dataset_name(record: u8, dataset: u8) -> Option<&'static str> {
    let name = match (record, dataset) {
        (1, 0) => "ModelVersion",
        (1, 5) => "Destination",
        (1, 20) => "FileFormat",
        (1, 22) => "FileVersion",
        (1, 30) => "ServiceIdentifier",
        (1, 40) => "EnvelopeNumber",
        (1, 50) => "ProductID",
        (1, 60) => "EnvelopePriority",
        (1, 70) => "DateSent",
        (1, 80) => "TimeSent",
        (1, 90) => "CodedCharacterSet",
        (1, 100) => "UniqueObjectName",
        (1, 120) => "ARMIdentifier",
        (1, 122) => "ARMVersion",
        (2, 0) => "RecordVersion",
        (2, 3) => "ObjectTypeReference",
        (2, 4) => "ObjectAttributeReference",
        (2, 5) => "ObjectName",
        (2, 7) => "EditStatus",
        (2, 10) => "Urgency",
        (2, 12) => "SubjectReference",
        (2, 15) => "Category",
        (2, 20) => "SupplementalCategories",
        (2, 22) => "FixtureIdentifier",
        (2, 25) => "Keywords",
        (2, 26) => "ContentLocationCode",
        (2, 27) => "ContentLocationName",
        (2, 30) => "ReleaseDate",
        (2, 35) => "ReleaseTime",
        (2, 37) => "ExpirationDate",
        (2, 38) => "ExpirationTime",
        (2, 40) => "SpecialInstructions",
        (2, 42) => "ActionAdvised",
        (2, 45) => "ReferenceService",
        (2, 47) => "ReferenceDate",
        (2, 50) => "ReferenceNumber",
        (2, 55) => "DateCreated",
        (2, 60) => "TimeCreated",
        (2, 62) => "DigitalCreationDate",
        (2, 63) => "DigitalCreationTime",
        (2, 65) => "OriginatingProgram",
        (2, 70) => "ProgramVersion",
        (2, 75) => "ObjectCycle",
        (2, 80) => "By-line",
        (2, 85) => "By-lineTitle",
        (2, 90) => "City",
        (2, 92) => "Sub-location",
        (2, 95) => "Province-State",
        (2, 100) => "Country-PrimaryLocationCode",
        (2, 101) => "Country-PrimaryLocationName",
        (2, 103) => "OriginalTransmissionReference",
        (2, 105) => "Headline",
        (2, 110) => "Credit",
        (2, 115) => "Source",
        (2, 116) => "CopyrightNotice",
        (2, 118) => "Contact",
        (2, 120) => "Caption-Abstract",
        (2, 122) => "Writer-Editor",
        (2, 130) => "ImageType",
        (2, 131) => "ImageOrientation",
        (2, 135) => "LanguageIdentifier",
        (2, 200) => "ObjectPreviewFileFormat",
        (2, 201) => "ObjectPreviewFileVersion",
        (2, 202) => "ObjectPreviewData",
        _ => return None,
    };
    Some(name)
}
