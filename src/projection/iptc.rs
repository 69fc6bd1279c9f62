use serde::Serialize;
use std::collections::HashMap;

use crate::error::ExtractionFailure;
use crate::metadata::IptcTag;

/// The IPTC tags of one section, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub section: i32,
    pub tags: Vec<IptcTag>,
}

impl TagGroup {
    /// Group heading shown in the list view.
    pub fn header(&self) -> String {
        format!("Section: {}", self.section)
    }
}

/// Text of a single IPTC list entry.
pub fn item_text(tag: &IptcTag) -> String {
    format!("{}: {}", tag.id, tag.data)
}

/// What the IPTC list view shows: the grouped tags, or a single line of text
/// in their place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IptcListing {
    Groups(Vec<TagGroup>),
    Message(String),
}

impl IptcListing {
    /// The cleared state, shown before a file has been loaded.
    pub fn none() -> Self {
        Self::Message(super::NONE_PLACEHOLDER.to_string())
    }

    pub fn failed(err: &ExtractionFailure) -> Self {
        Self::Message(format!("Failed to read IPTC metadata. Error: {err}"))
    }

    /// Total number of tags across all groups.
    pub fn tag_count(&self) -> usize {
        match self {
            Self::Groups(groups) => groups.iter().map(|g| g.tags.len()).sum(),
            Self::Message(_) => 0,
        }
    }
}

/// Group tags by section in a single pass.
///
/// Groups appear in the order their section is first seen; tags keep their
/// relative order inside each group.
pub fn group_by_section(tags: &[IptcTag]) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for tag in tags {
        let slot = *index.entry(tag.section).or_insert_with(|| {
            groups.push(TagGroup {
                section: tag.section,
                tags: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].tags.push(tag.clone());
    }

    groups
}

/// Turn the outcome of an IPTC read into what the list view shows.
pub fn project_iptc(result: Result<Vec<IptcTag>, ExtractionFailure>) -> IptcListing {
    match result {
        Ok(tags) => IptcListing::Groups(group_by_section(&tags)),
        Err(err) => {
            log::warn!("Failed to read IPTC metadata: {err}");
            IptcListing::failed(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tags(sections: &[i32]) -> Vec<IptcTag> {
        sections
            .iter()
            .enumerate()
            .map(|(i, &s)| IptcTag::new(s, format!("tag{i}"), format!("value{i}")))
            .collect()
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let groups = group_by_section(&tags(&[2, 1, 2, 3]));
        let order: Vec<i32> = groups.iter().map(|g| g.section).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn tags_keep_relative_order() {
        let groups = group_by_section(&tags(&[2, 1, 2, 3]));
        let ids: Vec<&str> = groups[0].tags.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tag0", "tag2"]);
    }

    #[test]
    fn every_tag_lands_in_exactly_one_group() {
        let input = tags(&[7, 2, 2, 9, 7, 1, 2, 9]);
        let groups = group_by_section(&input);

        let total: usize = groups.iter().map(|g| g.tags.len()).sum();
        assert_eq!(total, input.len());

        for tag in &input {
            let holders = groups.iter().filter(|g| g.tags.contains(tag)).count();
            assert_eq!(holders, 1, "{tag:?}");
        }
        for group in &groups {
            assert!(group.tags.iter().all(|t| t.section == group.section));
        }

        let sections: HashSet<i32> = groups.iter().map(|g| g.section).collect();
        let distinct: HashSet<i32> = input.iter().map(|t| t.section).collect();
        assert_eq!(sections, distinct);
        assert_eq!(groups.len(), distinct.len());
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_by_section(&[]).is_empty());
    }

    #[test]
    fn grouping_is_idempotent() {
        let input = tags(&[3, 1, 3]);
        assert_eq!(group_by_section(&input), group_by_section(&input));
    }

    #[test]
    fn failure_becomes_placeholder() {
        let listing = project_iptc(Err(ExtractionFailure::message("file locked")));
        assert_eq!(
            listing,
            IptcListing::Message("Failed to read IPTC metadata. Error: file locked".into())
        );
        assert_eq!(listing.tag_count(), 0);
    }

    #[test]
    fn success_is_grouped() {
        let listing = project_iptc(Ok(tags(&[1, 2, 1])));
        assert_eq!(listing.tag_count(), 3);
        let IptcListing::Groups(groups) = listing else {
            panic!("expected groups");
        };
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn header_and_item_text() {
        let group = TagGroup {
            section: 2,
            tags: vec![IptcTag::new(2, "Keywords", "beach")],
        };
        assert_eq!(group.header(), "Section: 2");
        assert_eq!(item_text(&group.tags[0]), "Keywords: beach");
    }
}
