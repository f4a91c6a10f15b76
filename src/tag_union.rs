// Tag union: one slot per trailing tag kind
//
// Reads through the union prefer ID3v1 and fall back to APE. Writes always
// go to APE (creating it) and also to ID3v1 when that tag already exists, so
// an existing ID3v1 tag stays in step without being added to files that
// never had one.

use std::ops::BitOr;

use crate::ape::ApeTag;
use crate::id3::Id3v1Tag;
use crate::tag::{PropertyMap, Tag};

/// Trailing tag kinds, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Ape,
    Id3v1,
}

impl TagKind {
    pub const ALL: [TagKind; 2] = [TagKind::Ape, TagKind::Id3v1];

    fn index(self) -> usize {
        match self {
            TagKind::Ape => 0,
            TagKind::Id3v1 => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TagKind::Ape => "APE",
            TagKind::Id3v1 => "ID3v1",
        }
    }
}

/// Bit set of tag kinds, as accepted by `strip`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagTypes(u8);

impl TagTypes {
    pub const NONE: TagTypes = TagTypes(0);
    pub const ID3V1: TagTypes = TagTypes(1);
    pub const APE: TagTypes = TagTypes(2);
    pub const ALL: TagTypes = TagTypes(3);

    /// Build from raw bits; unknown bits are dropped
    pub fn from_bits(bits: u8) -> Self {
        TagTypes(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, kind: TagKind) -> bool {
        let bit = match kind {
            TagKind::Id3v1 => Self::ID3V1,
            TagKind::Ape => Self::APE,
        };
        self.0 & bit.0 != 0
    }
}

impl BitOr for TagTypes {
    type Output = TagTypes;

    fn bitor(self, rhs: TagTypes) -> TagTypes {
        TagTypes(self.0 | rhs.0)
    }
}

/// A tag of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyTag {
    Ape(ApeTag),
    Id3v1(Id3v1Tag),
}

impl AnyTag {
    pub fn empty(kind: TagKind) -> Self {
        match kind {
            TagKind::Ape => AnyTag::Ape(ApeTag::new()),
            TagKind::Id3v1 => AnyTag::Id3v1(Id3v1Tag::default()),
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            AnyTag::Ape(_) => TagKind::Ape,
            AnyTag::Id3v1(_) => TagKind::Id3v1,
        }
    }

    pub fn as_tag(&self) -> &dyn Tag {
        match self {
            AnyTag::Ape(tag) => tag,
            AnyTag::Id3v1(tag) => tag,
        }
    }

    pub fn as_tag_mut(&mut self) -> &mut dyn Tag {
        match self {
            AnyTag::Ape(tag) => tag,
            AnyTag::Id3v1(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUnion {
    slots: [Option<AnyTag>; 2],
}

impl TagUnion {
    pub fn new() -> Self {
        TagUnion::default()
    }

    /// The tag of `kind`; with `create`, an empty one is stored first if the slot is empty
    pub fn access(&mut self, kind: TagKind, create: bool) -> Option<&mut dyn Tag> {
        self.ensure(kind, create);
        self.slots[kind.index()].as_mut().map(AnyTag::as_tag_mut)
    }

    pub fn get(&self, kind: TagKind) -> Option<&dyn Tag> {
        self.slots[kind.index()].as_ref().map(AnyTag::as_tag)
    }

    pub fn contains(&self, kind: TagKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Replace or clear one slot. A tag of the wrong kind is refused.
    pub fn set(&mut self, kind: TagKind, tag: Option<AnyTag>) {
        if let Some(tag) = &tag {
            if tag.kind() != kind {
                log::warn!("refusing to store a {} tag in the {} slot", tag.kind().name(), kind.name());
                return;
            }
        }
        self.slots[kind.index()] = tag;
    }

    pub fn id3v1(&mut self, create: bool) -> Option<&mut Id3v1Tag> {
        self.ensure(TagKind::Id3v1, create);
        match self.slots[TagKind::Id3v1.index()].as_mut() {
            Some(AnyTag::Id3v1(tag)) => Some(tag),
            _ => None,
        }
    }

    pub fn ape(&mut self, create: bool) -> Option<&mut ApeTag> {
        self.ensure(TagKind::Ape, create);
        match self.slots[TagKind::Ape.index()].as_mut() {
            Some(AnyTag::Ape(tag)) => Some(tag),
            _ => None,
        }
    }

    pub fn id3v1_ref(&self) -> Option<&Id3v1Tag> {
        match &self.slots[TagKind::Id3v1.index()] {
            Some(AnyTag::Id3v1(tag)) => Some(tag),
            _ => None,
        }
    }

    pub fn ape_ref(&self) -> Option<&ApeTag> {
        match &self.slots[TagKind::Ape.index()] {
            Some(AnyTag::Ape(tag)) => Some(tag),
            _ => None,
        }
    }

    fn ensure(&mut self, kind: TagKind, create: bool) {
        let slot = &mut self.slots[kind.index()];
        if create && slot.is_none() {
            *slot = Some(AnyTag::empty(kind));
        }
    }

    /// Read a text field, preferring ID3v1 unless its value is empty
    fn read_text(&self, read: impl Fn(&dyn Tag) -> String) -> String {
        [TagKind::Id3v1, TagKind::Ape]
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .map(read)
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    fn read_number(&self, read: impl Fn(&dyn Tag) -> u32) -> u32 {
        [TagKind::Id3v1, TagKind::Ape]
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .map(read)
            .find(|value| *value > 0)
            .unwrap_or(0)
    }

    /// Apply a write to APE (created on demand) and to ID3v1 if present
    fn write(&mut self, apply: impl Fn(&mut dyn Tag)) {
        if let Some(tag) = self.access(TagKind::Ape, true) {
            apply(tag);
        }
        if let Some(tag) = self.access(TagKind::Id3v1, false) {
            apply(tag);
        }
    }
}

impl Tag for TagUnion {
    fn title(&self) -> String {
        self.read_text(|tag| tag.title())
    }

    fn artist(&self) -> String {
        self.read_text(|tag| tag.artist())
    }

    fn album(&self) -> String {
        self.read_text(|tag| tag.album())
    }

    fn comment(&self) -> String {
        self.read_text(|tag| tag.comment())
    }

    fn genre(&self) -> String {
        self.read_text(|tag| tag.genre())
    }

    fn year(&self) -> u32 {
        self.read_number(|tag| tag.year())
    }

    fn track(&self) -> u32 {
        self.read_number(|tag| tag.track())
    }

    fn set_title(&mut self, value: &str) {
        self.write(|tag| tag.set_title(value));
    }

    fn set_artist(&mut self, value: &str) {
        self.write(|tag| tag.set_artist(value));
    }

    fn set_album(&mut self, value: &str) {
        self.write(|tag| tag.set_album(value));
    }

    fn set_comment(&mut self, value: &str) {
        self.write(|tag| tag.set_comment(value));
    }

    fn set_genre(&mut self, value: &str) {
        self.write(|tag| tag.set_genre(value));
    }

    fn set_year(&mut self, value: u32) {
        self.write(|tag| tag.set_year(value));
    }

    fn set_track(&mut self, value: u32) {
        self.write(|tag| tag.set_track(value));
    }

    /// The APE properties, or the ID3v1 ones when there is no APE tag.
    ///
    /// ID3v1 fields are truncated and single-valued, so they never shadow APE
    /// values here; feeding the result back into `set_properties` is lossless.
    fn properties(&self) -> PropertyMap {
        self.get(TagKind::Ape)
            .or_else(|| self.get(TagKind::Id3v1))
            .map(|tag| tag.properties())
            .unwrap_or_default()
    }

    /// Writes ID3v1 if present, then APE; returns what APE rejected
    fn set_properties(&mut self, properties: &PropertyMap) -> PropertyMap {
        if let Some(id3v1) = self.access(TagKind::Id3v1, false) {
            id3v1.set_properties(properties);
        }
        self.access(TagKind::Ape, true)
            .map(|ape| ape.set_properties(properties))
            .unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        TagKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .all(|tag| tag.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_creates_on_demand() {
        let mut union = TagUnion::new();
        assert!(union.access(TagKind::Ape, false).is_none());
        assert!(union.access(TagKind::Ape, true).is_some());
        assert!(union.contains(TagKind::Ape));
        assert!(!union.contains(TagKind::Id3v1));
    }

    #[test]
    fn test_set_clears_only_its_slot() {
        let mut union = TagUnion::new();
        union.id3v1(true);
        union.ape(true);
        union.set(TagKind::Id3v1, None);
        assert!(!union.contains(TagKind::Id3v1));
        assert!(union.contains(TagKind::Ape));
    }

    #[test]
    fn test_set_refuses_wrong_kind() {
        let mut union = TagUnion::new();
        union.set(TagKind::Id3v1, Some(AnyTag::empty(TagKind::Ape)));
        assert!(!union.contains(TagKind::Id3v1));
    }

    #[test]
    fn test_reads_prefer_id3v1() {
        let mut union = TagUnion::new();
        union.ape(true).unwrap().set_title("from ape");
        union.ape(true).unwrap().set_artist("ape artist");
        union.id3v1(true).unwrap().set_title("from id3v1");

        assert_eq!(union.title(), "from id3v1");
        // Empty ID3v1 field falls back to APE
        assert_eq!(union.artist(), "ape artist");
    }

    #[test]
    fn test_writes_go_to_ape_and_existing_id3v1() {
        let mut union = TagUnion::new();
        union.set_title("New");
        assert_eq!(union.ape_ref().unwrap().title(), "New");
        assert!(union.id3v1_ref().is_none());

        union.id3v1(true);
        union.set_year(2020);
        assert_eq!(union.id3v1_ref().unwrap().year, 2020);
        assert_eq!(union.ape_ref().unwrap().year(), 2020);
    }

    #[test]
    fn test_set_properties_returns_ape_rejections() {
        let mut union = TagUnion::new();
        union.id3v1(true);
        let mut properties = PropertyMap::new();
        properties.insert("TITLE".to_string(), vec!["T".to_string()]);
        properties.insert("LYRICS".to_string(), vec!["words".to_string()]);
        properties.insert("OGGS".to_string(), vec!["x".to_string()]);

        let rejected = union.set_properties(&properties);
        assert_eq!(rejected.keys().collect::<Vec<_>>(), vec!["OGGS"]);
        assert_eq!(union.id3v1_ref().unwrap().title, "T");
        assert_eq!(union.properties()["LYRICS"], vec!["words"]);
    }

    #[test]
    fn test_properties_come_from_ape_when_present() {
        let mut union = TagUnion::new();
        union.id3v1(true).unwrap().set_title("legacy");
        assert_eq!(union.properties()["TITLE"], vec!["legacy"]);

        let long_title = "A title that is well past the thirty byte field";
        let ape = union.ape(true).unwrap();
        ape.set_title(long_title);
        ape.add_value("ARTIST", "First", true);
        ape.add_value("ARTIST", "Second", false);

        let properties = union.properties();
        assert_eq!(properties["TITLE"], vec![long_title]);
        assert_eq!(properties["ARTIST"], vec!["First", "Second"]);
    }

    #[test]
    fn test_tag_types_mask() {
        let mask = TagTypes::ID3V1 | TagTypes::APE;
        assert_eq!(mask, TagTypes::ALL);
        assert!(mask.contains(TagKind::Ape));
        assert!(!TagTypes::ID3V1.contains(TagKind::Ape));
        assert_eq!(TagTypes::from_bits(0xFF).bits(), 3);
    }
}
