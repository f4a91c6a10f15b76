// Unified metadata field mapping
//
// Properties are exchanged between tags under one set of upper-case keys
// (TITLE, DATE, TRACKNUMBER, ...). Each tag format stores them differently:
// - ID3v1: fixed-width fields, numeric year/track, genre index
// - APE: free-form item keys, a few of which have historical spellings
//   (Year, Track, Disc, Album Artist, MixArtist)
//
// This module translates between the unified keys and both formats.

/// The fields every tag kind understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardField {
    Title,
    Artist,
    Album,
    Year,
    Track,
    Genre,
    Comment,
}

impl StandardField {
    pub const ALL: [StandardField; 7] = [
        StandardField::Title,
        StandardField::Artist,
        StandardField::Album,
        StandardField::Year,
        StandardField::Track,
        StandardField::Genre,
        StandardField::Comment,
    ];

    /// Unified property key
    pub fn key(&self) -> &'static str {
        match self {
            StandardField::Title => "TITLE",
            StandardField::Artist => "ARTIST",
            StandardField::Album => "ALBUM",
            StandardField::Year => "DATE",
            StandardField::Track => "TRACKNUMBER",
            StandardField::Genre => "GENRE",
            StandardField::Comment => "COMMENT",
        }
    }

    /// Parse from a unified property key (case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_uppercase().as_str() {
            "TITLE" => Some(StandardField::Title),
            "ARTIST" => Some(StandardField::Artist),
            "ALBUM" => Some(StandardField::Album),
            "DATE" => Some(StandardField::Year),
            "TRACKNUMBER" => Some(StandardField::Track),
            "GENRE" => Some(StandardField::Genre),
            "COMMENT" => Some(StandardField::Comment),
            _ => None,
        }
    }
}

/// APE item keys whose unified name differs from the upper-cased item key.
/// Left: APE item key, right: unified property key.
const APE_KEY_CONVERSIONS: [(&str, &str); 5] = [
    ("YEAR", "DATE"),
    ("TRACK", "TRACKNUMBER"),
    ("DISC", "DISCNUMBER"),
    ("ALBUM ARTIST", "ALBUMARTIST"),
    ("MIXARTIST", "REMIXER"),
];

/// APE item keys that would confuse tag scanners and must not be used
const APE_FORBIDDEN_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

pub struct FieldMappings;

impl FieldMappings {
    /// Unified property key for an APE item key
    pub fn from_ape(item_key: &str) -> String {
        let upper = item_key.to_uppercase();
        APE_KEY_CONVERSIONS
            .iter()
            .find(|(ape, _)| *ape == upper)
            .map(|(_, unified)| unified.to_string())
            .unwrap_or(upper)
    }

    /// APE item key for a unified property key
    pub fn to_ape(property_key: &str) -> String {
        let upper = property_key.to_uppercase();
        APE_KEY_CONVERSIONS
            .iter()
            .find(|(_, unified)| *unified == upper)
            .map(|(ape, _)| ape.to_string())
            .unwrap_or(upper)
    }

    /// Whether `key` is usable as an APE item key
    pub fn is_valid_ape_key(key: &str) -> bool {
        (2..=255).contains(&key.len())
            && key.bytes().all(|b| (0x20..=0x7E).contains(&b))
            && !APE_FORBIDDEN_KEYS.contains(&key.to_uppercase().as_str())
    }
}

/// Value conversions for fields ID3v1 stores numerically
pub struct ValueConverter;

impl ValueConverter {
    /// Extract the year from a date such as "2024-01-15"; 0 when there is none
    pub fn parse_year(date: &str) -> u32 {
        let digits: String = date.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    }

    /// Extract the track number from "1/10"-style values; 0 when there is none
    pub fn parse_track(track: &str) -> u32 {
        track.split('/').next().unwrap_or(track).trim().parse().unwrap_or(0)
    }
}
