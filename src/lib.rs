//! wvtags - trailing tag management for WavPack files
//!
//! A WavPack file is an audio payload optionally followed by an APE tag and
//! an ID3v1 tag. [`WavPackFile`] finds both, exposes them through one
//! [`TagUnion`], and keeps their on-disk placement consistent when tags are
//! added, resized, or removed.

pub mod ape;
pub mod error;
pub mod field_mapping;
pub mod file;
pub mod id3;
pub mod layout;
pub mod locate;
pub mod properties;
pub mod stream;
pub mod tag;
pub mod tag_union;
mod utils;

#[cfg(feature = "python")]
mod python;

pub use ape::{ApeItem, ApeTag, ItemValue};
pub use error::{Error, Result};
pub use file::WavPackFile;
pub use id3::Id3v1Tag;
pub use layout::{BlockState, Layout, Placement};
pub use properties::AudioProperties;
pub use stream::{FileStream, MemoryStream, TagStream};
pub use tag::{PropertyMap, Tag};
pub use tag_union::{AnyTag, TagKind, TagTypes, TagUnion};
