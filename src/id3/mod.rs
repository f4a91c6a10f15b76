// ID3 metadata handling module
pub mod genres;
pub mod v1;

pub use v1::Id3v1Tag;
