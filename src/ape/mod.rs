// APE tag support
//
// APE tags hold free-form key/value items and are found at the end of a
// file through their 32-byte footer. The footer records the tag size, so the
// start of the tag is found by walking back from the footer:
//
//   [header 32] [item] [item] ... [footer 32]
//
// Reference:
// - https://wiki.hydrogenaud.io/index.php?title=APE_Tag

pub mod footer;
pub mod item;
pub mod tag;

pub use footer::ApeFooter;
pub use item::{ApeItem, ItemValue};
pub use tag::ApeTag;

pub const APE_SIGNATURE: &[u8; 8] = b"APETAGEX";
pub const APE_VERSION: u32 = 2000;

/// APE tag flags
pub mod flags {
    pub const CONTAINS_HEADER: u32 = 0x8000_0000;
    pub const IS_HEADER: u32 = 0x2000_0000;

    pub const ITEM_READ_ONLY: u32 = 0x0000_0001;
    pub const ITEM_TYPE_MASK: u32 = 0x0000_0006;
}
