// APE tag header/footer
//
// Both are 32 bytes, little-endian:
//   0..8    "APETAGEX"
//   8..12   version (1000 or 2000)
//   12..16  tag size: items + footer, header excluded
//   16..20  item count
//   20..24  flags
//   24..32  reserved, zero

use crate::ape::{flags, APE_SIGNATURE, APE_VERSION};
use crate::utils::io::{has_signature, le_u32, put_le_u32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApeFooter {
    pub version: u32,
    pub tag_size: u32,
    pub item_count: u32,
    pub flags: u32,
}

impl ApeFooter {
    pub const SIZE: usize = 32;

    /// Footer for a tag whose items take `items_size` bytes
    pub fn for_items(items_size: usize, item_count: usize) -> Self {
        ApeFooter {
            version: APE_VERSION,
            tag_size: (items_size + Self::SIZE) as u32,
            item_count: item_count as u32,
            flags: flags::CONTAINS_HEADER,
        }
    }

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || !has_signature(data, APE_SIGNATURE) {
            return None;
        }
        Some(ApeFooter {
            version: le_u32(data, 8),
            tag_size: le_u32(data, 12),
            item_count: le_u32(data, 16),
            flags: le_u32(data, 20),
        })
    }

    pub fn has_header(&self) -> bool {
        self.flags & flags::CONTAINS_HEADER != 0
    }

    pub fn is_header(&self) -> bool {
        self.flags & flags::IS_HEADER != 0
    }

    /// Bytes occupied by the items alone
    pub fn items_size(&self) -> u64 {
        (self.tag_size as u64).saturating_sub(Self::SIZE as u64)
    }

    /// Total bytes on disk: header (if any) + items + footer
    pub fn complete_tag_size(&self) -> u64 {
        let header = if self.has_header() { Self::SIZE as u64 } else { 0 };
        self.tag_size as u64 + header
    }

    pub fn render_footer(&self) -> Vec<u8> {
        self.render(self.flags & !flags::IS_HEADER)
    }

    pub fn render_header(&self) -> Vec<u8> {
        self.render(self.flags | flags::IS_HEADER)
    }

    fn render(&self, flags: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SIZE);
        data.extend_from_slice(APE_SIGNATURE);
        put_le_u32(&mut data, self.version);
        put_le_u32(&mut data, self.tag_size);
        put_le_u32(&mut data, self.item_count);
        put_le_u32(&mut data, flags);
        data.extend_from_slice(&[0u8; 8]);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_sizes() {
        let footer = ApeFooter::for_items(100, 3);
        assert_eq!(footer.tag_size, 132);
        assert_eq!(footer.items_size(), 100);
        assert_eq!(footer.complete_tag_size(), 164);
    }

    #[test]
    fn test_header_and_footer_differ_only_in_flag() {
        let footer = ApeFooter::for_items(10, 1);
        let header = footer.render_header();
        let rendered = footer.render_footer();
        assert_eq!(header.len(), ApeFooter::SIZE);
        assert_eq!(&header[..20], &rendered[..20]);

        let parsed_header = ApeFooter::parse(&header).unwrap();
        let parsed_footer = ApeFooter::parse(&rendered).unwrap();
        assert!(parsed_header.is_header());
        assert!(!parsed_footer.is_header());
        assert!(parsed_footer.has_header());
        assert_eq!(parsed_footer.version, 2000);
    }

    #[test]
    fn test_parse_rejects_other_data() {
        assert!(ApeFooter::parse(b"APETAGEX").is_none());
        assert!(ApeFooter::parse(&[0u8; 32]).is_none());
    }

    #[test]
    fn test_footer_without_header() {
        let mut footer = ApeFooter::for_items(10, 1);
        footer.flags = 0;
        assert_eq!(footer.complete_tag_size(), 42);
    }
}
