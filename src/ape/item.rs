// APE tag items
//
// Each item is:
//   value size (u32 LE), flags (u32 LE), key (ASCII, NUL-terminated), value
// Flag bit 0 marks the item read-only, bits 1-2 give the value type.

use crate::ape::flags;
use crate::utils::encoding::decode_utf8;
use crate::utils::io::{le_u32, put_le_u32};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    /// UTF-8 strings, NUL separated on disk
    Text(Vec<String>),
    Binary(Vec<u8>),
    /// External reference (URL or path)
    Locator(String),
}

impl ItemValue {
    fn type_bits(&self) -> u32 {
        match self {
            ItemValue::Text(_) => 0,
            ItemValue::Binary(_) => 1,
            ItemValue::Locator(_) => 2,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            ItemValue::Text(values) => values.join("\0").into_bytes(),
            ItemValue::Binary(data) => data.clone(),
            ItemValue::Locator(location) => location.as_bytes().to_vec(),
        }
    }
}

/// APE tag item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApeItem {
    pub key: String,
    pub value: ItemValue,
    pub read_only: bool,
}

impl ApeItem {
    const MIN_KEY_LENGTH: usize = 2;
    const MAX_KEY_LENGTH: usize = 255;

    pub fn text(key: &str, values: Vec<String>) -> Self {
        ApeItem {
            key: key.to_string(),
            value: ItemValue::Text(values),
            read_only: false,
        }
    }

    pub fn binary(key: &str, data: Vec<u8>) -> Self {
        ApeItem {
            key: key.to_string(),
            value: ItemValue::Binary(data),
            read_only: false,
        }
    }

    /// Text values, empty for binary and locator items
    pub fn values(&self) -> &[String] {
        match &self.value {
            ItemValue::Text(values) => values,
            _ => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.value, ItemValue::Text(_))
    }

    /// Parse one item from the start of `data`. Returns the item and the
    /// number of bytes it occupied, or `None` if the item is malformed.
    pub fn parse(data: &[u8]) -> Option<(Self, usize)> {
        // size + flags + at least a 2-byte key and its terminator
        if data.len() < 8 + Self::MIN_KEY_LENGTH + 1 {
            return None;
        }

        let value_size = le_u32(data, 0) as usize;
        let item_flags = le_u32(data, 4);

        let key_length = data[8..].iter().position(|&b| b == 0)?;
        if !(Self::MIN_KEY_LENGTH..=Self::MAX_KEY_LENGTH).contains(&key_length) {
            return None;
        }
        let key_bytes = &data[8..8 + key_length];
        if !key_bytes.iter().all(|b| (0x20..=0x7E).contains(b)) {
            return None;
        }
        let key = String::from_utf8_lossy(key_bytes).to_string();

        let value_start = 8 + key_length + 1;
        let value_end = value_start.checked_add(value_size)?;
        if value_end > data.len() {
            return None;
        }
        let raw = &data[value_start..value_end];

        let value = match (item_flags & flags::ITEM_TYPE_MASK) >> 1 {
            1 => ItemValue::Binary(raw.to_vec()),
            2 => ItemValue::Locator(decode_utf8(raw)),
            _ => ItemValue::Text(decode_utf8(raw).split('\0').map(str::to_string).collect()),
        };

        let item = ApeItem {
            key,
            value,
            read_only: item_flags & flags::ITEM_READ_ONLY != 0,
        };
        Some((item, value_end))
    }

    pub fn render(&self) -> Vec<u8> {
        let value = self.value.to_bytes();
        let mut item_flags = self.value.type_bits() << 1;
        if self.read_only {
            item_flags |= flags::ITEM_READ_ONLY;
        }

        let mut data = Vec::with_capacity(8 + self.key.len() + 1 + value.len());
        put_le_u32(&mut data, value.len() as u32);
        put_le_u32(&mut data, item_flags);
        data.extend_from_slice(self.key.as_bytes());
        data.push(0);
        data.extend(value);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_item_layout() {
        let item = ApeItem::text("Title", vec!["Song".to_string()]);
        let data = item.render();
        assert_eq!(le_u32(&data, 0), 4);
        assert_eq!(le_u32(&data, 4), 0);
        assert_eq!(&data[8..14], b"Title\0");
        assert_eq!(&data[14..], b"Song");
    }

    #[test]
    fn test_parse_multi_value_text() {
        let item = ApeItem::text("Artist", vec!["A".to_string(), "B".to_string()]);
        let mut data = item.render();
        data.extend_from_slice(b"trailing");
        let (parsed, used) = ApeItem::parse(&data).unwrap();
        assert_eq!(parsed.values(), ["A", "B"]);
        assert_eq!(used, data.len() - 8);
    }

    #[test]
    fn test_parse_binary_item() {
        let mut item = ApeItem::binary("Cover Art (Front)", vec![0, 1, 2, 255]);
        item.read_only = true;
        let data = item.render();
        assert_eq!(le_u32(&data, 4), flags::ITEM_READ_ONLY | 2);
        let (parsed, _) = ApeItem::parse(&data).unwrap();
        assert_eq!(parsed, item);
        assert!(parsed.values().is_empty());
    }

    #[test]
    fn test_parse_rejects_truncated_value() {
        let data = ApeItem::text("Title", vec!["Song".to_string()]).render();
        assert!(ApeItem::parse(&data[..data.len() - 1]).is_none());
    }

    #[test]
    fn test_parse_rejects_short_key() {
        let mut data = Vec::new();
        put_le_u32(&mut data, 1);
        put_le_u32(&mut data, 0);
        data.extend_from_slice(b"K\0x");
        assert!(ApeItem::parse(&data).is_none());
    }
}
