// APE tag: an ordered collection of items framed by a header and a footer

use crate::ape::footer::ApeFooter;
use crate::ape::item::{ApeItem, ItemValue};
use crate::error::Result;
use crate::field_mapping::{FieldMappings, ValueConverter};
use crate::stream::TagStream;
use crate::tag::{PropertyMap, Tag};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApeTag {
    items: Vec<ApeItem>,
}

impl ApeTag {
    pub fn new() -> Self {
        ApeTag::default()
    }

    /// Read the tag whose footer starts at `footer_offset`.
    ///
    /// Returns the tag and its footer, or `None` when the footer or the item
    /// region is malformed.
    pub fn read_at<S: TagStream + ?Sized>(
        stream: &mut S,
        footer_offset: u64,
    ) -> Result<Option<(Self, ApeFooter)>> {
        let footer_data = stream.read_block(footer_offset, ApeFooter::SIZE)?;
        let Some(footer) = ApeFooter::parse(&footer_data) else {
            return Ok(None);
        };
        if footer.is_header() || (footer.tag_size as usize) < ApeFooter::SIZE {
            log::debug!("APE footer at {} is not a valid footer", footer_offset);
            return Ok(None);
        }

        let items_size = footer.items_size();
        let Some(items_offset) = footer_offset.checked_sub(items_size) else {
            log::debug!("APE tag size {} runs past the start of the stream", footer.tag_size);
            return Ok(None);
        };
        if footer.has_header() && items_offset < ApeFooter::SIZE as u64 {
            log::debug!("APE header would start before the stream");
            return Ok(None);
        }

        let data = stream.read_block(items_offset, items_size as usize)?;
        if data.len() as u64 != items_size {
            return Ok(None);
        }

        match Self::parse_items(&data, footer.item_count) {
            Some(tag) => Ok(Some((tag, footer))),
            None => {
                log::debug!("APE tag at {} has malformed items", footer_offset);
                Ok(None)
            }
        }
    }

    fn parse_items(data: &[u8], item_count: u32) -> Option<Self> {
        let mut tag = ApeTag::new();
        let mut position = 0;
        for _ in 0..item_count {
            let (item, used) = ApeItem::parse(&data[position..])?;
            position += used;
            // Later duplicates replace earlier ones
            tag.set_item(item);
        }
        Some(tag)
    }

    /// Render header + items + footer
    pub fn render(&self) -> Vec<u8> {
        let items: Vec<u8> = self.items.iter().flat_map(ApeItem::render).collect();
        let footer = ApeFooter::for_items(items.len(), self.items.len());

        let mut data = footer.render_header();
        data.extend(items);
        data.extend(footer.render_footer());
        data
    }

    pub fn items(&self) -> &[ApeItem] {
        &self.items
    }

    /// Look up an item by key (case-insensitive)
    pub fn item(&self, key: &str) -> Option<&ApeItem> {
        self.items.iter().find(|item| item.key.eq_ignore_ascii_case(key))
    }

    /// Insert or replace the item with the same key
    pub fn set_item(&mut self, item: ApeItem) {
        match self.items.iter_mut().find(|existing| existing.key.eq_ignore_ascii_case(&item.key)) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove_item(&mut self, key: &str) {
        self.items.retain(|item| !item.key.eq_ignore_ascii_case(key));
    }

    /// Set a text item, or append to its values when `replace` is false.
    /// An empty value with `replace` removes the item.
    pub fn add_value(&mut self, key: &str, value: &str, replace: bool) {
        if replace {
            if value.is_empty() {
                self.remove_item(key);
            } else {
                self.set_item(ApeItem::text(key, vec![value.to_string()]));
            }
            return;
        }
        if value.is_empty() {
            return;
        }
        match self.items.iter_mut().find(|item| item.key.eq_ignore_ascii_case(key)) {
            Some(ApeItem { value: ItemValue::Text(values), .. }) => values.push(value.to_string()),
            _ => self.set_item(ApeItem::text(key, vec![value.to_string()])),
        }
    }

    /// Keys of items that `properties()` cannot represent
    pub fn unsupported_data(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.is_text())
            .map(|item| item.key.clone())
            .collect()
    }

    fn text(&self, key: &str) -> String {
        self.item(key).map(|item| item.values().join(" ")).unwrap_or_default()
    }

    fn number(&self, key: &str) -> u32 {
        self.item(key)
            .and_then(|item| item.values().first())
            .map(|value| ValueConverter::parse_track(value))
            .unwrap_or(0)
    }

    fn set_number(&mut self, key: &str, value: u32) {
        if value == 0 {
            self.remove_item(key);
        } else {
            self.add_value(key, &value.to_string(), true);
        }
    }
}

impl Tag for ApeTag {
    fn title(&self) -> String {
        self.text("TITLE")
    }

    fn artist(&self) -> String {
        self.text("ARTIST")
    }

    fn album(&self) -> String {
        self.text("ALBUM")
    }

    fn comment(&self) -> String {
        self.text("COMMENT")
    }

    fn genre(&self) -> String {
        self.text("GENRE")
    }

    fn year(&self) -> u32 {
        self.item("YEAR")
            .and_then(|item| item.values().first())
            .map(|value| ValueConverter::parse_year(value))
            .unwrap_or(0)
    }

    fn track(&self) -> u32 {
        self.number("TRACK")
    }

    fn set_title(&mut self, value: &str) {
        self.add_value("TITLE", value, true);
    }

    fn set_artist(&mut self, value: &str) {
        self.add_value("ARTIST", value, true);
    }

    fn set_album(&mut self, value: &str) {
        self.add_value("ALBUM", value, true);
    }

    fn set_comment(&mut self, value: &str) {
        self.add_value("COMMENT", value, true);
    }

    fn set_genre(&mut self, value: &str) {
        self.add_value("GENRE", value, true);
    }

    fn set_year(&mut self, value: u32) {
        self.set_number("YEAR", value);
    }

    fn set_track(&mut self, value: u32) {
        self.set_number("TRACK", value);
    }

    fn properties(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        for item in self.items.iter().filter(|item| item.is_text()) {
            map.entry(FieldMappings::from_ape(&item.key))
                .or_insert_with(Vec::new)
                .extend(item.values().iter().cloned());
        }
        map
    }

    fn set_properties(&mut self, properties: &PropertyMap) -> PropertyMap {
        let mut rejected = PropertyMap::new();

        // Drop text items that are not part of the new set; binary items stay
        let wanted: Vec<String> = properties.keys().map(|key| FieldMappings::to_ape(key)).collect();
        self.items.retain(|item| {
            !item.is_text() || wanted.iter().any(|key| key.eq_ignore_ascii_case(&item.key))
        });

        for (key, values) in properties {
            let ape_key = FieldMappings::to_ape(key);
            if !FieldMappings::is_valid_ape_key(&ape_key) {
                rejected.insert(key.clone(), values.clone());
                continue;
            }
            let values: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
            if values.is_empty() {
                self.remove_item(&ape_key);
            } else if self.item(&ape_key).map(ApeItem::values) != Some(values.as_slice()) {
                self.set_item(ApeItem::text(&ape_key, values));
            }
        }

        rejected
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
