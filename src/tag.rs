// Common tag surface shared by ID3v1, APE and the tag union

use std::collections::BTreeMap;

/// Unified property keys (upper case) to their values
pub type PropertyMap = BTreeMap<String, Vec<String>>;

/// Property-style access to a tag.
///
/// Numeric fields use 0 for "not set", text fields use the empty string.
pub trait Tag {
    fn title(&self) -> String;
    fn artist(&self) -> String;
    fn album(&self) -> String;
    fn comment(&self) -> String;
    fn genre(&self) -> String;
    fn year(&self) -> u32;
    fn track(&self) -> u32;

    fn set_title(&mut self, value: &str);
    fn set_artist(&mut self, value: &str);
    fn set_album(&mut self, value: &str);
    fn set_comment(&mut self, value: &str);
    fn set_genre(&mut self, value: &str);
    fn set_year(&mut self, value: u32);
    fn set_track(&mut self, value: u32);

    /// All fields this tag can express, keyed by unified property name
    fn properties(&self) -> PropertyMap;

    /// Replace the tag contents with `properties`.
    ///
    /// Returns the entries (or the excess values of entries) that the tag
    /// format could not store.
    fn set_properties(&mut self, properties: &PropertyMap) -> PropertyMap;

    fn is_empty(&self) -> bool {
        self.title().is_empty()
            && self.artist().is_empty()
            && self.album().is_empty()
            && self.comment().is_empty()
            && self.genre().is_empty()
            && self.year() == 0
            && self.track() == 0
    }
}

