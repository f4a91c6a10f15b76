// ID3v1 tag implementation
//
// Layout (128 bytes):
//   0..3     "TAG"
//   3..33    title
//   33..63   artist
//   63..93   album
//   93..97   year
//   97..127  comment, or comment[28] + 0 + track (ID3v1.1)
//   127      genre index

use crate::error::Result;
use crate::field_mapping::{StandardField, ValueConverter};
use crate::id3::genres::{genre_index, genre_name, NO_GENRE};
use crate::stream::TagStream;
use crate::tag::{PropertyMap, Tag};
use crate::utils::encoding::{decode_latin1_field, encode_latin1_field};

/// ID3v1 tag structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: u32,
    pub comment: String,
    pub track: u8,
    pub genre: u8,
}

impl Default for Id3v1Tag {
    fn default() -> Self {
        Id3v1Tag {
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            year: 0,
            comment: String::new(),
            track: 0,
            genre: NO_GENRE,
        }
    }
}

impl Id3v1Tag {
    pub const TAG_SIZE: usize = 128;
    pub const TAG_ID: [u8; 3] = [b'T', b'A', b'G'];

    /// Read the tag stored at `offset`; `None` if the bytes there are not an ID3v1 tag
    pub fn read_at<S: TagStream + ?Sized>(stream: &mut S, offset: u64) -> Result<Option<Self>> {
        let buffer = stream.read_block(offset, Self::TAG_SIZE)?;
        Ok(Self::parse(&buffer))
    }

    /// Parse ID3v1 tag from buffer
    pub fn parse(buffer: &[u8]) -> Option<Self> {
        if buffer.len() != Self::TAG_SIZE || buffer[0..3] != Self::TAG_ID {
            return None;
        }

        // ID3v1.1 puts the track number in the last comment byte
        let (comment, track) = if buffer[125] == 0 && buffer[126] != 0 {
            (decode_latin1_field(&buffer[97..125]), buffer[126])
        } else {
            (decode_latin1_field(&buffer[97..127]), 0)
        };

        Some(Id3v1Tag {
            title: decode_latin1_field(&buffer[3..33]),
            artist: decode_latin1_field(&buffer[33..63]),
            album: decode_latin1_field(&buffer[63..93]),
            year: ValueConverter::parse_year(&decode_latin1_field(&buffer[93..97])),
            comment,
            track,
            genre: buffer[127],
        })
    }

    /// Render the 128-byte tag
    pub fn render(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::TAG_SIZE);
        data.extend_from_slice(&Self::TAG_ID);
        data.extend(encode_latin1_field(&self.title, 30));
        data.extend(encode_latin1_field(&self.artist, 30));
        data.extend(encode_latin1_field(&self.album, 30));
        if self.year > 0 {
            data.extend(encode_latin1_field(&format!("{:04}", self.year.min(9999)), 4));
        } else {
            data.extend([0u8; 4]);
        }
        data.extend(encode_latin1_field(&self.comment, 28));
        data.push(0);
        data.push(self.track);
        data.push(self.genre);
        data
    }

    fn field(&self, field: StandardField) -> String {
        match field {
            StandardField::Title => self.title.clone(),
            StandardField::Artist => self.artist.clone(),
            StandardField::Album => self.album.clone(),
            StandardField::Year => if self.year > 0 { self.year.to_string() } else { String::new() },
            StandardField::Track => if self.track > 0 { self.track.to_string() } else { String::new() },
            StandardField::Genre => self.genre(),
            StandardField::Comment => self.comment.clone(),
        }
    }
}

impl Tag for Id3v1Tag {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn artist(&self) -> String {
        self.artist.clone()
    }

    fn album(&self) -> String {
        self.album.clone()
    }

    fn comment(&self) -> String {
        self.comment.clone()
    }

    fn genre(&self) -> String {
        genre_name(self.genre).unwrap_or_default().to_string()
    }

    fn year(&self) -> u32 {
        self.year
    }

    fn track(&self) -> u32 {
        self.track as u32
    }

    fn set_title(&mut self, value: &str) {
        self.title = value.to_string();
    }

    fn set_artist(&mut self, value: &str) {
        self.artist = value.to_string();
    }

    fn set_album(&mut self, value: &str) {
        self.album = value.to_string();
    }

    fn set_comment(&mut self, value: &str) {
        self.comment = value.to_string();
    }

    fn set_genre(&mut self, value: &str) {
        self.genre = genre_index(value).unwrap_or(NO_GENRE);
    }

    fn set_year(&mut self, value: u32) {
        self.year = value;
    }

    fn set_track(&mut self, value: u32) {
        self.track = if value <= 255 { value as u8 } else { 0 };
    }

    fn properties(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        for field in StandardField::ALL {
            let value = self.field(field);
            if !value.is_empty() {
                map.insert(field.key().to_string(), vec![value]);
            }
        }
        map
    }

    fn set_properties(&mut self, properties: &PropertyMap) -> PropertyMap {
        let mut rejected = PropertyMap::new();
        let mut incoming: [Option<&str>; 7] = [None; 7];

        for (key, values) in properties {
            let Some(field) = StandardField::from_key(key) else {
                rejected.insert(key.clone(), values.clone());
                continue;
            };
            let slot = StandardField::ALL.iter().position(|f| *f == field).unwrap_or_default();
            incoming[slot] = values.first().map(String::as_str);
            if values.len() > 1 {
                rejected.insert(key.clone(), values[1..].to_vec());
            }
        }

        for (field, value) in StandardField::ALL.iter().zip(incoming) {
            let value = value.unwrap_or("");
            match field {
                StandardField::Title => self.set_title(value),
                StandardField::Artist => self.set_artist(value),
                StandardField::Album => self.set_album(value),
                StandardField::Comment => self.set_comment(value),
                StandardField::Year => self.set_year(ValueConverter::parse_year(value)),
                StandardField::Track => self.set_track(ValueConverter::parse_track(value)),
                StandardField::Genre => {
                    self.set_genre(value);
                    if !value.is_empty() && self.genre == NO_GENRE {
                        rejected.insert(field.key().to_string(), vec![value.to_string()]);
                    }
                }
            }
        }

        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn sample() -> Id3v1Tag {
        Id3v1Tag {
            title: "Song".to_string(),
            artist: "Band".to_string(),
            album: "Record".to_string(),
            year: 1999,
            comment: "hi".to_string(),
            track: 7,
            genre: 17,
        }
    }

    #[test]
    fn test_render_is_128_bytes_and_parses_back() {
        let data = sample().render();
        assert_eq!(data.len(), Id3v1Tag::TAG_SIZE);
        assert_eq!(&data[0..3], b"TAG");
        assert_eq!(&data[93..97], b"1999");
        assert_eq!(data[126], 7);
        assert_eq!(Id3v1Tag::parse(&data), Some(sample()));
    }

    #[test]
    fn test_parse_id3v1_0_comment() {
        let mut data = Id3v1Tag::default().render();
        data[97..127].copy_from_slice(&[b'x'; 30]);
        let tag = Id3v1Tag::parse(&data).unwrap();
        assert_eq!(tag.comment.len(), 30);
        assert_eq!(tag.track, 0);
    }

    #[test]
    fn test_non_latin_title_written_as_placeholders() {
        let mut tag = Id3v1Tag::default();
        tag.set_title("日本");
        let parsed = Id3v1Tag::parse(&tag.render()).unwrap();
        assert_eq!(parsed.title, "??");
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut data = sample().render();
        data[0] = b'X';
        assert!(Id3v1Tag::parse(&data).is_none());
        assert!(Id3v1Tag::parse(&data[..100]).is_none());
    }

    #[test]
    fn test_read_at_offset() {
        let mut bytes = vec![0u8; 10];
        bytes.extend(sample().render());
        let mut stream = MemoryStream::new(bytes);
        let tag = Id3v1Tag::read_at(&mut stream, 10).unwrap().unwrap();
        assert_eq!(tag.title, "Song");
        assert!(Id3v1Tag::read_at(&mut stream, 0).unwrap().is_none());
    }

    #[test]
    fn test_properties() {
        let properties = sample().properties();
        assert_eq!(properties["TITLE"], vec!["Song"]);
        assert_eq!(properties["DATE"], vec!["1999"]);
        assert_eq!(properties["TRACKNUMBER"], vec!["7"]);
        assert_eq!(properties["GENRE"], vec!["Rock"]);
        assert!(Id3v1Tag::default().properties().is_empty());
    }

    #[test]
    fn test_set_properties_rejects_unsupported() {
        let mut tag = sample();
        let mut properties = PropertyMap::new();
        properties.insert("TITLE".to_string(), vec!["One".to_string(), "Two".to_string()]);
        properties.insert("LYRICS".to_string(), vec!["la la".to_string()]);
        properties.insert("GENRE".to_string(), vec!["Not A Genre".to_string()]);

        let rejected = tag.set_properties(&properties);

        assert_eq!(tag.title, "One");
        assert_eq!(tag.artist, "");
        assert_eq!(tag.year, 0);
        assert_eq!(tag.genre, NO_GENRE);
        assert_eq!(rejected["TITLE"], vec!["Two"]);
        assert_eq!(rejected["LYRICS"], vec!["la la"]);
        assert_eq!(rejected["GENRE"], vec!["Not A Genre"]);
    }

    #[test]
    fn test_empty() {
        assert!(Id3v1Tag::default().is_empty());
        assert!(!sample().is_empty());
    }
}
