// WavPack file: trailing tag discovery and the save protocol
//
// On disk the file is the audio payload followed by an optional APE tag and
// an optional ID3v1 tag, in that order:
//
//   [audio ...] [APE tag] [ID3v1 128]
//
// `save()` brings the disk in line with the tag union one tag kind at a
// time, ID3v1 first, then APE. Each step updates the layout before the next
// step reads it.

use std::path::Path;

use crate::ape::{ApeFooter, ApeTag};
use crate::error::{Error, Result};
use crate::id3::Id3v1Tag;
use crate::layout::{BlockState, Layout, Placement};
use crate::locate::{find_ape, find_id3v1};
use crate::properties::AudioProperties;
use crate::stream::{FileStream, TagStream};
use crate::tag::{PropertyMap, Tag};
use crate::tag_union::{AnyTag, TagKind, TagTypes, TagUnion};

pub struct WavPackFile<S: TagStream> {
    stream: S,
    tags: TagUnion,
    layout: Layout,
    properties: Option<AudioProperties>,
}

impl WavPackFile<FileStream> {
    /// Open a file on disk (read-only if it is not writable)
    pub fn open_path<P: AsRef<Path>>(path: P, read_properties: bool) -> Result<Self> {
        Self::open(FileStream::open(path)?, read_properties)
    }
}

impl<S: TagStream> WavPackFile<S> {
    /// Discover the trailing tags and, if asked, read the audio properties
    pub fn open(stream: S, read_properties: bool) -> Result<Self> {
        let mut file = WavPackFile {
            stream,
            tags: TagUnion::new(),
            layout: Layout::default(),
            properties: None,
        };
        file.read(read_properties)?;
        Ok(file)
    }

    /// The primary tag view
    pub fn tag(&self) -> &TagUnion {
        &self.tags
    }

    pub fn tag_mut(&mut self) -> &mut TagUnion {
        &mut self.tags
    }

    pub fn audio_properties(&self) -> Option<&AudioProperties> {
        self.properties.as_ref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether an ID3v1 tag is present on disk
    pub fn has_id3v1_tag(&self) -> bool {
        self.layout.id3v1().is_some()
    }

    /// Whether an APE tag is present on disk
    pub fn has_ape_tag(&self) -> bool {
        self.layout.ape().is_some()
    }

    pub fn id3v1_tag(&mut self, create: bool) -> Option<&mut Id3v1Tag> {
        self.tags.id3v1(create)
    }

    pub fn ape_tag(&mut self, create: bool) -> Option<&mut ApeTag> {
        self.tags.ape(create)
    }

    pub fn properties(&self) -> PropertyMap {
        self.tags.properties()
    }

    /// Write to the ID3v1 tag if there is one, then to the APE tag (created
    /// if missing). Returns the entries the APE tag could not store.
    pub fn set_properties(&mut self, properties: &PropertyMap) -> PropertyMap {
        self.tags.set_properties(properties)
    }

    /// Drop the in-memory tags selected by `tags`. Takes effect on disk at the next `save()`.
    pub fn strip(&mut self, tags: TagTypes) {
        for kind in TagKind::ALL {
            if tags.contains(kind) {
                self.tags.set(kind, None);
            }
        }
        self.ensure_writable_tag();
    }

    /// Write the tags back. Returns `Ok(false)` without touching the stream if it is read-only.
    ///
    /// Not atomic: an I/O error part way through leaves the file with only
    /// some of the changes applied, and the file should be reopened.
    pub fn save(&mut self) -> Result<bool> {
        if self.stream.is_read_only() {
            log::warn!("save() called on a read-only stream, nothing written");
            return Ok(false);
        }

        self.save_id3v1()?;
        self.save_ape()?;
        Ok(true)
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn read(&mut self, read_properties: bool) -> Result<()> {
        let id3v1 = match find_id3v1(&mut self.stream)? {
            Some(offset) => Id3v1Tag::read_at(&mut self.stream, offset)?.map(|tag| (offset, tag)),
            None => None,
        };
        if let Some((offset, tag)) = id3v1 {
            log::debug!("ID3v1 tag at {}", offset);
            self.tags.set(TagKind::Id3v1, Some(AnyTag::Id3v1(tag)));
            self.layout.set_id3v1(Some(offset));
        }

        if let Some(footer_offset) = find_ape(&mut self.stream, self.layout.id3v1().map(|p| p.offset))? {
            if let Some((tag, footer)) = ApeTag::read_at(&mut self.stream, footer_offset)? {
                let size = footer.complete_tag_size();
                // The footer is found first; the tag extends back from its end
                let offset = (footer_offset + ApeFooter::SIZE as u64).saturating_sub(size);
                log::debug!("APE tag at {} ({} bytes, {} items)", offset, size, tag.items().len());
                self.tags.set(TagKind::Ape, Some(AnyTag::Ape(tag)));
                self.layout.set_ape(Some(Placement { offset, size }));
            }
        }

        self.ensure_writable_tag();

        if read_properties {
            let content_end = self.layout.content_end(self.stream.length()?);
            self.properties = match AudioProperties::read(&mut self.stream, content_end) {
                Ok(properties) => Some(properties),
                Err(Error::InvalidAudio(reason)) => {
                    log::warn!("could not read audio properties: {}", reason);
                    None
                }
                Err(e) => return Err(e),
            };
        }

        Ok(())
    }

    /// Files without an ID3v1 tag always carry a writable APE tag
    fn ensure_writable_tag(&mut self) {
        if !self.tags.contains(TagKind::Id3v1) {
            self.tags.ape(true);
        }
    }

    fn save_id3v1(&mut self) -> Result<()> {
        let rendered = self.tags.id3v1_ref().map(Id3v1Tag::render);
        let state = self.layout.state(TagKind::Id3v1, rendered.is_some());

        match (state, rendered) {
            (BlockState::Synced(at), Some(data)) => {
                self.stream.write_at(at.offset, &data)?;
            }
            (BlockState::InMemoryOnly, Some(data)) => {
                let offset = self.stream.append(&data)?;
                log::debug!("ID3v1 tag appended at {}", offset);
                self.layout.set_id3v1(Some(offset));
            }
            (BlockState::OnDiskOnly(at), _) => {
                self.stream.remove_block(at.offset, at.size)?;
                log::debug!("ID3v1 tag removed from {}", at.offset);
                self.layout.set_id3v1(None);
                self.layout.shift_ape_past(at.offset, -(at.size as i64));
            }
            _ => {}
        }
        Ok(())
    }

    fn save_ape(&mut self) -> Result<()> {
        let rendered = self.tags.ape_ref().map(ApeTag::render);
        let state = self.layout.state(TagKind::Ape, rendered.is_some());

        match (state, rendered) {
            (BlockState::Synced(at), Some(data)) => {
                let size = data.len() as u64;
                self.stream.insert(&data, at.offset, at.size)?;
                if size != at.size {
                    log::debug!("APE tag at {} resized {} -> {}", at.offset, at.size, size);
                }
                self.layout.set_ape(Some(Placement { offset: at.offset, size }));
                self.layout.shift_id3v1_past(at.offset, size as i64 - at.size as i64);
            }
            (BlockState::InMemoryOnly, Some(data)) => {
                let size = data.len() as u64;
                let offset = match self.layout.id3v1() {
                    Some(id3v1) => {
                        self.stream.insert(&data, id3v1.offset, 0)?;
                        self.layout.set_id3v1(Some(id3v1.offset + size));
                        id3v1.offset
                    }
                    None => self.stream.append(&data)?,
                };
                log::debug!("APE tag written at {} ({} bytes)", offset, size);
                self.layout.set_ape(Some(Placement { offset, size }));
            }
            (BlockState::OnDiskOnly(at), _) => {
                self.stream.remove_block(at.offset, at.size)?;
                log::debug!("APE tag removed from {} ({} bytes)", at.offset, at.size);
                self.layout.set_ape(None);
                self.layout.shift_id3v1_past(at.offset, -(at.size as i64));
            }
            _ => {}
        }
        Ok(())
    }
}
