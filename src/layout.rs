// Where the trailing tags currently sit in the stream
//
// Offsets are only valid against the stream as it is after the most recent
// structural edit. Any edit that changes the stream length must shift the
// other tag's offset before that offset is used again.

use serde::Serialize;

use crate::id3::Id3v1Tag;
use crate::tag_union::TagKind;

/// Byte range of a tag on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub offset: u64,
    pub size: u64,
}

impl Placement {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Presence of one tag kind in memory and on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// No tag object, nothing on disk
    AbsentEverywhere,
    /// Tag object exists but has never been written
    InMemoryOnly,
    /// On disk, but the tag object was removed: pending deletion
    OnDiskOnly(Placement),
    /// Tag object exists and occupies `Placement` on disk
    Synced(Placement),
}

impl BlockState {
    pub fn of(in_memory: bool, on_disk: Option<Placement>) -> Self {
        match (in_memory, on_disk) {
            (false, None) => BlockState::AbsentEverywhere,
            (true, None) => BlockState::InMemoryOnly,
            (false, Some(at)) => BlockState::OnDiskOnly(at),
            (true, Some(at)) => BlockState::Synced(at),
        }
    }
}

/// Cached offsets and sizes of the tags present on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Layout {
    id3v1: Option<u64>,
    ape: Option<Placement>,
}

impl Layout {
    pub fn new(id3v1: Option<u64>, ape: Option<Placement>) -> Self {
        Layout { id3v1, ape }
    }

    pub fn id3v1(&self) -> Option<Placement> {
        self.id3v1.map(|offset| Placement { offset, size: Id3v1Tag::TAG_SIZE as u64 })
    }

    pub fn ape(&self) -> Option<Placement> {
        self.ape
    }

    pub fn placement(&self, kind: TagKind) -> Option<Placement> {
        match kind {
            TagKind::Id3v1 => self.id3v1(),
            TagKind::Ape => self.ape(),
        }
    }

    pub fn state(&self, kind: TagKind, in_memory: bool) -> BlockState {
        BlockState::of(in_memory, self.placement(kind))
    }

    /// Where the audio payload ends: the first tag, or `stream_length`
    pub fn content_end(&self, stream_length: u64) -> u64 {
        [self.id3v1, self.ape.map(|p| p.offset)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(stream_length)
    }

    pub(crate) fn set_id3v1(&mut self, offset: Option<u64>) {
        self.id3v1 = offset;
    }

    pub(crate) fn set_ape(&mut self, placement: Option<Placement>) {
        self.ape = placement;
    }

    /// The stream changed length by `delta` at `pivot`: move the ID3v1 tag if it lies past it
    pub(crate) fn shift_id3v1_past(&mut self, pivot: u64, delta: i64) {
        if let Some(offset) = self.id3v1.as_mut() {
            if *offset > pivot {
                *offset = offset.saturating_add_signed(delta);
            }
        }
    }

    /// The stream changed length by `delta` at `pivot`: move the APE tag if it lies past it
    pub(crate) fn shift_ape_past(&mut self, pivot: u64, delta: i64) {
        if let Some(placement) = self.ape.as_mut() {
            if placement.offset > pivot {
                placement.offset = placement.offset.saturating_add_signed(delta);
            }
        }
    }
}
