// WavPack audio properties
//
// WavPack Block Header (32 bytes, little-endian):
// - Signature: "wvpk" (4 bytes)
// - Block size, excluding the first 8 bytes (4 bytes)
// - Version: 0x402..=0x410 (2 bytes)
// - Track/index numbers (2 bytes)
// - Total samples, 0xFFFFFFFF if unknown (4 bytes)
// - Block index (4 bytes)
// - Block samples (4 bytes)
// - Flags (4 bytes)
// - CRC (4 bytes)
//
// Multichannel audio is stored as a run of blocks sharing one block index,
// the first flagged INITIAL_BLOCK and the last FINAL_BLOCK.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::stream::TagStream;
use crate::utils::io::{has_signature, le_u16, le_u32};

pub const WAVPACK_SIGNATURE: &[u8; 4] = b"wvpk";

const HEADER_SIZE: usize = 32;
const MIN_VERSION: u16 = 0x402;
const MAX_VERSION: u16 = 0x410;
const UNKNOWN_SAMPLES: u32 = 0xFFFF_FFFF;
/// How far back from the end to search for the final block
const FINAL_BLOCK_SEARCH: u64 = 1 << 20;

const BYTES_STORED: u32 = 0x3;
const MONO_FLAG: u32 = 0x4;
const HYBRID_FLAG: u32 = 0x8;
const SHIFT_LSB: u32 = 13;
const SHIFT_MASK: u32 = 0x1F << SHIFT_LSB;
const FINAL_BLOCK: u32 = 0x1000;
const SRATE_LSB: u32 = 23;
const SRATE_MASK: u32 = 0xF << SRATE_LSB;

const SAMPLE_RATES: [u32; 15] = [
    6000, 8000, 9600, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000, 64000, 88200, 96000,
    192000,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    block_size: u32,
    version: u16,
    total_samples: u32,
    block_index: u32,
    block_samples: u32,
    flags: u32,
}

impl BlockHeader {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_SIZE || !has_signature(data, WAVPACK_SIGNATURE) {
            return None;
        }
        Some(BlockHeader {
            block_size: le_u32(data, 4),
            version: le_u16(data, 8),
            total_samples: le_u32(data, 12),
            block_index: le_u32(data, 16),
            block_samples: le_u32(data, 20),
            flags: le_u32(data, 24),
        })
    }

    fn sample_rate(&self) -> u32 {
        let index = ((self.flags & SRATE_MASK) >> SRATE_LSB) as usize;
        SAMPLE_RATES.get(index).copied().unwrap_or(0)
    }

    fn bits_per_sample(&self) -> u32 {
        ((self.flags & BYTES_STORED) + 1) * 8 - ((self.flags & SHIFT_MASK) >> SHIFT_LSB)
    }

    fn channels(&self) -> u32 {
        if self.flags & MONO_FLAG != 0 { 1 } else { 2 }
    }

    /// Offset of the next block, relative to this one
    fn next_block(&self) -> u64 {
        self.block_size as u64 + 8
    }
}

/// Properties of the audio payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioProperties {
    pub version: u16,
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
    pub sample_frames: u32,
    pub length_ms: u64,
    /// kbit/s over the whole payload
    pub bitrate: u32,
    pub lossless: bool,
}

impl AudioProperties {
    /// Read properties from the blocks in `[0, stream_length)`
    pub fn read<S: TagStream + ?Sized>(stream: &mut S, stream_length: u64) -> Result<Self> {
        let mut properties = AudioProperties::default();
        let mut first: Option<BlockHeader> = None;
        let mut offset = 0u64;

        while offset + HEADER_SIZE as u64 <= stream_length {
            let data = stream.read_block(offset, HEADER_SIZE)?;
            let Some(header) = BlockHeader::parse(&data) else {
                if first.is_none() {
                    return Err(Error::InvalidAudio(format!("no WavPack block at offset {}", offset)));
                }
                break;
            };
            if !(MIN_VERSION..=MAX_VERSION).contains(&header.version) {
                return Err(Error::InvalidAudio(format!(
                    "unsupported WavPack version {:#x}",
                    header.version
                )));
            }

            // Metadata-only blocks carry no audio
            if header.block_samples > 0 {
                if first.is_none() {
                    properties.version = header.version;
                    properties.sample_rate = header.sample_rate();
                    properties.bits_per_sample = header.bits_per_sample();
                    properties.lossless = header.flags & HYBRID_FLAG == 0;
                    first = Some(header);
                }
                properties.channels += header.channels();
                if header.flags & FINAL_BLOCK != 0 {
                    break;
                }
            }
            offset += header.next_block();
        }

        let Some(first) = first else {
            return Err(Error::InvalidAudio("no audio blocks found".to_string()));
        };

        properties.sample_frames = if first.block_index == 0 && first.total_samples != UNKNOWN_SAMPLES {
            first.total_samples
        } else {
            Self::find_final_index(stream, stream_length)?.unwrap_or(0)
        };

        if properties.sample_rate > 0 {
            properties.length_ms =
                properties.sample_frames as u64 * 1000 / properties.sample_rate as u64;
        }
        if properties.length_ms > 0 {
            properties.bitrate =
                ((stream_length as f64 * 8.0) / properties.length_ms as f64).round() as u32;
        }

        Ok(properties)
    }

    /// Total samples recovered from the last final block before `stream_length`
    fn find_final_index<S: TagStream + ?Sized>(
        stream: &mut S,
        stream_length: u64,
    ) -> Result<Option<u32>> {
        let start = stream_length.saturating_sub(FINAL_BLOCK_SEARCH);
        let window = stream.read_block(start, (stream_length - start) as usize)?;

        let found = window
            .windows(WAVPACK_SIGNATURE.len())
            .enumerate()
            .rev()
            .filter(|(_, candidate)| *candidate == &WAVPACK_SIGNATURE[..])
            .filter_map(|(position, _)| BlockHeader::parse(&window[position..]))
            .find(|header| header.flags & FINAL_BLOCK != 0 && header.block_samples > 0)
            .map(|header| header.block_index + header.block_samples);

        if found.is_none() {
            log::debug!("no final WavPack block found, sample count unknown");
        }
        Ok(found)
    }

    pub fn length_in_seconds(&self) -> u64 {
        self.length_ms / 1000
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    /// A block with `payload` bytes of (zero) audio data after the header
    pub(crate) fn block(total_samples: u32, block_index: u32, samples: u32, flags: u32, payload: usize) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(WAVPACK_SIGNATURE);
        data.extend_from_slice(&((HEADER_SIZE - 8 + payload) as u32).to_le_bytes());
        data.extend_from_slice(&0x407u16.to_le_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&total_samples.to_le_bytes());
        data.extend_from_slice(&block_index.to_le_bytes());
        data.extend_from_slice(&samples.to_le_bytes());
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend(std::iter::repeat(0u8).take(payload));
        data
    }

    /// 44.1kHz, 16-bit stereo, initial and final block
    pub(crate) const STEREO_44K: u32 = (9 << SRATE_LSB) | 0x1 | 0x800 | FINAL_BLOCK;

    #[test]
    fn test_stereo_properties() {
        let data = block(441_000, 0, 441_000, STEREO_44K, 1000);
        let length = data.len() as u64;
        let mut stream = MemoryStream::new(data);
        let properties = AudioProperties::read(&mut stream, length).unwrap();

        assert_eq!(properties.sample_rate, 44100);
        assert_eq!(properties.channels, 2);
        assert_eq!(properties.bits_per_sample, 16);
        assert_eq!(properties.sample_frames, 441_000);
        assert_eq!(properties.length_ms, 10_000);
        assert_eq!(properties.length_in_seconds(), 10);
        assert_eq!(properties.bitrate, 1);
        assert!(properties.lossless);
        assert_eq!(properties.version, 0x407);
    }

    #[test]
    fn test_multichannel_blocks_sum_channels() {
        let initial = (10 << SRATE_LSB) | 0x1 | 0x800;
        let middle = (10 << SRATE_LSB) | 0x1 | MONO_FLAG;
        let last = (10 << SRATE_LSB) | 0x1 | MONO_FLAG | FINAL_BLOCK;
        let mut data = block(48_000, 0, 48_000, initial, 10);
        data.extend(block(48_000, 0, 48_000, middle, 10));
        data.extend(block(48_000, 0, 48_000, last, 10));
        let length = data.len() as u64;

        let properties = AudioProperties::read(&mut MemoryStream::new(data), length).unwrap();
        assert_eq!(properties.channels, 4);
        assert_eq!(properties.sample_rate, 48000);
        assert_eq!(properties.length_ms, 1000);
    }

    #[test]
    fn test_unknown_total_uses_final_block() {
        let first = (9 << SRATE_LSB) | 0x1 | 0x800 | FINAL_BLOCK;
        let mut data = block(UNKNOWN_SAMPLES, 0, 44_100, first, 16);
        data.extend(block(UNKNOWN_SAMPLES, 44_100, 22_050, first | HYBRID_FLAG, 16));
        let length = data.len() as u64;

        let properties = AudioProperties::read(&mut MemoryStream::new(data), length).unwrap();
        assert_eq!(properties.sample_frames, 66_150);
        assert_eq!(properties.length_ms, 1500);
        assert!(properties.lossless);
    }

    #[test]
    fn test_rejects_non_wavpack() {
        let mut stream = MemoryStream::new(vec![0u8; 64]);
        assert!(matches!(AudioProperties::read(&mut stream, 64), Err(Error::InvalidAudio(_))));
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut data = block(1, 0, 1, STEREO_44K, 0);
        data[8..10].copy_from_slice(&0x300u16.to_le_bytes());
        let mut stream = MemoryStream::new(data);
        assert!(AudioProperties::read(&mut stream, 32).is_err());
    }
}
