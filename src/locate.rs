// Locating trailing tags
//
// Only the tail of the stream is examined: the ID3v1 tag must be the last
// 128 bytes, and the APE footer must end exactly where the ID3v1 tag begins
// (or at end of stream when there is no ID3v1 tag). An APE tag anywhere else
// is not found.

use crate::ape::{ApeFooter, APE_SIGNATURE};
use crate::error::Result;
use crate::id3::Id3v1Tag;
use crate::stream::TagStream;
use crate::utils::io::has_signature;

/// Offset of the ID3v1 tag, if the stream ends with one
pub fn find_id3v1<S: TagStream + ?Sized>(stream: &mut S) -> Result<Option<u64>> {
    let length = stream.length()?;
    let Some(offset) = length.checked_sub(Id3v1Tag::TAG_SIZE as u64) else {
        return Ok(None);
    };
    let magic = stream.read_block(offset, Id3v1Tag::TAG_ID.len())?;
    Ok(has_signature(&magic, &Id3v1Tag::TAG_ID).then_some(offset))
}

/// Offset of the APE tag *footer* ending at `id3v1_location` (or at end of stream)
pub fn find_ape<S: TagStream + ?Sized>(
    stream: &mut S,
    id3v1_location: Option<u64>,
) -> Result<Option<u64>> {
    let end = match id3v1_location {
        Some(location) => location,
        None => stream.length()?,
    };
    let Some(offset) = end.checked_sub(ApeFooter::SIZE as u64) else {
        return Ok(None);
    };
    let magic = stream.read_block(offset, APE_SIGNATURE.len())?;
    Ok(has_signature(&magic, APE_SIGNATURE).then_some(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ape::ApeTag;
    use crate::stream::MemoryStream;

    #[test]
    fn test_find_id3v1() {
        let mut bytes = vec![0u8; 50];
        bytes.extend(Id3v1Tag::default().render());
        let mut stream = MemoryStream::new(bytes);
        assert_eq!(find_id3v1(&mut stream).unwrap(), Some(50));
    }

    #[test]
    fn test_find_id3v1_absent_or_short() {
        let mut stream = MemoryStream::new(vec![0u8; 500]);
        assert_eq!(find_id3v1(&mut stream).unwrap(), None);
        let mut stream = MemoryStream::new(b"TAG".to_vec());
        assert_eq!(find_id3v1(&mut stream).unwrap(), None);
    }

    #[test]
    fn test_find_ape_before_id3v1() {
        let mut bytes = vec![0u8; 20];
        bytes.extend(ApeTag::new().render());
        bytes.extend(Id3v1Tag::default().render());
        let mut stream = MemoryStream::new(bytes);

        let id3v1 = find_id3v1(&mut stream).unwrap();
        assert_eq!(id3v1, Some(84));
        assert_eq!(find_ape(&mut stream, id3v1).unwrap(), Some(52));
        // Without the bound the footer is not at end of stream
        assert_eq!(find_ape(&mut stream, None).unwrap(), None);
    }

    #[test]
    fn test_non_adjacent_ape_is_not_found() {
        let mut bytes = ApeTag::new().render();
        bytes.extend([0u8; 16]);
        let mut stream = MemoryStream::new(bytes);
        assert_eq!(find_ape(&mut stream, None).unwrap(), None);
    }
}
