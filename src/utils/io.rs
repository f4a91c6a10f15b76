// Little-endian field helpers for tag and block headers

/// Read a little-endian 32-bit integer at `offset`
pub fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buffer = [0u8; 4];
    buffer.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buffer)
}

/// Read a little-endian 16-bit integer at `offset`
pub fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut buffer = [0u8; 2];
    buffer.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(buffer)
}

/// Append a little-endian 32-bit integer
pub fn put_le_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Check for a signature at the start of `bytes`
pub fn has_signature(bytes: &[u8], signature: &[u8]) -> bool {
    bytes.len() >= signature.len() && &bytes[..signature.len()] == signature
}
