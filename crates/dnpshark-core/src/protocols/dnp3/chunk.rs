//! De-interleaving of CRC-protected user data chunks.

use super::crc;
use super::error::Dnp3Error;
use super::layout;
use super::reader::Dnp3Reader;

/// Strip chunk checksums from the user data of one frame.
///
/// `frame` starts at the link header; `payload_len` is the number of user
/// data octets declared by the header. Chunks are validated in order and the
/// first mismatch discards everything collected so far.
pub fn dechunk(frame: &[u8], payload_len: usize) -> Result<Vec<u8>, Dnp3Error> {
    let reader = Dnp3Reader::new(frame);
    let mut data = Vec::with_capacity(payload_len);
    let mut offset = layout::HEADER_LEN;
    let mut remaining = payload_len;
    let mut index = 0;

    while remaining > 0 {
        let chunk_len = remaining.min(layout::CHUNK_DATA_LEN);
        let chunk = reader.read_slice(offset..offset + chunk_len)?;
        let stored = reader.read_u16_le(offset + chunk_len)?;
        let computed = crc::crc16(chunk);
        if computed != stored {
            return Err(Dnp3Error::ChunkChecksum {
                index,
                computed,
                stored,
            });
        }
        data.extend_from_slice(chunk);
        offset += chunk_len + layout::CHUNK_CRC_LEN;
        remaining -= chunk_len;
        index += 1;
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::dechunk;
    use crate::protocols::dnp3::crc::crc16;
    use crate::protocols::dnp3::error::Dnp3Error;
    use crate::protocols::dnp3::layout;

    fn frame_with_chunks(payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0u8; layout::HEADER_LEN];
        for chunk in payload.chunks(layout::CHUNK_DATA_LEN) {
            frame.extend_from_slice(chunk);
            frame.extend_from_slice(&crc16(chunk).to_le_bytes());
        }
        frame
    }

    #[test]
    fn strips_checksums_across_chunks() {
        let payload: Vec<u8> = (0u8..40).collect();
        let frame = frame_with_chunks(&payload);
        assert_eq!(frame.len(), layout::HEADER_LEN + 40 + 3 * 2);
        assert_eq!(dechunk(&frame, payload.len()).unwrap(), payload);
    }

    #[test]
    fn bad_chunk_discards_whole_payload() {
        let payload: Vec<u8> = (0u8..20).collect();
        let mut frame = frame_with_chunks(&payload);
        let second_chunk = layout::HEADER_LEN + layout::CHUNK_DATA_LEN + layout::CHUNK_CRC_LEN;
        frame[second_chunk] ^= 0x01;
        let err = dechunk(&frame, payload.len()).unwrap_err();
        assert!(matches!(err, Dnp3Error::ChunkChecksum { index: 1, .. }));
    }

    #[test]
    fn truncated_chunk_is_too_short() {
        let payload = [1u8, 2, 3];
        let frame = frame_with_chunks(&payload);
        let err = dechunk(&frame[..frame.len() - 1], payload.len()).unwrap_err();
        assert!(matches!(err, Dnp3Error::TooShort { .. }));
    }

    #[test]
    fn empty_payload_is_empty() {
        let frame = vec![0u8; layout::HEADER_LEN];
        assert!(dechunk(&frame, 0).unwrap().is_empty());
    }
}
