use super::error::PacketError;
use super::layout;

/// Bounds-checked access to the IP payload of one packet.
pub struct PacketReader<'a> {
    payload: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), PacketError> {
        if self.payload.len() < needed {
            return Err(PacketError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn udp_payload(&self) -> Result<&'a [u8], PacketError> {
        self.payload_after(layout::UDP_HEADER_LEN)
    }

    /// Payload after a TCP header, honoring its data offset.
    pub fn tcp_payload(&self) -> Result<&'a [u8], PacketError> {
        self.require_len(layout::TCP_MIN_HEADER_LEN)?;
        let words = self.payload[layout::TCP_DATA_OFFSET_BYTE] >> layout::TCP_DATA_OFFSET_SHIFT;
        let header_len = usize::from(words) * layout::TCP_WORD_LEN;
        if header_len < layout::TCP_MIN_HEADER_LEN {
            return Err(PacketError::InvalidDataOffset { offset: header_len });
        }
        self.payload_after(header_len)
    }

    fn payload_after(&self, header_len: usize) -> Result<&'a [u8], PacketError> {
        self.require_len(header_len)?;
        self.payload.get(header_len..).ok_or(PacketError::TooShort {
            needed: header_len,
            actual: self.payload.len(),
        })
    }
}
