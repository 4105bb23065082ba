use super::error::Dnp3Error;

/// Bounds-checked little-endian access over a DNP3 byte slice.
///
/// Every read takes an absolute offset and fails with
/// `Dnp3Error::TooShort` instead of panicking.
pub struct Dnp3Reader<'a> {
    payload: &'a [u8],
}

impl<'a> Dnp3Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Bytes left after `offset` (zero when `offset` is past the end).
    pub fn remaining(&self, offset: usize) -> usize {
        self.payload.len().saturating_sub(offset)
    }

    pub fn require_len(&self, needed: usize) -> Result<(), Dnp3Error> {
        if self.payload.len() < needed {
            return Err(Dnp3Error::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, Dnp3Error> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(Dnp3Error::TooShort {
                needed: offset.saturating_add(1),
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_le(&self, offset: usize) -> Result<u16, Dnp3Error> {
        Ok(u16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, Dnp3Error> {
        Ok(u16::from_be_bytes(self.read_array(offset)?))
    }

    pub fn read_i16_le(&self, offset: usize) -> Result<i16, Dnp3Error> {
        Ok(i16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, Dnp3Error> {
        Ok(u32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i32_le(&self, offset: usize) -> Result<i32, Dnp3Error> {
        Ok(i32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f32_le(&self, offset: usize) -> Result<f32, Dnp3Error> {
        Ok(f32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f64_le(&self, offset: usize) -> Result<f64, Dnp3Error> {
        Ok(f64::from_le_bytes(self.read_array(offset)?))
    }

    /// 48-bit little-endian value (DNP3 absolute time in milliseconds).
    pub fn read_u48_le(&self, offset: usize) -> Result<u64, Dnp3Error> {
        let bytes: [u8; 6] = self.read_array(offset)?;
        let mut wide = [0u8; 8];
        wide[..6].copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(wide))
    }

    /// Unsigned little-endian field of 1, 2 or 4 bytes.
    pub fn read_uint_le(&self, offset: usize, width: usize) -> Result<u32, Dnp3Error> {
        match width {
            1 => self.read_u8(offset).map(u32::from),
            2 => self.read_u16_le(offset).map(u32::from),
            4 => self.read_u32_le(offset),
            _ => Err(Dnp3Error::InconsistentLength {
                offset,
                context: "unsupported field width",
            }),
        }
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], Dnp3Error> {
        self.payload.get(range.clone()).ok_or(Dnp3Error::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], Dnp3Error> {
        let bytes = self.read_slice(offset..offset.saturating_add(N))?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Dnp3Reader;
    use crate::protocols::dnp3::error::Dnp3Error;

    #[test]
    fn reads_little_endian_values() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let reader = Dnp3Reader::new(&data);
        assert_eq!(reader.read_u16_le(0).unwrap(), 0x1234);
        assert_eq!(reader.read_u16_be(0).unwrap(), 0x3412);
        assert_eq!(reader.read_u32_le(2).unwrap(), 0x1234_5678);
        assert_eq!(reader.read_u48_le(0).unwrap(), 0x1234_5678_1234);
        assert_eq!(reader.read_uint_le(0, 1).unwrap(), 0x34);
        assert_eq!(reader.read_uint_le(0, 2).unwrap(), 0x1234);
    }

    #[test]
    fn reads_signed_and_float_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-2i16).to_le_bytes());
        data.extend_from_slice(&(-70_000i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-0.25f64).to_le_bytes());
        let reader = Dnp3Reader::new(&data);
        assert_eq!(reader.read_i16_le(0).unwrap(), -2);
        assert_eq!(reader.read_i32_le(2).unwrap(), -70_000);
        assert_eq!(reader.read_f32_le(6).unwrap(), 1.5);
        assert_eq!(reader.read_f64_le(10).unwrap(), -0.25);
    }

    #[test]
    fn out_of_bounds_reports_needed_length() {
        let data = [0u8; 3];
        let reader = Dnp3Reader::new(&data);
        let err = reader.read_u32_le(1).unwrap_err();
        assert_eq!(
            err,
            Dnp3Error::TooShort {
                needed: 5,
                actual: 3
            }
        );
        assert!(reader.read_u8(3).is_err());
        assert_eq!(reader.remaining(1), 2);
        assert_eq!(reader.remaining(9), 0);
    }

    #[test]
    fn unsupported_width_is_rejected() {
        let data = [0u8; 8];
        let reader = Dnp3Reader::new(&data);
        let err = reader.read_uint_le(0, 3).unwrap_err();
        assert!(err.to_string().contains("unsupported field width"));
    }
}
