use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Byte-aligned reader for replay protocol data
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let v = *self.data.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.read_bytes(8)?))
    }

    /// Read a signed variable-length integer.
    ///
    /// Bit 0 of the first byte is the sign, the next six bits are the low
    /// magnitude bits; every byte with bit 7 set is followed by seven more.
    pub fn read_vint(&mut self) -> Result<i64> {
        let mut b = self.read_u8()?;
        let negative = b & 1 != 0;
        let mut result = i64::from((b >> 1) & 0x3f);
        let mut bits = 6u32;
        while b & 0x80 != 0 {
            b = self.read_u8()?;
            let chunk = i64::from(b & 0x7f);
            // magnitude must stay below 2^63 so negation cannot overflow
            if bits >= 63 || chunk >> (63 - bits) != 0 {
                return Err(Error::InvalidValue {
                    field: "vint",
                    value: "out of range".into(),
                });
            }
            result |= chunk << bits;
            bits += 7;
        }
        Ok(if negative { -result } else { result })
    }

    /// Read a non-negative variable-length integer used as a length or count
    pub fn read_len(&mut self) -> Result<usize> {
        let v = self.read_vint()?;
        usize::try_from(v).map_err(|_| Error::InvalidValue {
            field: "length",
            value: v.to_string(),
        })
    }
}
