//! Bounds-checked byte cursor used by the wire codec.
//!
//! One type serves both directions. For writing, the cursor starts empty
//! with a fixed `capacity` (the block payload cap) and refuses to grow past
//! it. For reading, it wraps a copy of the input and the limit is its
//! length. Either way, any access that would cross the limit fails with
//! [`TransactionError::BufferBounds`] instead of panicking.

use super::error::TransactionError;

macro_rules! int_accessors {
    ($($ty:ty => $read_le:ident, $read_be:ident, $write_le:ident, $write_be:ident;)*) => {
        $(
            pub fn $read_le(&mut self) -> Result<$ty, TransactionError> {
                Ok(<$ty>::from_le_bytes(self.read_array()?))
            }

            pub fn $read_be(&mut self) -> Result<$ty, TransactionError> {
                Ok(<$ty>::from_be_bytes(self.read_array()?))
            }

            pub fn $write_le(&mut self, value: $ty) -> Result<(), TransactionError> {
                self.write_bytes(&value.to_le_bytes())
            }

            pub fn $write_be(&mut self, value: $ty) -> Result<(), TransactionError> {
                self.write_bytes(&value.to_be_bytes())
            }
        )*
    };
}

#[derive(Debug, Clone)]
pub struct BinaryCursor {
    buffer: Vec<u8>,
    limit: usize,
    offset: usize,
}

impl BinaryCursor {
    /// An empty write cursor that accepts at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity.min(4096)),
            limit: capacity,
            offset: 0,
        }
    }

    /// A read cursor positioned at the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            buffer: bytes.to_vec(),
            limit: bytes.len(),
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left to read before the end of the written/loaded data.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// The bytes between the start and the current offset.
    pub fn consumed(&self) -> &[u8] {
        &self.buffer[..self.offset.min(self.buffer.len())]
    }

    /// Moves the offset by `delta` bytes, backwards when negative.
    pub fn jump(&mut self, delta: isize) -> Result<(), TransactionError> {
        let target = self.offset as isize + delta;
        if target < 0 || target as usize > self.buffer.len() {
            return Err(TransactionError::BufferBounds {
                offset: self.offset,
                requested: delta.unsigned_abs(),
                limit: self.buffer.len(),
            });
        }
        self.offset = target as usize;
        Ok(())
    }

    /// Looks `ahead` bytes past the offset without moving it.
    pub fn peek_u8(&self, ahead: usize) -> Result<u8, TransactionError> {
        self.buffer
            .get(self.offset + ahead)
            .copied()
            .ok_or(TransactionError::BufferBounds {
                offset: self.offset,
                requested: ahead + 1,
                limit: self.buffer.len(),
            })
    }

    pub fn read_u8(&mut self) -> Result<u8, TransactionError> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), TransactionError> {
        self.write_bytes(&[value])
    }

    int_accessors! {
        u16 => read_u16_le, read_u16_be, write_u16_le, write_u16_be;
        u32 => read_u32_le, read_u32_be, write_u32_le, write_u32_be;
        u64 => read_u64_le, read_u64_be, write_u64_le, write_u64_be;
        i64 => read_i64_le, read_i64_be, write_i64_le, write_i64_be;
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, TransactionError> {
        Ok(self.take(length)?.to_vec())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads `length` bytes and hex-encodes them.
    pub fn read_hex(&mut self, length: usize) -> Result<String, TransactionError> {
        Ok(hex::encode(self.take(length)?))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransactionError> {
        let end = self.offset + bytes.len();
        if end > self.limit {
            return Err(TransactionError::BufferBounds {
                offset: self.offset,
                requested: bytes.len(),
                limit: self.limit,
            });
        }
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.offset..end].copy_from_slice(bytes);
        self.offset = end;
        Ok(())
    }

    /// Decodes `value` as hex and writes it, checking the decoded length.
    pub fn write_hex(
        &mut self,
        field: &'static str,
        value: &str,
        expected_len: Option<usize>,
    ) -> Result<(), TransactionError> {
        let bytes = hex::decode(value).map_err(|e| TransactionError::encoding(field, e))?;
        if let Some(expected) = expected_len {
            if bytes.len() != expected {
                return Err(TransactionError::encoding(
                    field,
                    format!("expected {} bytes, got {}", expected, bytes.len()),
                ));
            }
        }
        self.write_bytes(&bytes)
    }

    /// The written (or loaded) bytes up to the current offset.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.offset);
        self.buffer
    }

    fn take(&mut self, length: usize) -> Result<&[u8], TransactionError> {
        let end = self.offset.checked_add(length).filter(|end| *end <= self.buffer.len());
        let Some(end) = end else {
            return Err(TransactionError::BufferBounds {
                offset: self.offset,
                requested: length,
                limit: self.buffer.len(),
            });
        };
        let start = self.offset;
        self.offset = end;
        Ok(&self.buffer[start..end])
    }
}
