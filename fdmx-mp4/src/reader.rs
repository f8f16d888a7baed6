/*
    REFERENCES
    ----------

    1. https://github.com/shaka-project/shaka-player/blob/f539147d480fff9cc8d685f3aac0e6f5dc28a182/lib/util/data_view_reader.js

*/

use crate::{Error, Result};

/// Big-endian reader over a borrowed byte slice.
///
/// All reads are bounds checked and fail with [`Error::Read`] instead of
/// panicking, so truncated boxes surface as ordinary errors.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    pub fn get_length(&self) -> usize {
        self.data.len()
    }

    pub fn get_position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn skip(&mut self, bytes: usize) -> Result<()> {
        self.take(bytes, "skipped bytes")?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let buf = self.take(2, "u16")?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let buf = self.take(4, "u32")?;
        Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0; 8];
        buf.copy_from_slice(self.take(8, "u64")?);
        Ok(u64::from_be_bytes(buf))
    }

    /// Borrow the next `bytes` bytes without copying them.
    pub fn read_bytes(&mut self, bytes: usize) -> Result<&'a [u8]> {
        self.take(bytes, "byte array")
    }

    /// Borrow everything from the current position to the end.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = &self.data[self.position..];
        self.position = self.data.len();
        rest
    }

    /// Read a NUL terminated utf-8 string. The terminator is consumed but not
    /// returned.
    pub fn read_terminated_string(&mut self, field: &'static str) -> Result<&'a str> {
        let rest = &self.data[self.position..];
        let len = rest
            .iter()
            .position(|x| *x == 0)
            .ok_or_else(|| Error::Read(format!("{} (missing NUL terminator)", field)))?;

        let value = std::str::from_utf8(&rest[..len])
            .map_err(|source| Error::Decode { field, source })?;
        self.position += len + 1;
        Ok(value)
    }

    fn take(&mut self, bytes: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(bytes)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::Read(format!(
                    "{} ({} bytes at position {} of {})",
                    what,
                    bytes,
                    self.position,
                    self.data.len()
                ))
            })?;

        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian_fields() {
        let data = [0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3, 9];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.read_u64().unwrap(), 3);
        assert_eq!(reader.read_u8().unwrap(), 9);
        assert!(!reader.has_more_data());
    }

    #[test]
    fn test_truncated_read_keeps_position() {
        let data = [0, 0, 1];
        let mut reader = Reader::new(&data);

        let error = reader.read_u32().unwrap_err();
        assert!(error.is_read_err());
        assert_eq!(reader.get_position(), 0);
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_terminated_string() {
        let data = b"urn:a\0b\0rest";
        let mut reader = Reader::new(data);

        assert_eq!(reader.read_terminated_string("first").unwrap(), "urn:a");
        assert_eq!(reader.read_terminated_string("second").unwrap(), "b");
        assert!(reader.read_terminated_string("third").unwrap_err().is_read_err());
        assert_eq!(reader.read_to_end(), b"rest");
    }

    #[test]
    fn test_skip_out_of_bounds() {
        let mut reader = Reader::new(&[0; 4]);
        assert!(reader.skip(4).is_ok());
        assert!(reader.skip(1).is_err());
    }
}
