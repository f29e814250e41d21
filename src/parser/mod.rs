mod attachment;
mod load;
mod timeline;

pub use load::*;

use crate::error::{Result, SkelError, SkelErrorKind};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

/// Upper bound on speculative allocation from a length prefix. Longer arrays
/// still read fine, they just grow as they go.
const PREALLOC_LIMIT: usize = 4096;

/// Wire value of a nullable array that is absent (the varint of -1).
pub const NULL_ARRAY: u32 = u32::MAX;

/// Streaming decoder over the `.skel` wire primitives.
pub struct SkelReader<R: Read> {
    reader: R,
    nonessential: bool,
}

impl<R: Read> SkelReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            nonessential: false,
        }
    }

    /// Decodes gated fields as if the document header set `nonessential`.
    pub fn with_nonessential(mut self, nonessential: bool) -> Self {
        self.nonessential = nonessential;
        self
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Base-128, least significant group first, at most five bytes.
    pub fn read_varint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.reader.read_u8()?;
            // The fifth group only has room for four bits and no continuation.
            if shift == 28 && byte & 0xF0 != 0 {
                return Err(SkelError::new(SkelErrorKind::VarintOverflow));
            }
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Length-prefixed Latin-1 string: 0 is null, 1 is empty.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let n = self.read_varint()?;
        if n == 0 {
            return Ok(None);
        }
        let len = u64::from(n - 1);
        let mut bytes = Vec::new();
        (&mut self.reader).take(len).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != len {
            return Err(SkelError::new(SkelErrorKind::Truncated));
        }
        Ok(Some(bytes.into_iter().map(char::from).collect()))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.reader.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.reader.read_i8()?)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.reader.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.reader.read_i16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.reader.read_u32::<BigEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.reader.read_f32::<BigEndian>()?)
    }

    pub fn read_array<T>(&mut self, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.read_indexed_array(|r, _, _| read(r))
    }

    /// Like [`read_array`](Self::read_array) but hands the element reader the
    /// element count and index, which the curve trailer depends on.
    pub fn read_indexed_array<T>(
        &mut self,
        read: impl FnMut(&mut Self, usize, usize) -> Result<T>,
    ) -> Result<Vec<T>> {
        let n = self.read_varint()?;
        self.read_elements(n as usize, read)
    }

    /// Array whose count may be [`NULL_ARRAY`], meaning absent.
    pub fn read_nullable_array<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Option<Vec<T>>> {
        let n = self.read_varint()?;
        if n == NULL_ARRAY {
            return Ok(None);
        }
        self.read_elements(n as usize, |r, _, _| read(r)).map(Some)
    }

    fn read_elements<T>(
        &mut self,
        n: usize,
        mut read: impl FnMut(&mut Self, usize, usize) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        for i in 0..n {
            items.push(read(self, n, i)?);
        }
        Ok(items)
    }

    pub fn read_floats(&mut self, n: usize) -> Result<Vec<f32>> {
        self.read_elements(n, |r, _, _| r.read_f32())
    }

    pub fn read_float_array(&mut self) -> Result<Vec<f32>> {
        self.read_array(Self::read_f32)
    }

    pub fn read_short_array(&mut self) -> Result<Vec<i16>> {
        self.read_array(Self::read_i16)
    }

    pub fn read_varint_array(&mut self) -> Result<Vec<u32>> {
        self.read_array(Self::read_varint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> SkelReader<&[u8]> {
        SkelReader::new(bytes)
    }

    #[test]
    fn test_read_varint() {
        assert_eq!(reader(&[0x00]).read_varint().unwrap(), 0);
        assert_eq!(reader(&[0x7F]).read_varint().unwrap(), 127);
        assert_eq!(reader(&[0x80, 0x01]).read_varint().unwrap(), 128);
        assert_eq!(reader(&[0xFF, 0x7F]).read_varint().unwrap(), 16383);
        assert_eq!(reader(&[0x80, 0x80, 0x01]).read_varint().unwrap(), 16384);
        assert_eq!(
            reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).read_varint().unwrap(),
            u32::MAX
        );
    }

    #[test]
    fn test_read_varint_stops_at_terminal_byte() {
        let mut r = reader(&[0x05, 0x06]);
        assert_eq!(r.read_varint().unwrap(), 5);
        assert_eq!(r.read_varint().unwrap(), 6);
    }

    #[test]
    fn test_read_varint_overflow() {
        let err = reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x8F, 0x01])
            .read_varint()
            .unwrap_err();
        assert_eq!(err.kind, SkelErrorKind::VarintOverflow);

        let err = reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]).read_varint().unwrap_err();
        assert_eq!(err.kind, SkelErrorKind::VarintOverflow);
    }

    #[test]
    fn test_read_varint_truncated() {
        let err = reader(&[0x80, 0x80]).read_varint().unwrap_err();
        assert_eq!(err.kind, SkelErrorKind::Truncated);
    }

    #[test]
    fn test_read_string() {
        assert_eq!(reader(&[0x00]).read_string().unwrap(), None);
        assert_eq!(reader(&[0x01]).read_string().unwrap(), Some(String::new()));
        assert_eq!(
            reader(&[0x04, b'r', b'u', b'n']).read_string().unwrap(),
            Some("run".to_string())
        );
    }

    #[test]
    fn test_read_string_is_latin1() {
        let s = reader(&[0x03, 0xE9, 0xFF]).read_string().unwrap().unwrap();
        assert_eq!(s, "\u{e9}\u{ff}");
        assert_eq!(s.chars().count(), 2);
    }

    #[test]
    fn test_read_string_truncated() {
        let err = reader(&[0x05, b'a', b'b']).read_string().unwrap_err();
        assert_eq!(err.kind, SkelErrorKind::Truncated);
    }

    #[test]
    fn test_read_fixed_width_big_endian() {
        let mut r = reader(&[0xFF, 0xFE, 0x12, 0x34, 0x56, 0x78, 0x3F, 0x80, 0x00, 0x00, 0x02]);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_u32().unwrap(), 0x12345678);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert!(r.read_bool().unwrap());
    }

    #[test]
    fn test_read_nullable_array() {
        let absent = reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F])
            .read_nullable_array(SkelReader::read_u8)
            .unwrap();
        assert_eq!(absent, None);

        let empty = reader(&[0x00]).read_nullable_array(SkelReader::read_u8).unwrap();
        assert_eq!(empty, Some(vec![]));

        let two = reader(&[0x02, 0x09, 0x08])
            .read_nullable_array(SkelReader::read_u8)
            .unwrap();
        assert_eq!(two, Some(vec![9, 8]));
    }

    #[test]
    fn test_read_indexed_array_passes_count_and_index() {
        let seen = reader(&[0x03])
            .read_indexed_array(|_, n, i| Ok((n, i)))
            .unwrap();
        assert_eq!(seen, vec![(3, 0), (3, 1), (3, 2)]);
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let err = reader(&[0xFF, 0xFF, 0xFF, 0xFF, 0x07])
            .read_float_array()
            .unwrap_err();
        assert_eq!(err.kind, SkelErrorKind::Truncated);
    }
}
