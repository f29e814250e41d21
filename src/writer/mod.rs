mod attachment;
mod save;
mod timeline;

pub use save::*;

use crate::error::{Result, SkelError};
use crate::parser::NULL_ARRAY;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

/// Streaming encoder over the `.skel` wire primitives.
pub struct SkelWriter<W: Write> {
    writer: W,
    nonessential: bool,
}

impl<W: Write> SkelWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            nonessential: false,
        }
    }

    /// Encodes gated fields as if the document set `nonessential`.
    pub fn with_nonessential(mut self, nonessential: bool) -> Self {
        self.nonessential = nonessential;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Emits the fewest groups that hold `value`.
    pub fn write_varint(&mut self, mut value: u32) -> Result<()> {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.writer.write_u8(byte)?;
                return Ok(());
            }
            self.writer.write_u8(byte | 0x80)?;
        }
    }

    /// Length-prefixed Latin-1 string. Fails on characters above U+00FF.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            return self.write_varint(0);
        };
        let bytes = value
            .chars()
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    SkelError::unrepresentable(format!(
                        "character {c:?} in {value:?} does not fit in one byte"
                    ))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        self.write_len(bytes.len().checked_add(1))?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.writer.write_u8(value)?)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        Ok(self.writer.write_i8(value)?)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        Ok(self.writer.write_u8(u8::from(value))?)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        Ok(self.writer.write_i16::<BigEndian>(value)?)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        Ok(self.writer.write_u32::<BigEndian>(value)?)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        Ok(self.writer.write_f32::<BigEndian>(value)?)
    }

    /// Array counts share the varint range with the null sentinel, so the
    /// largest writable count is one less than it.
    fn write_len(&mut self, len: Option<usize>) -> Result<()> {
        match len.and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n != NULL_ARRAY => self.write_varint(n),
            _ => Err(SkelError::unrepresentable(
                "length exceeds the varint range",
            )),
        }
    }

    pub fn write_array<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_indexed_array(items, |w, _, _, item| write(w, item))
    }

    /// Hands the element writer the count and index, which the curve trailer
    /// depends on.
    pub fn write_indexed_array<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut Self, usize, usize, &T) -> Result<()>,
    ) -> Result<()> {
        let n = items.len();
        self.write_len(Some(n))?;
        for (i, item) in items.iter().enumerate() {
            write(self, n, i, item)?;
        }
        Ok(())
    }

    /// `None` is written as the null sentinel, distinct from an empty array.
    pub fn write_nullable_array<T>(
        &mut self,
        items: Option<&[T]>,
        write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        match items {
            Some(items) => self.write_array(items, write),
            None => self.write_varint(NULL_ARRAY),
        }
    }

    pub fn write_floats(&mut self, values: &[f32]) -> Result<()> {
        for &value in values {
            self.write_f32(value)?;
        }
        Ok(())
    }

    pub fn write_float_array(&mut self, values: &[f32]) -> Result<()> {
        self.write_array(values, |w, &v| w.write_f32(v))
    }

    pub fn write_short_array(&mut self, values: &[i16]) -> Result<()> {
        self.write_array(values, |w, &v| w.write_i16(v))
    }

    pub fn write_varint_array(&mut self, values: &[u32]) -> Result<()> {
        self.write_array(values, |w, &v| w.write_varint(v))
    }
}

/// Error for a field the nonessential flag requires but the document lacks.
pub(crate) fn missing_nonessential(field: &str) -> SkelError {
    SkelError::unrepresentable(format!("{field} is required when nonessential is set"))
}
