use anyhow::Result;
use std::io::Write;

const MAX_CHUNK: usize = 255;

/// Packs variable-width codes, least significant bit first, into the
/// length-prefixed data sub-blocks GIF expects for compressed image data.
/// Codes up to 16 bits wide are supported.
pub(crate) struct BlockWriter<'a, W: Write> {
    sink: &'a mut W,
    acc: u32,
    bits: u8,
    chunk: [u8; MAX_CHUNK],
    len: usize,
}

impl<'a, W: Write> BlockWriter<'a, W> {
    pub(crate) fn new(sink: &'a mut W) -> Self {
        Self {
            sink,
            acc: 0,
            bits: 0,
            chunk: [0; MAX_CHUNK],
            len: 0,
        }
    }

    pub(crate) fn write_code(&mut self, code: u16, width: u8) -> Result<()> {
        debug_assert!(width <= 16);

        self.acc |= ((code as u32) & ((1 << width) - 1)) << self.bits;
        self.bits += width;

        while self.bits >= 8 {
            self.push_byte(self.acc as u8)?;
            self.acc >>= 8;
            self.bits -= 8;
        }

        Ok(())
    }

    /// Zero-fills up to the next byte boundary.
    pub(crate) fn pad(&mut self) -> Result<()> {
        if self.bits > 0 {
            self.push_byte(self.acc as u8)?;
            self.acc = 0;
            self.bits = 0;
        }

        Ok(())
    }

    /// Writes any pending bytes as a final, shorter sub-block. The stream
    /// must be byte-aligned by this point.
    pub(crate) fn flush(&mut self) -> Result<()> {
        assert!(self.bits == 0, "flushed with a partial byte pending");

        if self.len > 0 {
            self.emit_chunk()?;
        }

        Ok(())
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.chunk[self.len] = byte;
        self.len += 1;

        if self.len == MAX_CHUNK {
            self.emit_chunk()?;
        }

        Ok(())
    }

    fn emit_chunk(&mut self) -> Result<()> {
        self.sink.write_all(&[self.len as u8])?;
        self.sink.write_all(&self.chunk[..self.len])?;
        self.len = 0;

        Ok(())
    }
}
