mod block;
mod container;
mod dither;
mod frame;
mod lzw;
mod palette;
mod params;
mod source;
mod stats;

use crate::palette::Palette;
use crate::stats::CountingWriter;
use anyhow::Result;
use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

pub use self::{params::Params, source::Source, stats::Stats};

/// Fixed seed for palette slot sampling, so equal inputs produce byte-equal
/// streams.
const SAMPLE_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct GifEncoder<W: Write> {
    sink: CountingWriter<W>,
    params: Params,
    palette: Palette,
    prev: Vec<u8>,
    stats: Stats,
}

impl<W: Write> GifEncoder<W> {
    /// Starts a stream on `sink`: writes the header, the global color table,
    /// the infinite-loop extension when `delay` is non-zero, and the first
    /// frame. `first` is RGBA, row-major; `delay` is in hundredths of a
    /// second. The first frame is palettized directly, without dithering.
    pub fn new(sink: W, params: Params, first: &[u8], delay: u16) -> Result<Self> {
        let mut sink = CountingWriter::new(sink);
        let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
        let mut prev = first.to_vec();

        let palette = Palette::build(first, &params, &mut rng);
        let indices = frame::remap(first, &mut prev, &palette);

        container::write_header(&mut sink, &params, &palette)?;

        if delay != 0 {
            container::write_loop_extension(&mut sink)?;
        }

        container::write_frame(&mut sink, &params, &palette, &indices, delay)?;

        Ok(Self {
            sink,
            params,
            palette,
            prev,
            stats: Stats { frames: 1, bytes: 0 },
        })
    }

    /// Encodes one more frame. Pixels unchanged since the previous frame
    /// become transparent, the palette is adapted to the new histogram, and
    /// the rest is dithered against it. The buffer is rewritten in place
    /// with the quantized colors.
    pub fn add(&mut self, next: &mut [u8], delay: u16) -> Result<()> {
        frame::mark_unchanged(&self.prev, next);
        self.palette.adapt(next);

        let indices = dither::dither(&mut self.prev, next, &self.palette, &self.params);

        container::write_frame(&mut self.sink, &self.params, &self.palette, &indices, delay)?;
        self.stats.frames += 1;
        trace!("frame {} encoded", self.stats.frames);

        Ok(())
    }

    /// Writes the trailer, flushes the sink and reports what was written.
    /// Dropping the encoder instead leaves the stream truncated.
    pub fn finish(mut self) -> Result<Stats> {
        container::write_trailer(&mut self.sink)?;
        self.sink.flush()?;
        self.stats.bytes = self.sink.written();

        Ok(self.stats)
    }
}
