use crate::lzw;
use crate::palette::{Palette, TRANSPARENT};
use crate::params::Params;
use anyhow::Result;
use std::io::Write;

const VERSION: &[u8] = b"GIF89a";
const EXTENSION: u8 = 0x21;
const APPLICATION: u8 = 0xFF;
const GRAPHIC_CONTROL: u8 = 0xF9;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

pub(crate) fn write_header<W: Write>(
    sink: &mut W,
    params: &Params,
    palette: &Palette,
) -> Result<()> {
    sink.write_all(VERSION)?;
    sink.write_all(&params.width().to_le_bytes())?;
    sink.write_all(&params.height().to_le_bytes())?;

    // unsorted 256-entry global color table, background index 0, square
    // pixels
    sink.write_all(&[0xF7, 0, 0])?;

    write_color_table(sink, palette)
}

pub(crate) fn write_loop_extension<W: Write>(sink: &mut W) -> Result<()> {
    sink.write_all(&[EXTENSION, APPLICATION, 11])?;
    sink.write_all(b"NETSCAPE2.0")?;

    // loop count zero means forever
    sink.write_all(&[3, 1, 0, 0, 0])?;

    Ok(())
}

pub(crate) fn write_frame<W: Write>(
    sink: &mut W,
    params: &Params,
    palette: &Palette,
    indices: &[u8],
    delay: u16,
) -> Result<()> {
    let delay = delay.to_le_bytes();

    // graphic control: dispose by leaving in place, transparency on
    sink.write_all(&[
        EXTENSION,
        GRAPHIC_CONTROL,
        4,
        0x05,
        delay[0],
        delay[1],
        TRANSPARENT,
        0,
    ])?;

    sink.write_all(&[IMAGE_SEPARATOR])?;
    sink.write_all(&0u16.to_le_bytes())?;
    sink.write_all(&0u16.to_le_bytes())?;
    sink.write_all(&params.width().to_le_bytes())?;
    sink.write_all(&params.height().to_le_bytes())?;

    // local 256-entry color table follows
    sink.write_all(&[0x87])?;
    write_color_table(sink, palette)?;

    sink.write_all(&[lzw::MIN_CODE_SIZE])?;
    lzw::encode(indices, sink)?;
    sink.write_all(&[0])?;

    Ok(())
}

pub(crate) fn write_trailer<W: Write>(sink: &mut W) -> Result<()> {
    sink.write_all(&[TRAILER])?;

    Ok(())
}

fn write_color_table<W: Write>(sink: &mut W, palette: &Palette) -> Result<()> {
    for color in palette.linear().iter() {
        sink.write_all(color)?;
    }

    Ok(())
}
