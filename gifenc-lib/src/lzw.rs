use crate::block::BlockWriter;
use anyhow::Result;
use log::trace;
use std::io::Write;

pub(crate) const MIN_CODE_SIZE: u8 = 8;

const CLEAR: u16 = 256;
const END_OF_INFORMATION: u16 = 257;
const FIRST_FREE: u16 = 258;
const MAX_CODES: u16 = 4096;
const MIN_WIDTH: u8 = 9;

/// Child edges of one dictionary node, keyed by symbol. Zero means "no
/// child": allocated children always sit at arena index 258 or above.
type Node = [u16; 256];

/// Dictionary over symbol sequences, stored as an arena trie where a node's
/// arena index is its code. The first 258 nodes are the singleton sequences
/// plus the two reserved codes.
struct Dict {
    nodes: Vec<Node>,
}

impl Dict {
    fn new() -> Self {
        let mut dict = Self {
            nodes: Vec::with_capacity(MAX_CODES as usize),
        };

        dict.reset();
        dict
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.resize(FIRST_FREE as usize, [0; 256]);
    }

    fn child(&self, node: u16, symbol: u8) -> Option<u16> {
        match self.nodes[node as usize][symbol as usize] {
            0 => None,
            child => Some(child),
        }
    }

    fn add(&mut self, node: u16, symbol: u8) -> u16 {
        let code = self.nodes.len() as u16;

        self.nodes[node as usize][symbol as usize] = code;
        self.nodes.push([0; 256]);
        code
    }
}

/// Compresses a stream of palette indices into GIF-framed LZW sub-blocks.
///
/// The code width starts at 9 bits and grows whenever the just-assigned
/// code no longer fits; once code 4095 has been assigned the dictionary is
/// cleared back to its initial state, announced by a clear code. The end of
/// the stream is a clear code followed by end-of-information at 9 bits.
pub(crate) fn encode<W: Write>(indices: &[u8], sink: &mut W) -> Result<()> {
    let mut blocks = BlockWriter::new(sink);
    let mut dict = Dict::new();
    let mut width = MIN_WIDTH;

    blocks.write_code(CLEAR, width)?;

    let mut symbols = indices.iter().copied();

    let mut current = match symbols.next() {
        Some(first) => first as u16,
        None => {
            blocks.write_code(END_OF_INFORMATION, width)?;
            blocks.pad()?;
            blocks.flush()?;

            return Ok(());
        }
    };

    for symbol in symbols {
        if let Some(child) = dict.child(current, symbol) {
            current = child;
            continue;
        }

        blocks.write_code(current, width)?;

        let code = dict.add(current, symbol);

        if code >= 1 << width {
            width += 1;
        }

        if code == MAX_CODES - 1 {
            assert!(width == 12, "dictionary reset away from the 12-bit ceiling");

            blocks.write_code(CLEAR, width)?;
            dict.reset();
            width = MIN_WIDTH;
            trace!("dictionary reset");
        }

        current = symbol as u16;
    }

    blocks.write_code(current, width)?;
    blocks.write_code(CLEAR, width)?;
    blocks.write_code(END_OF_INFORMATION, MIN_WIDTH)?;
    blocks.pad()?;
    blocks.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unframe(mut data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();

        while !data.is_empty() {
            let len = data[0] as usize;
            out.extend_from_slice(&data[1..1 + len]);
            data = &data[1 + len..];
        }

        out
    }

    fn decode(framed: &[u8]) -> Vec<u8> {
        let mut decoded = Vec::new();

        weezl::decode::Decoder::new(weezl::BitOrder::Lsb, MIN_CODE_SIZE)
            .into_stream(&mut decoded)
            .decode(unframe(framed).as_slice())
            .status
            .unwrap();

        decoded
    }

    #[test]
    fn encodes_single_symbol_stream() {
        let mut out = Vec::new();
        encode(&[0], &mut out).unwrap();

        // clear, 0, clear, end-of-information, all at 9 bits, zero-padded
        assert_eq!(out, [5, 0x00, 0x01, 0x00, 0x0C, 0x08]);
        assert_eq!(decode(&out), [0]);
    }

    #[test]
    fn round_trips_repetitive_stream() {
        let mut indices = Vec::new();

        for run in 0..64u32 {
            indices.extend(std::iter::repeat((run % 7) as u8).take(100));
        }

        let mut out = Vec::new();
        encode(&indices, &mut out).unwrap();

        assert_eq!(decode(&out), indices);
    }

    #[test]
    fn round_trips_through_dictionary_resets() {
        // Incompressible input forces the dictionary past 4096 codes
        // several times over.
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let indices: Vec<u8> = (0..40_000)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect();

        let mut out = Vec::new();
        encode(&indices, &mut out).unwrap();

        assert_eq!(decode(&out), indices);
    }

    #[test]
    fn round_trips_every_symbol_value() {
        let indices: Vec<u8> = (0..=255).collect();

        let mut out = Vec::new();
        encode(&indices, &mut out).unwrap();

        assert_eq!(decode(&out), indices);
    }
}
