use crate::params::Params;
use indexmap::IndexMap;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

/// Palette index every frame reserves for "same as the previous frame".
pub(crate) const TRANSPARENT: u8 = 1;

const SLOTS: usize = 256;
const BUILD_ROUNDS: usize = 5;

pub(crate) type Rgb = [u8; 3];

const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];

#[derive(Clone, Copy)]
struct Assigned {
    slot: u8,
    color: Rgb,
}

/// A 256-slot palette together with the mapping decisions made while it was
/// computed. Slots 0 and 1 stay black (1 doubles as the transparent index),
/// slot 255 stays white, and slots 252-254 hold the frame's brightest red,
/// green and blue colors so averaging cannot wash out channel extremes.
pub(crate) struct Palette {
    hist: IndexMap<u32, u32>,
    assigned: HashMap<u32, Assigned>,
}

impl Palette {
    /// Quantizes the first frame of a stream: random pixel colors seed the
    /// mutable slots, then five rounds of weighted relaxation.
    pub(crate) fn build(frame: &[u8], params: &Params, rng: &mut StdRng) -> Self {
        let mut palette = Self {
            hist: survey(frame),
            assigned: HashMap::new(),
        };

        let mut slots = [BLACK; SLOTS];
        slots[255] = WHITE;

        for slot in 2..255 {
            let x = rng.gen_range(0..params.width() as usize);
            let y = rng.gen_range(0..params.height() as usize);
            let base = (y * params.width() as usize + x) * 4;

            slots[slot] = [frame[base], frame[base + 1], frame[base + 2]];
        }

        palette.assign(&slots);

        for _ in 0..BUILD_ROUNDS {
            palette.relax(&mut slots);
        }

        debug!("palette built over {} distinct colors", palette.hist.len());
        palette
    }

    /// Requantizes for the next frame. The previous slot colors seed the
    /// relaxation, which keeps color identity stable across frames instead
    /// of letting the palette flicker.
    pub(crate) fn adapt(&mut self, frame: &[u8]) {
        let mut slots = self.linear();

        self.hist = survey(frame);
        self.assigned.clear();
        self.assign(&slots);
        self.relax(&mut slots);

        debug!("palette adapted over {} distinct colors", self.hist.len());
    }

    /// One relaxation round: move every populated slot to the weighted
    /// average of its colors, force the reserved and highlight slots, and
    /// reseed empty slots from the worst-represented colors.
    fn relax(&mut self, slots: &mut [Rgb; SLOTS]) {
        let mut sums = [[0u64; 3]; SLOTS];
        let mut counts = [0u64; SLOTS];
        let mut brightest = [(0u8, BLACK); 3];

        for (&rgb, &count) in &self.hist {
            let color = channels(rgb);
            let slot = self.assigned[&rgb].slot as usize;

            for channel in 0..3 {
                if color[channel] > brightest[channel].0 {
                    brightest[channel] = (color[channel], color);
                }

                sums[slot][channel] += (color[channel] as u64) * (count as u64);
            }

            counts[slot] += count as u64;
        }

        for slot in 2..255 {
            if counts[slot] > 0 {
                let bias = counts[slot] / 2;

                for channel in 0..3 {
                    slots[slot][channel] = ((sums[slot][channel] + bias) / counts[slot]) as u8;
                }
            } else {
                slots[slot] = BLACK;
            }
        }

        slots[0] = BLACK;
        slots[1] = BLACK;
        slots[252] = brightest[0].1;
        slots[253] = brightest[1].1;
        slots[254] = brightest[2].1;
        slots[255] = WHITE;

        let mut outliers: Vec<(u64, u32)> = self
            .hist
            .iter()
            .map(|(&rgb, &count)| {
                let dist = distance(channels(rgb), self.assigned[&rgb].color);
                ((dist as u64) * (count as u64), rgb)
            })
            .collect();

        outliers.sort_unstable();

        for slot in 2..252 {
            if counts[slot] == 0 {
                if let Some((_, rgb)) = outliers.pop() {
                    slots[slot] = channels(rgb);
                }
            }
        }

        self.assign(slots);
    }

    /// Maps every histogram color to its nearest slot by L1 distance. Ties
    /// go to the lowest slot index.
    fn assign(&mut self, slots: &[Rgb; SLOTS]) {
        for (&rgb, _) in &self.hist {
            let color = channels(rgb);

            let mut best = 0;
            let mut best_diff = u32::MAX;

            for (slot, candidate) in slots.iter().enumerate() {
                let diff = distance(color, *candidate);

                if diff < best_diff {
                    best_diff = diff;
                    best = slot;
                }
            }

            self.assigned.insert(
                rgb,
                Assigned {
                    slot: best as u8,
                    color: slots[best],
                },
            );
        }
    }

    pub(crate) fn entry(&self, rgb: u32) -> (u8, Rgb) {
        let assigned = self.assigned[&rgb];

        (assigned.slot, assigned.color)
    }

    /// The palette as a flat slot table. Slots no color is assigned to come
    /// out black; the reserved slots are forced.
    pub(crate) fn linear(&self) -> [Rgb; SLOTS] {
        let mut slots = [BLACK; SLOTS];

        for (&rgb, _) in &self.hist {
            let assigned = self.assigned[&rgb];
            slots[assigned.slot as usize] = assigned.color;
        }

        slots[0] = BLACK;
        slots[1] = BLACK;
        slots[255] = WHITE;
        slots
    }
}

pub(crate) fn key(px: &[u8]) -> u32 {
    ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | (px[2] as u32)
}

fn channels(key: u32) -> Rgb {
    [(key >> 16) as u8, (key >> 8) as u8, key as u8]
}

fn distance(a: Rgb, b: Rgb) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&a, &b)| ((a as i32) - (b as i32)).unsigned_abs())
        .sum()
}

fn survey(frame: &[u8]) -> IndexMap<u32, u32> {
    let mut hist = IndexMap::new();

    for px in frame.chunks_exact(4) {
        *hist.entry(key(px)).or_insert(0) += 1;
    }

    hist
}
