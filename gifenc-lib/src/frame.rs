use crate::palette::{self, Palette, TRANSPARENT};

/// Flags every pixel whose RGB matches the previous frame as transparent in
/// the alpha channel, and everything else as opaque.
pub(crate) fn mark_unchanged(prev: &[u8], next: &mut [u8]) {
    for (old, new) in prev.chunks_exact(4).zip(next.chunks_exact_mut(4)) {
        new[3] = if new[..3] == old[..3] { 0 } else { 255 };
    }
}

/// Palettizes a frame straight through the assignment table, without
/// dithering. Chosen colors are mirrored into `prev` so later frames are
/// diffed against what was actually encoded; pixels transparent at the
/// source keep the transparent index and leave `prev` alone.
pub(crate) fn remap(next: &[u8], prev: &mut [u8], palette: &Palette) -> Vec<u8> {
    let mut indices = Vec::with_capacity(next.len() / 4);

    for (new, old) in next.chunks_exact(4).zip(prev.chunks_exact_mut(4)) {
        if new[3] == 0 {
            indices.push(TRANSPARENT);
            continue;
        }

        let (slot, color) = palette.entry(palette::key(new));

        indices.push(slot);
        old[..3].copy_from_slice(&color);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const QUAD: [[u8; 3]; 4] = [[10, 20, 30], [200, 40, 60], [5, 90, 15], [60, 60, 200]];

    fn rgba(colors: &[[u8; 3]]) -> Vec<u8> {
        colors
            .iter()
            .flat_map(|color| vec![color[0], color[1], color[2], 255])
            .collect()
    }

    #[test]
    fn marks_only_unchanged_pixels() {
        let prev = rgba(&[[10, 20, 30], [200, 40, 60]]);
        let mut next = rgba(&[[10, 20, 30], [200, 41, 60]]);

        mark_unchanged(&prev, &mut next);

        assert_eq!(next[3], 0);
        assert_eq!(next[7], 255);
    }

    #[test]
    fn remap_mirrors_quantized_colors_into_prev() {
        let frame = rgba(&QUAD);
        let params = Params::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let palette = Palette::build(&frame, &params, &mut rng);

        let mut prev = vec![9; frame.len()];
        let indices = remap(&frame, &mut prev, &palette);

        let slots = palette.linear();

        for (at, color) in QUAD.iter().enumerate() {
            assert_eq!(slots[indices[at] as usize], *color);
            assert_eq!(prev[at * 4..at * 4 + 3], *color);
            assert_eq!(prev[at * 4 + 3], 9);
        }
    }

    #[test]
    fn remap_keeps_source_transparency() {
        let mut frame = rgba(&QUAD);
        frame[7] = 0;

        let params = Params::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let palette = Palette::build(&frame, &params, &mut rng);

        let mut prev = vec![9; frame.len()];
        let indices = remap(&frame, &mut prev, &palette);

        assert_eq!(indices[1], TRANSPARENT);
        assert_eq!(prev[4..8], [9, 9, 9, 9]);
    }
}
