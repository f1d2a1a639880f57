use crate::palette::{Palette, TRANSPARENT};
use crate::params::Params;

/// Floyd-Steinberg quantization of `next` against the palette, carried in
/// fixed point with 8 fractional bits so diffused error survives below
/// integer precision. Quantized colors are written back into both `next`
/// and `prev`; the chosen palette indices are returned.
pub(crate) fn dither(
    prev: &mut [u8],
    next: &mut [u8],
    palette: &Palette,
    params: &Params,
) -> Vec<u8> {
    let width = params.width() as usize;
    let height = params.height() as usize;
    let slots = palette.linear();

    let mut work: Vec<[i32; 3]> = next
        .chunks_exact(4)
        .map(|px| {
            [
                (px[0] as i32) << 8,
                (px[1] as i32) << 8,
                (px[2] as i32) << 8,
            ]
        })
        .collect();

    let mut indices = vec![0; params.pixels()];

    for y in 0..height {
        for x in 0..width {
            let at = y * width + x;
            let base = at * 4;
            let current = work[at];

            let truncated = [
                (current[0] >> 8) as u8,
                (current[1] >> 8) as u8,
                (current[2] >> 8) as u8,
            ];

            // A pixel that already shows what the previous frame encoded
            // becomes transparent and diffuses no error. Unchanged regions
            // then compress to almost nothing.
            if prev[base..base + 3] == truncated {
                indices[at] = TRANSPARENT;
                next[base..base + 3].copy_from_slice(&truncated);
                continue;
            }

            let mut best = 0;
            let mut best_diff = i32::MAX;
            let mut err = [0i32; 3];

            for (slot, color) in slots.iter().enumerate() {
                let dr = current[0] - ((color[0] as i32) << 8);
                let dg = current[1] - ((color[1] as i32) << 8);
                let db = current[2] - ((color[2] as i32) << 8);
                let diff = dr.abs() + dg.abs() + db.abs();

                if diff < best_diff {
                    best_diff = diff;
                    best = slot;
                    err = [dr, dg, db];
                }
            }

            let chosen = slots[best];

            indices[at] = best as u8;
            next[base..base + 3].copy_from_slice(&chosen);
            prev[base..base + 3].copy_from_slice(&chosen);

            // 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right;
            // neighbors outside the frame are skipped.
            if x + 1 < width {
                diffuse(&mut work[at + 1], err, 7);
            }

            if y + 1 < height {
                if x > 0 {
                    diffuse(&mut work[at + width - 1], err, 3);
                }

                diffuse(&mut work[at + width], err, 5);

                if x + 1 < width {
                    diffuse(&mut work[at + width + 1], err, 1);
                }
            }
        }
    }

    indices
}

fn diffuse(px: &mut [i32; 3], err: [i32; 3], weight: i32) {
    for channel in 0..3 {
        px[channel] += err[channel] * weight / 16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn palette_exact_frames_lose_nothing() {
        let frame = rgba(&QUAD);
        let params = Params::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let palette = Palette::build(&frame, &params, &mut rng);

        let mut prev = vec![255; frame.len()];
        let mut next = frame.clone();
        let indices = dither(&mut prev, &mut next, &palette, &params);

        let slots = palette.linear();

        for (at, color) in QUAD.iter().enumerate() {
            assert_eq!(slots[indices[at] as usize], *color);
        }

        assert_eq!(next, frame);
    }

    #[test]
    fn unchanged_frames_collapse_to_transparent() {
        let frame = rgba(&QUAD);
        let params = Params::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let palette = Palette::build(&frame, &params, &mut rng);

        let mut prev = frame.clone();
        let mut next = frame.clone();
        let indices = dither(&mut prev, &mut next, &palette, &params);

        assert!(indices.iter().all(|&index| index == TRANSPARENT));
    }

    #[test]
    fn quantization_error_reaches_both_extremes() {
        let source = rgba(&[[0, 0, 0], [255, 255, 255]]);
        let params = Params::new(2, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let palette = Palette::build(&source, &params, &mut rng);

        // A mid-gray frame against a black-and-white palette has to be
        // approximated with a mix of both.
        let params = Params::new(8, 8).unwrap();
        let gray = rgba(&[[128, 128, 128]; 64]);
        let mut prev = rgba(&[[7, 91, 203]; 64]);
        let mut next = gray;
        let indices = dither(&mut prev, &mut next, &palette, &params);

        let slots = palette.linear();
        let used: Vec<[u8; 3]> = indices
            .iter()
            .map(|&index| slots[index as usize])
            .collect();

        assert!(used.contains(&[0, 0, 0]));
        assert!(used.contains(&[255, 255, 255]));
    }
}
