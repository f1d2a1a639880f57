use anyhow::{bail, Context, Result};
use gifenc_lib::{GifEncoder, Params, Source};
use indicatif::ProgressIterator;
use std::env;
use std::fs::File;
use std::io::BufWriter;

fn main() -> Result<()> {
    let args: Vec<_> = env::args().skip(1).collect();

    let (dir, out, delay) = match args.as_slice() {
        [dir, out] => (dir.as_str(), out.as_str(), 4),
        [dir, out, delay] => (
            dir.as_str(),
            out.as_str(),
            delay.parse().context("Couldn't parse the delay")?,
        ),
        _ => bail!("Usage: gifenc <frame-dir> <output.gif> [delay-cs]"),
    };

    let source = Source::from_dir(dir).context("Couldn't load frames")?;

    eprintln!(
        "{} frames at {}x{}",
        source.len(),
        source.width(),
        source.height()
    );

    let params = Params::new(source.width(), source.height())?;
    let mut frames = source.into_frames();
    let mut frames = frames.iter_mut();

    let first = frames.next().context("Couldn't find frames")?;
    let sink =
        BufWriter::new(File::create(out).with_context(|| format!("Couldn't create: {}", out))?);

    let mut encoder = GifEncoder::new(sink, params, first, delay)?;

    for frame in frames.progress() {
        encoder.add(frame, delay)?;
    }

    let stats = encoder.finish()?;

    eprintln!("{:#?}", stats);

    Ok(())
}
