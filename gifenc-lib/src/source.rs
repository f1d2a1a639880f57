use anyhow::{ensure, Context, Result};
use image::io::Reader as ImageReader;
use std::path::Path;

pub struct Source {
    frames: Vec<Vec<u8>>,
    width: u16,
    height: u16,
}

impl Source {
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let pattern = path.as_ref().join("*.*");
        let paths = glob::glob(&pattern.to_string_lossy()).context("Couldn't find frames")?;

        let mut frames = Vec::new();
        let mut size = None;

        for entry in paths {
            let path = entry.context("Couldn't find frame")?;

            let image = ImageReader::open(&path)
                .with_context(|| format!("Couldn't open frame: {}", path.display()))?
                .decode()
                .with_context(|| format!("Couldn't decode frame: {}", path.display()))?
                .to_rgba8();

            let dimensions = (image.width() as u16, image.height() as u16);

            match size {
                None => size = Some(dimensions),
                Some(size) => ensure!(
                    size == dimensions,
                    "Frame has mismatched dimensions: {}",
                    path.display()
                ),
            }

            frames.push(image.into_raw());
        }

        let (width, height) = size.context("Couldn't find frames")?;

        Ok(Self {
            frames,
            width,
            height,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Vec<u8>> {
        self.frames
    }
}
