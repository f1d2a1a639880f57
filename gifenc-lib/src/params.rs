use anyhow::{ensure, Result};

#[derive(Clone, Debug)]
pub struct Params {
    pub(crate) width: u16,
    pub(crate) height: u16,
}

impl Params {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        ensure!(width > 0);
        ensure!(height > 0);

        Ok(Self { width, height })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub(crate) fn pixels(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}
