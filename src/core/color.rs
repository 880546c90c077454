use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Serialize, Serializer};

/// Lower bound of each channel, keeps colors light enough to read text on.
pub const CHANNEL_MIN: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::new(
            rng.random_range(CHANNEL_MIN..=u8::MAX),
            rng.random_range(CHANNEL_MIN..=u8::MAX),
            rng.random_range(CHANNEL_MIN..=u8::MAX),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Memoized display color per process name. Entries are never evicted
/// or replaced for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct ColorCache {
    colors: HashMap<String, Rgb>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, name: &str) -> Rgb {
        self.color_for_with(name, &mut rand::rng())
    }

    pub fn color_for_with<R: Rng>(&mut self, name: &str, rng: &mut R) -> Rgb {
        if let Some(color) = self.colors.get(name) {
            return *color;
        }
        let color = Rgb::random(rng);
        self.colors.insert(name.to_string(), color);
        color
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.colors.len()
    }
}
