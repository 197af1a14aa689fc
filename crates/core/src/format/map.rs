use serde::{Deserialize, Serialize};

use super::OutputFormat;

/// Fixed-size collection with exactly one slot per [`OutputFormat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatMap<T> {
    pub gif: T,
    pub webm: T,
}

impl<T> FormatMap<T> {
    pub fn new(gif: T, webm: T) -> Self {
        Self { gif, webm }
    }

    /// Build a map by evaluating `f` once per format.
    pub fn from_fn(mut f: impl FnMut(OutputFormat) -> T) -> Self {
        Self {
            gif: f(OutputFormat::Gif),
            webm: f(OutputFormat::WebM),
        }
    }

    pub fn get(&self, format: OutputFormat) -> &T {
        match format {
            OutputFormat::Gif => &self.gif,
            OutputFormat::WebM => &self.webm,
        }
    }

    pub fn get_mut(&mut self, format: OutputFormat) -> &mut T {
        match format {
            OutputFormat::Gif => &mut self.gif,
            OutputFormat::WebM => &mut self.webm,
        }
    }

    /// Replace the slot for `format`, returning the previous value.
    pub fn insert(&mut self, format: OutputFormat, value: T) -> T {
        std::mem::replace(self.get_mut(format), value)
    }

    /// Iterate slots in session order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputFormat, &T)> {
        OutputFormat::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(OutputFormat, &T) -> U) -> FormatMap<U> {
        FormatMap {
            gif: f(OutputFormat::Gif, &self.gif),
            webm: f(OutputFormat::WebM, &self.webm),
        }
    }
}
