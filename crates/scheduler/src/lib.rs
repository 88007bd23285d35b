//! Source selection and the per-surface frame loop.

mod frame_loop;

use rand::prelude::*;

pub use frame_loop::{FrameHost, FrameLoop, Signal};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no source images to choose from")]
    NoCandidates,
}

/// Chooses which of several candidate images a surface binds to.
///
/// Seeded pickers are deterministic, which keeps renders reproducible.
pub struct SourcePicker {
    rng: StdRng,
}

impl SourcePicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniformly picks one candidate. A single candidate is returned without
    /// consuming randomness.
    pub fn pick<'a, T>(&mut self, candidates: &'a [T]) -> Result<&'a T, SourceError> {
        match candidates {
            [] => Err(SourceError::NoCandidates),
            [only] => Ok(only),
            many => many.choose(&mut self.rng).ok_or(SourceError::NoCandidates),
        }
    }
}
