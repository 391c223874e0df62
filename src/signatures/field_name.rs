//! Random names for newly added signature fields.

use rand::distributions::Uniform;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Length of a generated field name.
pub const FIELD_NAME_LEN: usize = 32;

/// Generates field names from the symbols `1-9` and `A-F`.
///
/// The names only need to avoid clashing with fields already in the document,
/// so any reasonably seeded generator will do.
#[derive(Debug)]
pub struct FieldNameGenerator<R = ThreadRng> {
    rng: R,
    draws: Uniform<u8>,
}

impl FieldNameGenerator<ThreadRng> {
    /// Create a generator backed by the thread-local RNG.
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for FieldNameGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FieldNameGenerator<R> {
    /// Create a generator backed by `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            draws: Uniform::new_inclusive(1, 15),
        }
    }

    /// Produce a new field name.
    pub fn generate(&mut self) -> String {
        (0..FIELD_NAME_LEN)
            .map(|_| symbol(self.rng.sample(&self.draws)))
            .collect()
    }
}

// 1..=9 map to digits, 10..=15 to A..=F.
fn symbol(value: u8) -> char {
    if value < 10 {
        char::from(b'0' + value)
    } else {
        char::from(b'A' + (value - 10))
    }
}
