use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

/// Incremental xxHash64 over heterogeneous values, used to fingerprint
/// render inputs (session, selection, scroll offsets).
pub struct Fingerprint(XxHash64);

impl Default for Fingerprint {
    fn default() -> Self {
        Self(XxHash64::with_seed(0))
    }
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Hash + ?Sized>(mut self, value: &T) -> Self {
        value.hash(&mut self.0);
        self
    }

    /// f32 has no `Hash`; its bit pattern is stable for equal inputs.
    pub fn add_f32(mut self, value: f32) -> Self {
        self.0.write_u32(value.to_bits());
        self
    }

    pub fn finish(self) -> u64 {
        self.0.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_every_input() {
        let a = Fingerprint::new().add(&1u64).add_f32(0.0).finish();
        let b = Fingerprint::new().add(&1u64).add_f32(4.0).finish();
        let c = Fingerprint::new().add(&1u64).add_f32(0.0).finish();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
