use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Shared scale multiplier, read once per draw.
///
/// The writer lives outside the frame loop (a UI control, a render-time
/// ramp); the driver only reads. Clones share one cell. The value is f64
/// bits in an atomic, relaxed on both sides: nothing else is published
/// through it.
#[derive(Clone, Debug)]
pub struct ScaleStore {
    bits: Arc<AtomicU64>,
}

impl ScaleStore {
    pub fn new(scale: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(scale.to_bits())),
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, scale: f64) {
        self.bits.store(scale.to_bits(), Ordering::Relaxed);
    }
}

impl Default for ScaleStore {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_cell() {
        let store = ScaleStore::new(1.0);
        let handle = store.clone();
        handle.set(0.25);
        assert_eq!(store.get(), 0.25);
    }

    #[test]
    fn survives_a_writer_thread() {
        let store = ScaleStore::default();
        let writer = store.clone();
        std::thread::spawn(move || writer.set(2.5)).join().unwrap();
        assert_eq!(store.get(), 2.5);
    }
}
