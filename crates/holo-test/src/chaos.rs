//! Delivery chaos for scenario runs
//!
//! Models what the poll loop and the HTTP layer can do to inputs between the
//! orchestrator and the director:
//! - Reordering within a batch
//! - Duplicate payloads
//! - Viseme fetch latency

use holo_core::StateSnapshot;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Delivery chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Shuffle each delivered batch
    pub reorder: bool,
    /// Probability that a payload is delivered twice (0.0 - 1.0)
    pub duplicate_prob: f64,
    /// Viseme fetch latency range in frames (inclusive)
    pub fetch_latency_frames: (u32, u32),
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self::good()
    }
}

impl ChaosConfig {
    /// In-order, exactly once, one-frame fetches
    pub fn good() -> Self {
        ChaosConfig {
            reorder: false,
            duplicate_prob: 0.0,
            fetch_latency_frames: (1, 1),
        }
    }

    pub fn poor() -> Self {
        ChaosConfig {
            reorder: true,
            duplicate_prob: 0.1,
            fetch_latency_frames: (1, 10),
        }
    }

    pub fn hostile() -> Self {
        ChaosConfig {
            reorder: true,
            duplicate_prob: 0.5,
            fetch_latency_frames: (1, 60),
        }
    }

    /// Apply reordering and duplication to a batch
    pub fn disturb(&self, batch: Vec<StateSnapshot>, rng: &mut StdRng) -> Vec<StateSnapshot> {
        let mut out = Vec::with_capacity(batch.len() * 2);
        for snapshot in batch {
            if self.duplicate_prob > 0.0 && rng.gen_bool(self.duplicate_prob.min(1.0)) {
                out.push(snapshot.clone());
            }
            out.push(snapshot);
        }
        if self.reorder {
            out.shuffle(rng);
        }
        out
    }

    /// Sample a fetch latency in frames
    pub fn fetch_latency(&self, rng: &mut StdRng) -> u32 {
        let (min, max) = self.fetch_latency_frames;
        if max <= min {
            min
        } else {
            rng.gen_range(min..=max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_core::UpdateId;
    use rand::SeedableRng;

    #[test]
    fn test_good_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch: Vec<_> = (1..=5).map(|i| StateSnapshot::idle(UpdateId::new(i))).collect();
        let out = ChaosConfig::good().disturb(batch.clone(), &mut rng);
        assert_eq!(out, batch);
    }

    #[test]
    fn test_hostile_keeps_every_payload() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch: Vec<_> = (1..=20).map(|i| StateSnapshot::idle(UpdateId::new(i))).collect();
        let out = ChaosConfig::hostile().disturb(batch, &mut rng);

        assert!(out.len() >= 20);
        for id in 1..=20 {
            assert!(out.iter().any(|s| s.update_id == UpdateId::new(id)));
        }
    }

    #[test]
    fn test_fetch_latency_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let chaos = ChaosConfig::poor();
        for _ in 0..100 {
            let l = chaos.fetch_latency(&mut rng);
            assert!((1..=10).contains(&l));
        }
    }
}
