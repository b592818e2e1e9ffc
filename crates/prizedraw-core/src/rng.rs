// Random source for draws. A seed is always recorded so a draw sequence can
// be replayed.

use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct DrawRng {
    seed: u64,
    rng: StdRng,
}

impl DrawRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the OS entropy source.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle only the first `amount` slots; those slots end up holding a
    /// uniformly random ordered sample of the whole slice.
    pub fn partial_shuffle<'a, T>(&mut self, items: &'a mut [T], amount: usize) -> &'a mut [T] {
        items.partial_shuffle(&mut self.rng, amount).0
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DrawRng::from_seed(7);
        let mut b = DrawRng::from_seed(7);
        assert_eq!(a.seed(), 7);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn partial_shuffle_returns_requested_prefix() {
        let mut rng = DrawRng::from_seed(1);
        let mut items: Vec<u32> = (0..10).collect();
        let picked = rng.partial_shuffle(&mut items, 4).to_vec();
        assert_eq!(picked.len(), 4);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }
}
