//! Reservoir sampling: keep a uniform sample of fixed capacity over a stream
//! of unknown length. Supports removal, including the probability-corrected
//! `erase_maybe` needed when a revealed sample must not stay over-represented.

use rand::rngs::StdRng;
use rand::Rng;

pub struct ReservoirSampling<T> {
    items: Vec<T>,
    capacity: usize,
    pushed: u64,
    rng: StdRng,
}

impl<T> ReservoirSampling<T> {
    pub fn new(capacity: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "reservoir capacity must be positive");
        ReservoirSampling {
            items: Vec::with_capacity(capacity),
            capacity,
            pushed: 0,
            rng,
        }
    }

    /// After `n` pushes every pushed item is retained with probability
    /// `capacity / n`.
    pub fn push(&mut self, item: T) {
        self.pushed += 1;
        if self.items.len() < self.capacity && self.pushed <= self.capacity as u64 {
            self.items.push(item);
            return;
        }
        let r = self.rng.gen_range(0..self.pushed);
        if r >= self.capacity as u64 {
            return;
        }
        if (r as usize) < self.items.len() {
            self.items[r as usize] = item;
        } else {
            // the reservoir shrank through erase; grow it back
            self.items.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Index of a uniformly drawn sample.
    pub fn sample_index(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..self.items.len()))
    }

    pub fn get(&self, index: usize) -> &T {
        &self.items[index]
    }

    /// Remove the sample at `index`.
    pub fn erase(&mut self, index: usize) -> T {
        self.items.swap_remove(index)
    }

    /// Remove the sample at `index` with probability `1 - capacity/n`,
    /// cancelling the elevated draw probability of an item that is known to
    /// sit in the reservoir.
    pub fn erase_maybe(&mut self, index: usize) -> Option<T> {
        if self.rng.gen_range(0..self.pushed) < self.items.len() as u64 {
            return None;
        }
        Some(self.erase(index))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fills_up_to_capacity_first() {
        let mut res = ReservoirSampling::new(4, StdRng::seed_from_u64(1));
        for i in 0..4u64 {
            res.push(i);
        }
        assert_eq!(res.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn sample_counts_are_roughly_uniform() {
        let elements = 100_000u64;
        let capacity = 4_096;
        let buckets = 16;

        let mut res = ReservoirSampling::new(capacity, StdRng::seed_from_u64(3));
        for i in 0..elements {
            res.push(i);
        }
        assert_eq!(res.len(), capacity);

        let mut bins = vec![0u64; buckets];
        let bucket_size = elements / buckets as u64;
        for &value in res.as_slice() {
            bins[(value / bucket_size) as usize] += 1;
        }
        let expected = capacity as u64 / buckets as u64;
        for (bucket, &count) in bins.iter().enumerate() {
            assert!(
                count > expected / 2 && count < expected * 2,
                "bucket {bucket} holds {count} samples, expected around {expected}"
            );
        }
    }

    #[test]
    fn erase_shrinks_and_push_regrows() {
        let mut res = ReservoirSampling::new(8, StdRng::seed_from_u64(5));
        for i in 0..100u64 {
            res.push(i);
        }
        let index = res.sample_index().expect("non-empty");
        res.erase(index);
        assert_eq!(res.len(), 7);
        let mut next = 100u64;
        while res.len() < 8 && next < 10_000_000 {
            res.push(next);
            next += 1;
        }
        assert_eq!(res.len(), 8);
    }
}
