use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::debug;

use crate::config::{ExtractionConfig, NamingStrategy};
use crate::error::{Result, BleepError};

/// Hands out file ids that are unique within one extraction batch.
///
/// Uniqueness does not extend to files left on disk by earlier runs.
pub trait IdAllocator: Send {
    fn allocate(&mut self) -> Result<u32>;

    /// Ids handed out so far
    fn allocated(&self) -> usize;
}

/// Draw a random id from `range` that is not in `used`, then record it.
///
/// Gives up with `AllocationExhausted` once the range is saturated or after
/// `max_attempts` colliding draws.
pub fn allocate<R: Rng>(
    used: &mut HashSet<u32>,
    range: &RangeInclusive<u32>,
    max_attempts: u32,
    rng: &mut R,
) -> Result<u32> {
    let capacity = (*range.end() as u64) - (*range.start() as u64) + 1;
    if used.len() as u64 >= capacity {
        return Err(BleepError::AllocationExhausted { attempts: 0, capacity });
    }

    for _ in 0..max_attempts {
        let candidate = rng.random_range(range.clone());
        if used.insert(candidate) {
            return Ok(candidate);
        }
    }

    Err(BleepError::AllocationExhausted {
        attempts: max_attempts,
        capacity,
    })
}

pub struct RandomIdAllocator {
    range: RangeInclusive<u32>,
    max_attempts: u32,
    used: HashSet<u32>,
    rng: StdRng,
}

impl RandomIdAllocator {
    pub fn new(range: RangeInclusive<u32>, max_attempts: u32) -> Self {
        Self::with_rng(range, max_attempts, StdRng::from_os_rng())
    }

    pub fn seeded(range: RangeInclusive<u32>, max_attempts: u32, seed: u64) -> Self {
        Self::with_rng(range, max_attempts, StdRng::seed_from_u64(seed))
    }

    fn with_rng(range: RangeInclusive<u32>, max_attempts: u32, rng: StdRng) -> Self {
        Self {
            range,
            max_attempts,
            used: HashSet::new(),
            rng,
        }
    }
}

impl IdAllocator for RandomIdAllocator {
    fn allocate(&mut self) -> Result<u32> {
        let id = allocate(&mut self.used, &self.range, self.max_attempts, &mut self.rng)?;
        debug!("Allocated random file id {}", id);
        Ok(id)
    }

    fn allocated(&self) -> usize {
        self.used.len()
    }
}

pub struct SequentialIdAllocator {
    next: Option<u32>,
    end: u32,
    count: usize,
}

impl SequentialIdAllocator {
    pub fn new(range: RangeInclusive<u32>) -> Self {
        Self {
            next: Some(*range.start()),
            end: *range.end(),
            count: 0,
        }
    }
}

impl IdAllocator for SequentialIdAllocator {
    fn allocate(&mut self) -> Result<u32> {
        match self.next {
            Some(id) if id <= self.end => {
                self.next = id.checked_add(1);
                self.count += 1;
                Ok(id)
            }
            _ => Err(BleepError::AllocationExhausted {
                attempts: 1,
                capacity: self.count as u64,
            }),
        }
    }

    fn allocated(&self) -> usize {
        self.count
    }
}

/// Build a fresh allocator for one batch
pub fn allocator_for(config: &ExtractionConfig) -> Box<dyn IdAllocator> {
    let range = config.id_range_min..=config.id_range_max;
    match config.naming {
        NamingStrategy::Random => Box::new(RandomIdAllocator::new(range, config.max_allocation_attempts)),
        NamingStrategy::Sequential => Box::new(SequentialIdAllocator::new(range)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_random_ids_are_distinct_and_in_range() {
        let mut allocator = RandomIdAllocator::seeded(1..=1000, 10_000, 7);
        let ids: Vec<u32> = (0..500).map(|_| allocator.allocate().unwrap()).collect();

        let distinct: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), 500);
        assert_eq!(allocator.allocated(), 500);
        assert!(ids.iter().all(|id| (1..=1000).contains(id)));
    }

    #[test]
    fn test_saturated_range_fails_fast() {
        let mut allocator = RandomIdAllocator::seeded(1..=3, 10_000, 1);
        for _ in 0..3 {
            allocator.allocate().unwrap();
        }
        match allocator.allocate() {
            Err(BleepError::AllocationExhausted { attempts, capacity }) => {
                assert_eq!(attempts, 0);
                assert_eq!(capacity, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_retry_bound_is_honoured() {
        let mut used: HashSet<u32> = (1..=9).collect();
        let mut rng = StdRng::seed_from_u64(3);
        // One free id out of ten, a single draw will usually miss
        let mut failures = 0;
        for _ in 0..20 {
            let mut attempt = used.clone();
            if allocate(&mut attempt, &(1..=10), 1, &mut rng).is_err() {
                failures += 1;
            } else {
                assert!(attempt.contains(&10));
            }
        }
        assert!(failures > 0);
        used.insert(10);
        assert!(allocate(&mut used, &(1..=10), 100, &mut rng).is_err());
    }

    #[test]
    fn test_sequential_allocator_counts_up_and_stops() {
        let mut allocator = SequentialIdAllocator::new(5..=7);
        assert_eq!(allocator.allocate().unwrap(), 5);
        assert_eq!(allocator.allocate().unwrap(), 6);
        assert_eq!(allocator.allocate().unwrap(), 7);
        assert!(matches!(
            allocator.allocate(),
            Err(BleepError::AllocationExhausted { .. })
        ));
    }

    #[test]
    fn test_sequential_allocator_handles_range_top() {
        let mut allocator = SequentialIdAllocator::new(u32::MAX..=u32::MAX);
        assert_eq!(allocator.allocate().unwrap(), u32::MAX);
        assert!(allocator.allocate().is_err());
    }

    #[test]
    fn test_allocator_for_follows_naming_strategy() {
        let mut config = Config::default().extraction;
        config.naming = NamingStrategy::Sequential;
        config.id_range_min = 40;
        let mut allocator = allocator_for(&config);
        assert_eq!(allocator.allocate().unwrap(), 40);
    }
}
