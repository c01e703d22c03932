//! Cryptographically secure randomness. Backed by the OS CSPRNG; no seeding
//! API is exposed because nothing here should ever be reproducible.

use rand::rngs::OsRng;
use rand::RngCore;

/// Uniform integer in `[lo, hi)`. Panics if `lo >= hi` — that's a caller bug,
/// not a recoverable condition.
pub fn uniform_int(lo: i64, hi: i64) -> i64 {
    assert!(lo < hi, "uniform_int requires lo < hi, got [{lo}, {hi})");
    let span = (hi - lo) as u64;
    let bound = u64::MAX - (u64::MAX % span);
    loop {
        let word = next_u64();
        if word < bound {
            return lo + (word % span) as i64;
        }
    }
}

/// Fisher-Yates shuffle in place, driven by [`uniform_int`].
pub fn shuffle<T>(seq: &mut [T]) {
    if seq.len() < 2 {
        return;
    }
    for i in (1..seq.len()).rev() {
        let j = uniform_int(0, (i + 1) as i64) as usize;
        seq.swap(i, j);
    }
}

fn next_u64() -> u64 {
    // `OsRng` fails fatally (panics) if the OS source is unavailable, per
    // spec — there is no recovery path for a process that cannot get
    // entropy for a real-money game.
    OsRng.next_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uniform_int_stays_in_bounds() {
        for _ in 0..1000 {
            let v = uniform_int(1, 7);
            assert!((1..7).contains(&v));
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut deck: Vec<u32> = (0..52).collect();
        shuffle(&mut deck);
        let set: HashSet<u32> = deck.iter().copied().collect();
        assert_eq!(set.len(), 52);
        assert!(set.iter().all(|v| *v < 52));
    }

    #[test]
    fn single_element_shuffle_is_noop() {
        let mut v = vec![1];
        shuffle(&mut v);
        assert_eq!(v, vec![1]);
    }
}
