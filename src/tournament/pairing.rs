//! Algorithm pairing for competition mode.

use std::collections::BTreeSet;

/// The unordered algorithm pairs playing on map `map_index`.
///
/// With `n` algorithms, map `k` uses the offset `d = 1 + (k mod (n - 1))`
/// and pairs every `i` with `(i + d) mod n` and `(i - d) mod n`, self-pairs
/// excluded, duplicates removed. Needs at least two algorithms.
#[must_use]
pub fn pairs_for_map(num_algorithms: usize, map_index: usize) -> Vec<(usize, usize)> {
    if num_algorithms < 2 {
        return Vec::new();
    }
    let n = num_algorithms as i64;
    let d = 1 + (map_index as i64) % (n - 1);

    let mut unique: BTreeSet<(usize, usize)> = BTreeSet::new();
    for i in 0..n {
        for j in [(i + d).rem_euclid(n), (i - d).rem_euclid(n)] {
            if i != j {
                unique.insert((i.min(j) as usize, i.max(j) as usize));
            }
        }
    }
    unique.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_algorithms_single_pair() {
        assert_eq!(pairs_for_map(2, 0), vec![(0, 1)]);
        assert_eq!(pairs_for_map(2, 7), vec![(0, 1)]);
    }

    #[test]
    fn test_four_algorithms_first_map() {
        // d = 1: the ring 0-1, 1-2, 2-3, 3-0.
        assert_eq!(pairs_for_map(4, 0), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_four_algorithms_second_map() {
        // d = 2: opposite corners, deduplicated.
        assert_eq!(pairs_for_map(4, 1), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn test_offset_cycles_with_map_index() {
        // d cycles mod (n - 1), so map 3 repeats map 0's pairs.
        assert_eq!(pairs_for_map(4, 3), pairs_for_map(4, 0));
    }

    #[test]
    fn test_no_self_pairs_and_ordered() {
        for n in 2..8 {
            for k in 0..6 {
                for (a, b) in pairs_for_map(n, k) {
                    assert!(a < b);
                    assert!(b < n);
                }
            }
        }
    }

    #[test]
    fn test_fewer_than_two_is_empty() {
        assert!(pairs_for_map(0, 0).is_empty());
        assert!(pairs_for_map(1, 0).is_empty());
    }
}
