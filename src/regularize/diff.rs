use std::collections::BTreeSet;

/// Returns the sorted elements of `big` that are missing from `small`.
///
/// With `closed` set, each missing element also pulls in its immediate
/// neighbours in `big`, whether or not those neighbours are in `small`.
pub fn boundary_diff<T: Ord + Copy>(big: &[T], small: &[T], closed: bool) -> Vec<T> {
    let present: BTreeSet<T> = small.iter().copied().collect();
    let mut diff = BTreeSet::new();

    for (i, item) in big.iter().enumerate() {
        if present.contains(item) {
            continue;
        }

        diff.insert(*item);

        if closed {
            if i > 0 {
                diff.insert(big[i - 1]);
            }
            if let Some(next) = big.get(i + 1) {
                diff.insert(*next);
            }
        }
    }

    diff.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_diff() {
        let big = [1, 2, 3, 4, 5, 6];
        let small = [1, 2, 4, 6];
        assert_eq!(boundary_diff(&big, &small, false), vec![3, 5]);
    }

    #[test]
    fn test_closed_diff_includes_neighbours() {
        let big = [1, 2, 3, 4, 5, 6, 7];
        let small = [1, 2, 4, 7];
        assert_eq!(boundary_diff(&big, &small, true), vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_closed_diff_at_edges() {
        let big = [1, 2, 3];
        let small = [2];
        assert_eq!(boundary_diff(&big, &small, true), vec![1, 2, 3]);
    }

    #[test]
    fn test_no_gaps() {
        let big = [1, 2, 3];
        assert!(boundary_diff(&big, &big, true).is_empty());
        assert!(boundary_diff(&big, &big, false).is_empty());
    }

    #[test]
    fn test_output_independent_of_small_order() {
        let big = [1, 2, 3, 4, 5];
        let a = boundary_diff(&big, &[5, 1, 3], true);
        let b = boundary_diff(&big, &[1, 3, 5], true);
        assert_eq!(a, b);
        assert_eq!(a, vec![1, 2, 3, 4, 5]);
    }
}
