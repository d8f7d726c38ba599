//! Allocation of a day's exercise slots across its muscle groups.

/// Split `total` exercises over `count` muscle groups
///
/// - 1 group: everything to it
/// - 2 groups: the first (primary) group is favoured, 3/2 for five slots
/// - 3 groups: 2/2/1 for five slots
/// - 4+ groups: even split, remainder to the earliest groups
///
/// The result always sums to `total`; `count == 0` yields an empty list.
pub fn distribute(count: usize, total: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![total],
        2 => {
            let secondary = total / 2;
            vec![total - secondary, secondary]
        }
        3 => {
            let small = total / 3;
            let large = (total - small) / 2;
            vec![total - small - large, large, small]
        }
        _ => {
            let base = total / count;
            let remainder = total % count;
            (0..count)
                .map(|i| base + usize::from(i < remainder))
                .collect()
        }
    }
}

/// Expand a distribution into one group index per exercise slot.
///
/// `[2, 2, 1]` becomes `[0, 0, 1, 1, 2]`.
pub fn slot_groups(distribution: &[usize]) -> Vec<usize> {
    distribution
        .iter()
        .enumerate()
        .flat_map(|(group, &n)| std::iter::repeat(group).take(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_small_splits() {
        assert_eq!(distribute(1, 5), vec![5]);
        assert_eq!(distribute(2, 5), vec![3, 2]);
        assert_eq!(distribute(3, 5), vec![2, 2, 1]);
    }

    #[test]
    fn test_even_split_with_remainder_first() {
        assert_eq!(distribute(4, 5), vec![2, 1, 1, 1]);
        assert_eq!(distribute(5, 5), vec![1, 1, 1, 1, 1]);
        assert_eq!(distribute(6, 5), vec![1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_always_sums_to_total() {
        for total in 0..=12 {
            for count in 1..=6 {
                let d = distribute(count, total);
                assert_eq!(d.len(), count);
                assert_eq!(d.iter().sum::<usize>(), total, "count={count} total={total}");
            }
        }
    }

    #[test]
    fn test_zero_groups() {
        assert!(distribute(0, 5).is_empty());
    }

    #[test]
    fn test_slot_groups() {
        assert_eq!(slot_groups(&[2, 2, 1]), vec![0, 0, 1, 1, 2]);
        assert_eq!(slot_groups(&[5]), vec![0; 5]);
        assert!(slot_groups(&[]).is_empty());
    }
}
