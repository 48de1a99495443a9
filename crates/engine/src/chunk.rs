//! Generic fixed-size chunking.
//!
//! Used twice in the pipeline: once to group work items into batches, once
//! to group batches into waves. Both levels share the same invariants, so
//! one generic function serves both.

/// Split `items` into consecutive groups of at most `size` elements.
///
/// Every group has exactly `size` elements except possibly the last, which
/// has between 1 and `size`. Relative order is preserved and no element is
/// dropped or duplicated. A `size` of 0 is treated as 1 (the degenerate
/// single-element grouping); callers that want a hard error validate their
/// config before reaching this point.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut groups = Vec::with_capacity(items.len().div_ceil(size));
    let mut group = Vec::with_capacity(size);

    for item in items {
        if group.len() == size {
            groups.push(std::mem::replace(&mut group, Vec::with_capacity(size)));
        }
        group.push(item);
    }

    if !group.is_empty() {
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count_and_sizes() {
        let groups = chunk((0..25).collect::<Vec<_>>(), 10);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 10);
        assert_eq!(groups[1].len(), 10);
        assert_eq!(groups[2].len(), 5);
    }

    #[test]
    fn test_exact_multiple_has_no_short_tail() {
        let groups = chunk((0..30).collect::<Vec<_>>(), 10);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 10));
    }

    #[test]
    fn test_concatenation_round_trips_in_order() {
        for size in 1..=9 {
            let items: Vec<u32> = (0..23).collect();
            let groups = chunk(items.clone(), size);
            assert_eq!(groups.len(), items.len().div_ceil(size));
            let flattened: Vec<u32> = groups.into_iter().flatten().collect();
            assert_eq!(flattened, items);
        }
    }

    #[test]
    fn test_size_larger_than_input_yields_one_group() {
        let groups = chunk(vec![1, 2, 3], 100);
        assert_eq!(groups, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        let groups: Vec<Vec<u32>> = chunk(Vec::new(), 10);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_zero_size_degenerates_to_single_element_groups() {
        let groups = chunk(vec![1, 2, 3], 0);
        assert_eq!(groups, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_two_level_chunking_visits_every_item_once() {
        let items: Vec<u32> = (0..100).collect();
        let batches = chunk(items.clone(), 10);
        let waves = chunk(batches, 10);
        assert_eq!(waves.len(), 1);

        let visited: Vec<u32> = waves.into_iter().flatten().flatten().collect();
        assert_eq!(visited, items);
    }

    #[test]
    fn test_two_level_wave_count() {
        // 57 items, batches of 4 -> 15 batches, waves of 4 -> 4 waves
        let items: Vec<u32> = (0..57).collect();
        let batches = chunk(items, 4);
        assert_eq!(batches.len(), 15);
        let waves = chunk(batches, 4);
        assert_eq!(waves.len(), 4);
    }
}
