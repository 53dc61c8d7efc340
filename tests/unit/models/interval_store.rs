use super::*;

fn store(intervals: &[(usize, usize)]) -> IntervalStore {
    intervals
        .iter()
        .map(|&(s, e)| MatchInterval::new(s, e))
        .collect()
}

#[test]
fn test_pack_orders_by_start_then_end() {
    let a = MatchInterval::pack(1, 5);
    let b = MatchInterval::pack(1, 6);
    let c = MatchInterval::pack(2, 3);
    assert!(a < b);
    assert!(b < c);
    assert_eq!(MatchInterval::unpack(b), MatchInterval::new(1, 6));
}

#[test]
fn test_push_rejects_empty_and_overlapping() {
    let mut s = IntervalStore::new();
    assert!(s.push(0, 2));
    assert!(!s.push(3, 3));
    assert!(!s.push(1, 4));
    assert!(s.push(2, 4));
    assert_eq!(s.len(), 2);
}

#[test]
fn test_push_rejects_offsets_beyond_key_range() {
    let mut s = IntervalStore::new();
    assert!(!s.push(0, MAX_OFFSET + 1));
    assert!(s.is_empty());
}

#[test]
fn test_index_of_exact_match_only() {
    let s = store(&[(0, 2), (2, 4), (4, 6)]);
    assert_eq!(s.index_of(2, 4), Some(1));
    assert_eq!(s.index_of(2, 3), None);
    assert_eq!(s.index_of(3, 3), None);
}

#[test]
fn test_first_starting_at_or_after() {
    let s = store(&[(0, 2), (5, 7), (9, 10)]);
    assert_eq!(s.first_starting_at_or_after(0), Some(0));
    assert_eq!(s.first_starting_at_or_after(1), Some(1));
    assert_eq!(s.first_starting_at_or_after(5), Some(1));
    assert_eq!(s.first_starting_at_or_after(10), None);
}

#[test]
fn test_last_ending_at_or_before() {
    let s = store(&[(0, 2), (5, 7), (9, 10)]);
    assert_eq!(s.last_ending_at_or_before(1), None);
    assert_eq!(s.last_ending_at_or_before(2), Some(0));
    assert_eq!(s.last_ending_at_or_before(8), Some(1));
    assert_eq!(s.last_ending_at_or_before(100), Some(2));
}

#[test]
fn test_iter_is_sorted_and_non_overlapping() {
    let s = store(&[(0, 2), (1, 3), (2, 4), (8, 9)]);
    let all: Vec<_> = s.iter().collect();
    assert_eq!(
        all,
        vec![
            MatchInterval::new(0, 2),
            MatchInterval::new(2, 4),
            MatchInterval::new(8, 9)
        ]
    );
    for pair in all.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}
