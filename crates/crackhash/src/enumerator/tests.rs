use crate::{Error, Part, RangeEnumerator};

fn collect(alphabet: &str, start: u64, quota: u64) -> Vec<String> {
    RangeEnumerator::new(alphabet, start, quota).unwrap().collect()
}

#[test]
fn ranks_follow_canonical_order() {
    assert_eq!(
        collect("ab", 0, 7),
        ["a", "b", "aa", "ab", "ba", "bb", "aaa"]
    );
}

#[test]
fn starts_at_arbitrary_rank() {
    let expected = ["a", "b", "aa", "ab", "ba", "bb", "aaa"];
    for (rank, word) in expected.iter().enumerate() {
        assert_eq!(&RangeEnumerator::word_at("ab", rank as u64).unwrap(), word);
    }
}

#[test]
fn resumed_run_matches_run_from_zero() {
    for alphabet in ["ab", "xyz", "0123456789"] {
        let full = collect(alphabet, 0, 1_500);
        for start in [0_u64, 1, 2, 3, 9, 10, 11, 109, 110, 111, 777] {
            let quota = 300;
            let window = collect(alphabet, start, quota);
            let from_zero = &full[start as usize..(start + quota) as usize];
            assert_eq!(window, from_zero, "alphabet {alphabet:?} start {start}");
        }
    }
}

#[test]
fn created_at_rank_equals_advancing_from_zero() {
    for rank in 0..200_u64 {
        let resumed = RangeEnumerator::new("abc", rank, 1).unwrap().next();
        let advanced = RangeEnumerator::new("abc", 0, rank + 1).unwrap().last();
        assert_eq!(resumed, advanced, "rank {rank}");
    }
}

#[test]
fn carry_grows_to_next_length() {
    // rank 11 is "cc", the last string of length 2 over "abc".
    assert_eq!(collect("abc", 11, 2), ["cc", "aaa"]);
    // rank 38 is "ccc".
    assert_eq!(collect("abc", 38, 2), ["ccc", "aaaa"]);
}

#[test]
fn quota_is_exact() {
    let mut enumerator = RangeEnumerator::new("ab", 4, 5).unwrap();
    let mut buf = String::new();
    for i in 0..5 {
        assert!(enumerator.has_next(), "should have a string after {i} calls");
        assert_eq!(enumerator.remaining(), 5 - i);
        enumerator.next_into(&mut buf);
    }
    assert!(!enumerator.has_next());
    assert_eq!(enumerator.produced(), 5);
    assert_eq!(enumerator.next(), None);
}

#[test]
fn zero_quota_is_empty() {
    let mut enumerator = RangeEnumerator::new("ab", 123, 0).unwrap();
    assert!(!enumerator.has_next());
    assert_eq!(enumerator.next(), None);
}

#[test]
fn next_into_reuses_buffer() {
    let mut enumerator = RangeEnumerator::new("ab", 5, 2).unwrap();
    let mut buf = String::from("leftover");
    enumerator.next_into(&mut buf);
    assert_eq!(buf, "bb");
    enumerator.next_into(&mut buf);
    assert_eq!(buf, "aaa");
}

#[test]
fn multibyte_alphabet() {
    assert_eq!(collect("αβ", 2, 3), ["αα", "αβ", "βα"]);
}

#[test]
fn rank_of_inverts_word_at() {
    for rank in 0..500_u64 {
        let word = RangeEnumerator::word_at("xyz", rank).unwrap();
        assert_eq!(RangeEnumerator::rank_of("xyz", &word).unwrap(), Some(rank));
    }
    assert_eq!(RangeEnumerator::rank_of("ab", "").unwrap(), None);
    assert_eq!(RangeEnumerator::rank_of("ab", "abc").unwrap(), None);
}

#[test]
fn high_ranks_do_not_overflow() {
    let mut enumerator = RangeEnumerator::new("0123456789abcdef", u64::MAX - 2, 2).unwrap();
    let first = enumerator.next().unwrap();
    let second = enumerator.next().unwrap();
    assert_eq!(
        RangeEnumerator::rank_of("0123456789abcdef", &first).unwrap(),
        Some(u64::MAX - 2)
    );
    assert_eq!(
        RangeEnumerator::rank_of("0123456789abcdef", &second).unwrap(),
        Some(u64::MAX - 1)
    );
}

#[test]
fn search_space_sums_lengths() {
    assert_eq!(RangeEnumerator::search_space(2, 2), Some(6));
    assert_eq!(RangeEnumerator::search_space(2, 3), Some(14));
    assert_eq!(RangeEnumerator::search_space(36, 4), Some(36 + 1_296 + 46_656 + 1_679_616));
    assert_eq!(RangeEnumerator::search_space(36, 0), Some(0));
    assert_eq!(RangeEnumerator::search_space(36, 64), None);
}

#[test]
fn for_part_uses_part_range() {
    let part = Part {
        request_id: "r".to_string(),
        task_id: "t".to_string(),
        alphabet: "ab".to_string(),
        hash: String::new(),
        max_length: 2,
        start: 3,
        end: 6,
    };
    let words: Vec<String> = RangeEnumerator::for_part(&part).unwrap().collect();
    assert_eq!(words, ["ab", "ba", "bb"]);
}

#[test]
fn oversized_max_length_is_capped_to_window() {
    let part = Part {
        request_id: "r".to_string(),
        task_id: "t".to_string(),
        alphabet: "ab".to_string(),
        hash: String::new(),
        max_length: u64::MAX,
        start: 0,
        end: 6,
    };
    let enumerator = RangeEnumerator::for_part(&part).unwrap();
    assert_eq!(enumerator.longest_word_len(), 2);
    assert_eq!(enumerator.count(), 6);

    let words: Vec<String> = RangeEnumerator::with_capacity("ab", 0, 6, usize::MAX)
        .unwrap()
        .collect();
    assert_eq!(words, ["a", "b", "aa", "ab", "ba", "bb"]);
}

#[test]
fn longest_word_len_covers_whole_window() {
    assert_eq!(RangeEnumerator::new("ab", 0, 7).unwrap().longest_word_len(), 3);
    assert_eq!(RangeEnumerator::new("ab", 5, 0).unwrap().longest_word_len(), 2);
    assert_eq!(RangeEnumerator::new("ab", 0, u64::MAX).unwrap().longest_word_len(), 64);
}

#[test]
fn rejects_bad_alphabets() {
    for alphabet in ["", "a", "aba"] {
        assert!(
            matches!(
                RangeEnumerator::new(alphabet, 0, 1),
                Err(Error::InvalidAlphabet { .. })
            ),
            "{alphabet:?} should be rejected"
        );
    }
}
