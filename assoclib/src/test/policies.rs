use crate::config::Geometry;
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, NoPolicy, PolicyDecision, ReplacementPolicy, RoundRobin, TagDirectory};

// 2 ways of 2 lines, index is bit 0
fn two_way() -> Geometry {
    Geometry::new(16, 32, 2, 4).unwrap()
}

#[test]
fn directory_reports_lowest_way() {
    let geometry = two_way();
    let mut directory = TagDirectory::new(&geometry);
    assert_eq!(directory.find(0x11), (1, None));
    directory.fill(0x11, 1);
    directory.fill(0x11, 0);
    assert_eq!(directory.find(0x11), (1, Some(0)));
    assert_eq!(directory.find(0x10), (0, None));
    directory.clear();
    assert_eq!(directory.find(0x11), (1, None));
}

#[test]
fn no_policy_always_picks_way_zero() {
    let geometry = Geometry::new(16, 32, 1, 4).unwrap();
    let mut policy = NoPolicy::new(&geometry);
    assert_eq!(policy.evaluate(6), PolicyDecision { hit: false, replace_way: 0 });
    policy.update_on_fill(6, 0);
    assert_eq!(policy.evaluate(6), PolicyDecision { hit: true, replace_way: 0 });
    assert!(!policy.evaluate(10).hit);
}

#[test]
fn round_robin_cycles_per_index() {
    let geometry = two_way();
    let mut policy = RoundRobin::new(&geometry);
    assert_eq!(policy.evaluate(0x1).replace_way, 0);
    policy.update_on_fill(0x1, 0);
    assert_eq!(policy.evaluate(0x3).replace_way, 1);
    // The other index has its own counter
    assert_eq!(policy.evaluate(0x2).replace_way, 0);
    policy.update_on_fill(0x3, 1);
    assert_eq!(policy.evaluate(0x5).replace_way, 0);
    assert!(policy.evaluate(0x1).hit);
    assert!(policy.evaluate(0x3).hit);
    policy.reset();
    assert_eq!(policy.evaluate(0x5), PolicyDecision { hit: false, replace_way: 0 });
    assert!(!policy.evaluate(0x1).hit);
}

#[test]
fn lru_evicts_least_recently_used() {
    let geometry = two_way();
    let mut policy = LeastRecentlyUsed::new(&geometry);
    policy.update_on_fill(0x1, 0);
    assert_eq!(policy.evaluate(0x3).replace_way, 1);
    policy.update_on_fill(0x3, 1);
    assert_eq!(policy.evaluate(0x5).replace_way, 0);
    policy.update_on_hit(0x1, 0);
    assert_eq!(policy.evaluate(0x5).replace_way, 1);
}

#[test]
fn lfu_evicts_least_frequently_used() {
    let geometry = two_way();
    let mut policy = LeastFrequentlyUsed::new(&geometry);
    policy.update_on_fill(0x1, 0);
    policy.update_on_fill(0x3, 1);
    policy.update_on_hit(0x1, 0);
    policy.update_on_hit(0x1, 0);
    policy.update_on_hit(0x3, 1);
    assert_eq!(policy.evaluate(0x5).replace_way, 1);
    // A refill starts from 1 again
    policy.update_on_fill(0x5, 1);
    assert_eq!(policy.evaluate(0x7).replace_way, 1);
    assert!(!policy.evaluate(0x3).hit);
    assert!(policy.evaluate(0x5).hit);
}
