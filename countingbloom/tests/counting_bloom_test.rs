// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use countingbloom::counting::CountingBloomFilter;
use countingbloom::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::eq;
use googletest::prelude::le;
use googletest::prelude::near;

#[test]
fn test_empty() {
    let filter = CountingBloomFilter::<u8>::new();
    for hash in 1..=u8::MAX {
        assert!(!filter.maybe_have(hash), "empty filter reported {hash:#010b}");
    }
    assert!(filter.is_empty());
    assert_that!(filter.bits_used(), eq(0));
}

#[test]
fn test_no_false_negatives() {
    for hash in 0..=u8::MAX {
        let mut filter = CountingBloomFilter::<u8>::new();
        filter.put(hash);
        assert!(filter.maybe_have(hash));
    }

    let mut filter = CountingBloomFilter::<u64>::new();
    let hashes: Vec<u64> = (0..64u64).map(|i| (1u64 << i) | (1u64 << ((i * 7) % 64))).collect();
    filter.extend(hashes.iter().copied());
    for &hash in &hashes {
        assert!(filter.maybe_have(hash));
    }
}

#[test]
fn test_subsets_are_reported_present() {
    for hash in 1..=u8::MAX {
        let mut filter = CountingBloomFilter::<u8>::new();
        filter.put(hash);
        for subset in (1..=u8::MAX).filter(|&s| s & hash == s) {
            assert!(filter.maybe_have(subset));
        }
    }
}

#[test]
fn test_disjoint_bits_are_excluded() {
    for hash in 0..=u8::MAX {
        let mut filter = CountingBloomFilter::<u8>::new();
        filter.put(hash);
        for other in (0..=u8::MAX).filter(|&o| o & !hash != 0) {
            assert!(!filter.maybe_have(other));
        }
    }
}

#[test]
fn test_remove_restores_prior_state() {
    for a in 0..=u8::MAX {
        for b in (0..=u8::MAX).filter(|&b| b != a) {
            let mut filter = CountingBloomFilter::<u8>::new();
            filter.put(b);
            let before = filter;

            filter.put(a);
            assert!(filter.maybe_have(b));
            filter.remove(a);

            assert!(filter.maybe_have(b));
            assert_eq!(filter, before);
            assert_eq!(filter.maybe_have(a), a & b == a);
        }
    }
}

#[test]
fn test_end_to_end_scenario() {
    let mut filter = CountingBloomFilter::<u32>::new();
    filter.put(0b0110);
    assert!(filter.maybe_have(0b0110));
    assert!(!filter.maybe_have(0b0001));
    assert!(filter.maybe_have(0b0100));
    assert!(!filter.maybe_have(0b1100));

    filter.put(0b1111);
    filter.remove(0b0110);
    assert!(filter.maybe_have(0b0110));

    filter.remove(0b1111);
    assert!(!filter.maybe_have(0b1111));
    assert!(filter.is_empty());
}

#[test]
fn test_interleaved_put_and_remove() {
    let mut filter = CountingBloomFilter::<u64>::new();
    let hashes: Vec<u64> = (0..1000u64)
        .map(|i| {
            let h = i.wrapping_mul(0x9E37_79B9_7F4A_7C15);
            (1u64 << (h & 63)) | (1u64 << ((h >> 6) & 63)) | (1u64 << ((h >> 12) & 63))
        })
        .collect();

    for &hash in &hashes {
        filter.put(hash);
    }
    for &hash in hashes.iter().step_by(2) {
        filter.try_remove(hash).unwrap();
    }
    for &hash in hashes.iter().skip(1).step_by(2) {
        assert!(filter.maybe_have(hash));
    }
    assert!(filter.validate());

    for &hash in hashes.iter().skip(1).step_by(2) {
        filter.remove(hash);
    }
    assert!(filter.is_empty());
    assert!(filter.counters().iter().all(|&c| c == 0));
}

#[test]
fn test_try_remove_absent() {
    let mut filter = CountingBloomFilter::<u16>::new();
    filter.put(0x00FF);
    let before = filter;

    let err = filter.try_remove(0x0100).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CounterUnderflow));
    assert_that!(err.context("bit"), eq(Some("8")));
    assert_eq!(filter, before);
}

#[test]
fn test_merge_keeps_both() {
    let left_hashes = [0b0000_0011u8, 0b0001_1000];
    let right_hashes = [0b0000_0110u8, 0b1000_0000];

    let mut left: CountingBloomFilter<u8> = left_hashes.into_iter().collect();
    let right: CountingBloomFilter<u8> = right_hashes.into_iter().collect();
    left.merge(&right).unwrap();

    for hash in left_hashes.into_iter().chain(right_hashes) {
        assert!(left.maybe_have(hash));
    }
    assert!(!left.maybe_have(0b0100_0000));
    assert_that!(left.counter(1), eq(Some(2)));

    for hash in left_hashes.into_iter().chain(right_hashes) {
        left.remove(hash);
    }
    assert!(left.is_empty());
}

#[test]
fn test_estimated_fpp() {
    let mut filter = CountingBloomFilter::<u64>::new();
    filter.put(0x0000_0000_FFFF_FFFF);
    assert_that!(filter.load_factor(), near(0.5, 1e-12));
    assert_that!(filter.estimated_fpp(3), near(0.125, 1e-12));

    // The estimate tracks the observed rate for single-bit hashes.
    let observed = (0..64u32).filter(|&i| filter.maybe_have(1u64 << i)).count() as f64 / 64.0;
    assert_that!(filter.estimated_fpp(1), near(observed, 1e-12));
    assert_that!(filter.estimated_fpp(8), le(filter.estimated_fpp(1)));
}

#[test]
fn test_estimated_fpp_is_a_probability() {
    let empty = CountingBloomFilter::<u64>::new();
    for bits_per_key in [0, 1, 64, i32::MAX as u32, 3_000_000_000, u32::MAX] {
        let fpp = empty.estimated_fpp(bits_per_key);
        assert!((0.0..=1.0).contains(&fpp), "fpp({bits_per_key}) = {fpp}");
    }

    let mut filter = CountingBloomFilter::<u64>::new();
    filter.put(0xFFFF_FFFF);
    for bits_per_key in [i32::MAX as u32 + 1, 3_000_000_000, u32::MAX] {
        let fpp = filter.estimated_fpp(bits_per_key);
        assert!((0.0..=1.0).contains(&fpp), "fpp({bits_per_key}) = {fpp}");
    }
    assert_that!(filter.estimated_fpp(3_000_000_000), eq(0.0));

    filter.put(u64::MAX);
    assert_that!(filter.estimated_fpp(u32::MAX), eq(1.0));
}

#[test]
fn test_merge_overflow_leaves_filter_unchanged() {
    let mut filter = CountingBloomFilter::<u32>::new();
    filter.put(0b10);
    for _ in 0..30 {
        let copy = filter;
        filter.merge(&copy).unwrap();
    }
    let before = filter;

    let err = filter.merge(&before).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CounterOverflow));
    assert_that!(err.context("bit"), eq(Some("1")));
    assert_that!(filter.counter(1), eq(Some(1 << 30)));
    assert_eq!(filter, before);
}
