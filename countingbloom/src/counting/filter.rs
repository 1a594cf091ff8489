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

use std::fmt;

use super::word::set_bits;
use super::HashWord;
use crate::error::Error;

/// A counting Bloom filter over pre-hashed keys of type `T`.
///
/// Each key is presented as a `T` whose set bits are the positions the key occupies. The filter
/// keeps one signed occupancy counter per bit of `T` and an aggregate bitmap of the positions
/// whose counter is non-zero, so that:
/// - No false negatives (a hash that was put and not yet removed always returns `true`)
/// - Possible false positives (a hash covered by the union of other keys returns `true`)
/// - Removal is supported, unlike a plain Bloom filter
///
/// The capacity is fixed at `T::BITS` positions and the counters live inline, so the filter
/// never allocates.
///
/// # Removal contract
///
/// [`remove`](Self::remove) is **unchecked**: removing a hash that was never put, or removing it
/// more often than it was put, drives counters negative and leaves the filter in a state where
/// query results are unspecified. Callers that cannot guarantee the contract should use
/// [`try_remove`](Self::try_remove), which verifies the counters first at the cost of an extra
/// pass.
///
/// The filter is not synchronized; concurrent access must be serialized by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountingBloomFilter<T: HashWord = u32> {
    /// Occupancy count per bit position
    counters: T::Counters,
    /// Bit `i` is set iff `counters[i] > 0`
    bitmap: T,
}

impl<T: HashWord> CountingBloomFilter<T> {
    /// Creates an empty filter.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// let filter = CountingBloomFilter::<u64>::new();
    /// assert!(filter.is_empty());
    /// assert_eq!(filter.capacity(), 64);
    /// ```
    pub const fn new() -> Self {
        CountingBloomFilter {
            counters: T::ZERO_COUNTERS,
            bitmap: T::ZERO,
        }
    }

    /// Inserts a hash into the filter.
    ///
    /// Every counter under a set bit of `hash` is incremented, so putting the same hash twice
    /// requires removing it twice. A counter holds at most `i32::MAX` insertions; exceeding that
    /// is not checked. After insertion, `maybe_have(hash)` returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// let mut filter = CountingBloomFilter::<u32>::new();
    /// filter.put(0b0110);
    ///
    /// assert!(filter.maybe_have(0b0110));
    /// assert!(filter.maybe_have(0b0100)); // subset of an inserted hash
    /// assert!(!filter.maybe_have(0b0001));
    /// ```
    pub fn put(&mut self, hash: T) {
        let counters = self.counters.as_mut();
        for bit in set_bits(hash) {
            counters[bit] += 1;
        }
        self.bitmap |= hash;
    }

    /// Removes a previously inserted hash from the filter.
    ///
    /// Every counter under a set bit of `hash` is decremented, then the bitmap is recomputed
    /// across all `T::BITS` positions so that exactly the bits whose counters reached zero are
    /// cleared. Bits still held by other hashes stay set.
    ///
    /// This operation performs no checks. `hash` must have been put at least as many times as it
    /// has been removed; otherwise counters go negative and later query results are unspecified.
    /// Use [`try_remove`](Self::try_remove) for a checked removal.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// let mut filter = CountingBloomFilter::<u32>::new();
    /// filter.put(0b0110);
    /// filter.put(0b1111);
    ///
    /// filter.remove(0b0110);
    /// assert!(filter.maybe_have(0b0110)); // bits still held by 0b1111
    ///
    /// filter.remove(0b1111);
    /// assert!(!filter.maybe_have(0b1111));
    /// assert!(filter.is_empty());
    /// ```
    pub fn remove(&mut self, hash: T) {
        let counters = self.counters.as_mut();
        for bit in set_bits(hash) {
            counters[bit] -= 1;
        }
        let mask = self.occupied_mask();
        self.bitmap &= mask;
    }

    /// Removes a hash after checking that it is present in every counter it touches.
    ///
    /// Unlike [`remove`](Self::remove), this never drives a counter below zero. It cannot detect
    /// removing a hash whose bits are all held by other hashes; that is indistinguishable from a
    /// legitimate removal.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`CounterUnderflow`](crate::error::ErrorKind::CounterUnderflow)
    /// naming the lowest offending bit if any counter under `hash` is not positive. The filter is
    /// left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// # use countingbloom::error::ErrorKind;
    /// let mut filter = CountingBloomFilter::<u16>::new();
    /// filter.put(0b0011);
    ///
    /// assert!(filter.try_remove(0b0011).is_ok());
    /// let err = filter.try_remove(0b0011).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::CounterUnderflow);
    /// ```
    pub fn try_remove(&mut self, hash: T) -> Result<(), Error> {
        let counters = self.counters.as_ref();
        if let Some(bit) = set_bits(hash).find(|&bit| counters[bit] <= 0) {
            let count = counters[bit];
            tracing::debug!(bit, count, ?hash, "rejecting removal of absent hash");
            return Err(Error::counter_underflow(bit, count));
        }

        self.remove(hash);
        Ok(())
    }

    /// Tests whether a hash is possibly in the filter.
    ///
    /// Returns:
    /// - `true`: every bit of `hash` is held by some inserted hash (possibly a false positive)
    /// - `false`: `hash` was **definitely not** inserted
    ///
    /// A zero hash has no bits to check and is always reported present.
    pub fn maybe_have(&self, hash: T) -> bool {
        (hash & self.bitmap) == hash
    }

    /// Tests and inserts a hash in a single operation.
    ///
    /// Returns whether the hash was possibly already in the filter before insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// let mut filter = CountingBloomFilter::<u64>::new();
    ///
    /// assert!(!filter.maybe_have_and_put(0xF0));
    /// assert!(filter.maybe_have_and_put(0xF0));
    /// ```
    pub fn maybe_have_and_put(&mut self, hash: T) -> bool {
        let was_present = self.maybe_have(hash);
        self.put(hash);
        was_present
    }

    /// Resets the filter to its initial empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Adds the contents of another filter into this one.
    ///
    /// Counters are summed and bitmaps OR-ed, so afterwards this filter holds every hash held by
    /// either filter, and each hash must be removed as many times as it was put into both.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`CounterOverflow`](crate::error::ErrorKind::CounterOverflow)
    /// naming the lowest offending bit if any summed counter would exceed `i32::MAX`. The filter
    /// is left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countingbloom::counting::CountingBloomFilter;
    /// let mut f1 = CountingBloomFilter::<u32>::new();
    /// let mut f2 = CountingBloomFilter::<u32>::new();
    /// f1.put(0b0011);
    /// f2.put(0b1100);
    ///
    /// f1.merge(&f2).unwrap();
    /// assert!(f1.maybe_have(0b0011));
    /// assert!(f1.maybe_have(0b1100));
    /// ```
    pub fn merge(&mut self, other: &CountingBloomFilter<T>) -> Result<(), Error> {
        let mut merged = self.counters;
        let pairs = merged.as_mut().iter_mut().zip(other.counters());
        for (bit, (count, &added)) in pairs.enumerate() {
            match count.checked_add(added) {
                Some(sum) => *count = sum,
                None => {
                    tracing::debug!(bit, count = *count, added, "rejecting overflowing merge");
                    return Err(Error::counter_overflow(bit, *count, added));
                }
            }
        }

        self.counters = merged;
        self.bitmap |= other.bitmap;
        Ok(())
    }

    /// Returns whether no bit position is occupied.
    pub fn is_empty(&self) -> bool {
        self.bitmap == T::ZERO
    }

    /// Returns the number of bit positions (the width of `T`).
    pub fn capacity(&self) -> usize {
        T::BITS
    }

    /// Returns the number of occupied bit positions.
    pub fn bits_used(&self) -> usize {
        self.bitmap.count_ones() as usize
    }

    /// Returns the fraction of bit positions that are occupied.
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / T::BITS as f64
    }

    /// Estimates the false positive probability for a hash with `bits_per_key` set bits.
    ///
    /// Uses the approximation `load_factor^bits_per_key`, which assumes the bits of a hash are
    /// independent and uniformly distributed. The result is always within `[0.0, 1.0]`.
    pub fn estimated_fpp(&self, bits_per_key: u32) -> f64 {
        self.load_factor().powf(f64::from(bits_per_key))
    }

    /// Returns the aggregate bitmap of occupied positions.
    pub fn bitmap(&self) -> T {
        self.bitmap
    }

    /// Returns the occupancy counter of `bit`, or `None` if `bit` is out of range.
    pub fn counter(&self, bit: usize) -> Option<i32> {
        self.counters().get(bit).copied()
    }

    /// Returns all occupancy counters, indexed by bit position.
    pub fn counters(&self) -> &[i32] {
        self.counters.as_ref()
    }

    /// Checks the internal consistency of the filter.
    ///
    /// Returns `false` if any counter is negative or if the bitmap disagrees with the counters.
    /// Either condition can only arise from misuse of [`remove`](Self::remove).
    pub fn validate(&self) -> bool {
        for (bit, &count) in self.counters().iter().enumerate() {
            let occupied = (self.bitmap & T::single_bit(bit)) != T::ZERO;
            if count < 0 || occupied != (count > 0) {
                tracing::warn!(bit, count, occupied, "counting bloom filter is inconsistent");
                return false;
            }
        }
        true
    }

    /// Builds the mask of positions whose counter is non-zero.
    fn occupied_mask(&self) -> T {
        self.counters()
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count != 0)
            .fold(T::ZERO, |mask, (bit, _)| mask | T::single_bit(bit))
    }
}

impl<T: HashWord> Default for CountingBloomFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HashWord> fmt::Debug for CountingBloomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingBloomFilter")
            .field(
                "bitmap",
                &format_args!("{:#0width$b}", self.bitmap, width = T::BITS + 2),
            )
            .field("counters", &self.counters())
            .finish()
    }
}

impl<T: HashWord> Extend<T> for CountingBloomFilter<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for hash in iter {
            self.put(hash);
        }
    }
}

impl<T: HashWord> FromIterator<T> for CountingBloomFilter<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut filter = Self::new();
        filter.extend(iter);
        filter
    }
}
