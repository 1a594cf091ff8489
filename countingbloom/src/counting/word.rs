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
use std::hash::Hash;
use std::ops::BitAnd;
use std::ops::BitAndAssign;
use std::ops::BitOr;
use std::ops::BitOrAssign;
use std::ops::Not;

mod private {
    pub trait Sealed {}
}

/// An unsigned integer type whose bits are the positions of a [`CountingBloomFilter`].
///
/// The width of the word fixes the capacity of the filter: one occupancy counter is kept per bit,
/// stored inline in [`HashWord::Counters`]. This trait is sealed and implemented for `u8`, `u16`,
/// `u32`, `u64`, `u128` and `usize`.
///
/// [`CountingBloomFilter`]: super::CountingBloomFilter
pub trait HashWord:
    private::Sealed
    + Copy
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Binary
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
{
    /// Number of bits in the word.
    const BITS: usize;

    /// The word with no bits set.
    const ZERO: Self;

    /// Fixed-length counter storage, one `i32` per bit of the word.
    type Counters: AsRef<[i32]> + AsMut<[i32]> + Copy + Eq + Hash + fmt::Debug;

    /// Counter storage with every counter at zero.
    const ZERO_COUNTERS: Self::Counters;

    /// Returns the word with only bit `index` set.
    fn single_bit(index: usize) -> Self;

    /// Returns the number of set bits.
    fn count_ones(self) -> u32;

    /// Returns the index of the lowest set bit, or `BITS` for zero.
    fn trailing_zeros(self) -> u32;

    /// Returns the word with its lowest set bit cleared.
    fn clear_lowest_bit(self) -> Self;
}

macro_rules! impl_hash_word {
    ($($ty:ty),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl HashWord for $ty {
                const BITS: usize = <$ty>::BITS as usize;
                const ZERO: Self = 0;

                type Counters = [i32; <$ty>::BITS as usize];

                const ZERO_COUNTERS: Self::Counters = [0; <$ty>::BITS as usize];

                #[inline]
                fn single_bit(index: usize) -> Self {
                    (1 as $ty) << index
                }

                #[inline]
                fn count_ones(self) -> u32 {
                    <$ty>::count_ones(self)
                }

                #[inline]
                fn trailing_zeros(self) -> u32 {
                    <$ty>::trailing_zeros(self)
                }

                #[inline]
                fn clear_lowest_bit(self) -> Self {
                    self & self.wrapping_sub(1)
                }
            }
        )*
    };
}

impl_hash_word!(u8, u16, u32, u64, u128, usize);

/// Yields the index of every set bit of `word`, lowest first.
///
/// Runs in time proportional to the number of set bits rather than the word width.
pub(crate) fn set_bits<T: HashWord>(mut word: T) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if word == T::ZERO {
            return None;
        }
        let bit = word.trailing_zeros() as usize;
        word = word.clear_lowest_bit();
        Some(bit)
    })
}
