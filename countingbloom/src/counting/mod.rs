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

//! Counting Bloom filter over pre-hashed keys.
//!
//! A counting Bloom filter is a Bloom filter that also supports removal. Instead of a single bit
//! per position it keeps an occupancy counter, and a position is considered set while its counter
//! is positive. Queries never produce false negatives but may produce false positives.
//!
//! # Properties
//!
//! - **No hashing**: keys are supplied already hashed, as an unsigned integer whose set bits are
//!   the positions the key occupies
//! - **Fixed size**: the capacity is the bit width of the hash word type, chosen at compile time
//! - **No allocation**: counters are stored inline in a fixed-length array
//! - **O(1) queries**: membership is a single mask-and-compare against an aggregate bitmap
//!
//! # Usage
//!
//! ```rust
//! use countingbloom::counting::CountingBloomFilter;
//!
//! // One counter per bit of a u64 hash.
//! let mut filter = CountingBloomFilter::<u64>::new();
//!
//! let apple = 0x0000_0010_0400_0001_u64;
//! let grape = 0x0200_0000_0000_8000_u64;
//!
//! filter.put(apple);
//! assert!(filter.maybe_have(apple));
//! assert!(!filter.maybe_have(grape));
//!
//! filter.remove(apple);
//! assert!(!filter.maybe_have(apple));
//! ```
//!
//! # Choosing a width
//!
//! The hash word type defaults to `u32`. Any of `u8`, `u16`, `u32`, `u64`, `u128` and `usize`
//! can be used; see [`HashWord`]. Callers are responsible for producing hashes that spread keys
//! across the width, typically by setting a small number of bits chosen by independent hash
//! functions.
//!
//! # Removal
//!
//! [`CountingBloomFilter::remove`] is unchecked and trusts the caller to only remove hashes that
//! are present. [`CountingBloomFilter::try_remove`] is the checked alternative.

mod filter;
mod word;

pub use self::filter::CountingBloomFilter;
pub use self::word::HashWord;
