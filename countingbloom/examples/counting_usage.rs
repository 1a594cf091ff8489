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

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use countingbloom::counting::CountingBloomFilter;

/// Maps a key to a 64-bit word with three bits set, one per derived hash function.
fn key_hash<K: Hash>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let h = hasher.finish();

    let mut word = 0u64;
    for i in 0..3 {
        word |= 1u64 << ((h >> (i * 6)) & 63);
    }
    word
}

fn main() {
    let mut filter = CountingBloomFilter::<u64>::new();

    for fruit in ["apple", "banana", "cherry"] {
        filter.put(key_hash(&fruit));
    }
    println!("Bits used: {} of {}", filter.bits_used(), filter.capacity());
    println!("Est. FPP: {:.4}%", filter.estimated_fpp(3) * 100.0);

    for fruit in ["apple", "banana", "cherry", "grape"] {
        println!("maybe_have({fruit}): {}", filter.maybe_have(key_hash(&fruit)));
    }

    println!("\nRemoving banana...");
    filter.remove(key_hash(&"banana"));
    println!("maybe_have(banana): {}", filter.maybe_have(key_hash(&"banana")));
    println!("maybe_have(apple): {}", filter.maybe_have(key_hash(&"apple")));

    println!("\nRemoving banana again with the checked removal...");
    match filter.try_remove(key_hash(&"banana")) {
        Ok(()) => println!("removed (banana's bits were all held by other keys)"),
        Err(err) => println!("rejected: {err}"),
    }
    println!("Consistent: {}", filter.validate());
}
