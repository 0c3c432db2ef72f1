use fnv::FnvHasher;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::{
    collections::{HashMap, HashSet},
    hash::{BuildHasherDefault, Hash}
};

pub type FnvHashSet<T> = HashSet<T, BuildHasherDefault<FnvHasher>>;
pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FnvHasher>>;

/// Construct a hash set with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
/// On large keys it is actually slower.
/// Note it is less robust against security attacks on key collisions.
pub fn fnv_hashset<T: Hash + Eq>(capacity: usize) -> FnvHashSet<T> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashSet::<T, _>::with_capacity_and_hasher(capacity, fnv)
}

/// Construct a hash map with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
/// On large keys it is actually slower.
/// Note it is less robust against security attacks on key collisions.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashMap::<K, V, _>::with_capacity_and_hasher(capacity, fnv)
}

/// Fast non-cryptographic rng. Seeded deterministically when a seed is given, otherwise from entropy.
pub fn xorshift_rng(seed: Option<u64>) -> XorShiftRng {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    XorShiftRng::seed_from_u64(seed)
}

/// Seed for layouts that must not change between runs when the caller gives no seed.
pub const FIXED_LAYOUT_SEED: u64 = 0x5eed_1a70;

/// Fast non-cryptographic rng that never draws on entropy: without a seed it starts from
/// `FIXED_LAYOUT_SEED`.
pub fn layout_rng(seed: Option<u64>) -> XorShiftRng {
    XorShiftRng::seed_from_u64(seed.unwrap_or(FIXED_LAYOUT_SEED))
}
