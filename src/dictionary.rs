//! The encoder's pattern dictionary.
//!
//! A hash table of collision chains. The number of slots is always prime. The table only ever
//! grows: there is no removal, and a rehash moves every entry into a table of at least twice
//! the size.
use crate::literal;
use crate::Code;

/// Entries allowed per slot, on average, before the table grows.
pub const DEFAULT_LOAD_FACTOR: usize = 15;

/// The capacity used when nothing is known about the input.
pub const BASE_CAPACITY: usize = 101;

/// Every full step of this many input bytes doubles the starting capacity once more.
const CAPACITY_STEP: u64 = 50 << 20;
/// Upper bound on the doublings of `BASE_CAPACITY` done up front.
const MAX_CAPACITY_SHIFT: u64 = 12;

pub struct ChainedDictionary<V> {
    /// The slots, each holding the chain of entries whose hash reduces to its index.
    table: Box<[Chain<V>]>,
    /// The number of distinct patterns.
    len: usize,
    /// See `DEFAULT_LOAD_FACTOR`.
    load_factor: usize,
    /// How often the table has been reallocated.
    rehashes: usize,
}

/// Entries are appended and chains are scanned newest first.
type Chain<V> = Vec<Entry<V>>;

struct Entry<V> {
    pattern: Box<[u8]>,
    value: V,
}

impl<V> ChainedDictionary<V> {
    /// An empty dictionary of `BASE_CAPACITY` slots.
    pub fn new() -> Self {
        Self::with_capacity(BASE_CAPACITY)
    }

    /// An empty dictionary with at least `capacity` slots.
    ///
    /// The capacity is rounded up to the next prime, so any value is accepted.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// An empty dictionary that rehashes once `len() > load_factor * capacity()`.
    ///
    /// A load factor of zero is treated as one.
    pub fn with_load_factor(capacity: usize, load_factor: usize) -> Self {
        ChainedDictionary {
            table: empty_table(next_prime(capacity)),
            len: 0,
            load_factor: load_factor.max(1),
            rehashes: 0,
        }
    }

    /// Look up the value stored for `pattern`.
    pub fn get(&self, pattern: &[u8]) -> Option<&V> {
        self.table[self.index_of(pattern)]
            .iter()
            .rev()
            .find(|entry| *entry.pattern == *pattern)
            .map(|entry| &entry.value)
    }

    /// Store `value` for `pattern`.
    ///
    /// Returns the previous value if the pattern was present, in which case the number of
    /// entries does not change. Otherwise the entry is added and the table may rehash.
    pub fn put(&mut self, pattern: &[u8], value: V) -> Option<V> {
        let index = self.index_of(pattern);
        let chain = &mut self.table[index];

        if let Some(entry) = chain.iter_mut().rev().find(|entry| *entry.pattern == *pattern) {
            return Some(core::mem::replace(&mut entry.value, value));
        }

        chain.push(Entry {
            pattern: pattern.into(),
            value,
        });
        self.len += 1;

        if self.len > self.load_factor.saturating_mul(self.table.len()) {
            self.rehash();
        }

        None
    }

    /// The number of patterns in the dictionary.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current number of slots. Always prime.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    pub fn load_factor(&self) -> usize {
        self.load_factor
    }

    /// How often the table has been reallocated since construction.
    pub fn rehashes(&self) -> usize {
        self.rehashes
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &V)> + '_ {
        self.table
            .iter()
            .flatten()
            .map(|entry| (&*entry.pattern, &entry.value))
    }

    fn index_of(&self, pattern: &[u8]) -> usize {
        slot_index(pattern_hash(pattern), self.table.len())
    }

    fn rehash(&mut self) {
        let capacity = next_prime(2 * self.table.len());
        let old = core::mem::replace(&mut self.table, empty_table(capacity));

        for entry in old.into_vec().into_iter().flatten() {
            let index = slot_index(pattern_hash(&entry.pattern), capacity);
            self.table[index].push(entry);
        }

        self.rehashes += 1;
        tracing::debug!(
            entries = self.len,
            capacity,
            rehashes = self.rehashes,
            "rehashed pattern dictionary"
        );
    }
}

impl ChainedDictionary<Code> {
    /// A dictionary with at least `capacity` slots holding the literal table.
    pub fn seeded(capacity: usize) -> Self {
        let mut dictionary = Self::with_capacity(capacity);
        for (pattern, code) in literal::seeds() {
            dictionary.put(pattern, code);
        }
        dictionary
    }
}

impl<V> Default for ChainedDictionary<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A polynomial hash with multiplier 31, wrapping on overflow.
///
/// The result is signed and negative for many longer patterns.
pub fn pattern_hash(pattern: &[u8]) -> i32 {
    pattern
        .iter()
        .fold(0i32, |hash, &byte| hash.wrapping_mul(31).wrapping_add(i32::from(byte)))
}

/// Reduce a hash into `0..capacity`, folding negative hashes into range.
pub fn slot_index(hash: i32, capacity: usize) -> usize {
    i64::from(hash).rem_euclid(capacity as i64) as usize
}

/// Trial division by odd numbers up to the square root.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }

    if n % 2 == 0 {
        return n == 2;
    }

    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// The smallest prime that is at least `n`.
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// The starting capacity for an input of `len` bytes.
///
/// Larger inputs start larger so that they rehash less often. The choice has no influence on
/// the codes produced.
pub fn capacity_for_input(len: u64) -> usize {
    let shift = (len / CAPACITY_STEP).clamp(1, MAX_CAPACITY_SHIFT);
    next_prime(BASE_CAPACITY << shift)
}

fn empty_table<V>(capacity: usize) -> Box<[Chain<V>]> {
    (0..capacity).map(|_| Vec::new()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(n: u32) -> Vec<u8> {
        format!("p{}", n).into_bytes()
    }

    #[test]
    fn capacity_is_prime_after_construction() {
        assert_eq!(ChainedDictionary::<u32>::new().capacity(), 101);
        assert_eq!(ChainedDictionary::<u32>::with_capacity(100).capacity(), 101);
        assert_eq!(ChainedDictionary::<u32>::with_capacity(22).capacity(), 23);
        assert_eq!(ChainedDictionary::<u32>::with_capacity(0).capacity(), 2);
    }

    #[test]
    fn put_returns_previous() {
        let mut dict = ChainedDictionary::new();
        assert_eq!(dict.put(b"AB", 132), None);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.put(b"AB", 140), Some(132));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(b"AB"), Some(&140));
        assert_eq!(dict.get(b"A"), None);
        assert_eq!(dict.get(b"ABC"), None);
    }

    #[test]
    fn rehash_threshold() {
        let mut dict = ChainedDictionary::with_load_factor(5, 3);
        for n in 0..15 {
            dict.put(&pattern(n), n);
        }
        assert_eq!(dict.rehashes(), 0);
        assert_eq!(dict.capacity(), 5);

        dict.put(&pattern(15), 15);
        assert_eq!(dict.rehashes(), 1);
        assert_eq!(dict.capacity(), 11);
        assert_eq!(dict.len(), 16);
    }

    #[test]
    fn rehash_preserves_entries() {
        let mut dict = ChainedDictionary::with_load_factor(2, 1);
        let mut capacities = vec![dict.capacity()];
        for n in 0..2000 {
            assert_eq!(dict.put(&pattern(n), n), None);
            if capacities.last() != Some(&dict.capacity()) {
                capacities.push(dict.capacity());
            }
        }

        assert!(dict.rehashes() >= 9, "{}", dict.rehashes());
        assert_eq!(capacities.len(), dict.rehashes() + 1);
        assert!(capacities.iter().all(|&cap| is_prime(cap)), "{:?}", capacities);
        for pair in capacities.windows(2) {
            assert_eq!(pair[1], next_prime(2 * pair[0]));
        }

        assert_eq!(dict.len(), 2000);
        assert_eq!(dict.iter().count(), 2000);
        for n in 0..2000 {
            assert_eq!(dict.get(&pattern(n)), Some(&n));
        }
    }

    #[test]
    fn negative_hashes_fold_into_range() {
        let hash = pattern_hash(b"zzzzzzzz");
        assert!(hash < 0);
        let index = slot_index(hash, 101);
        assert!(index < 101);
        assert_eq!((i64::from(hash) - index as i64) % 101, 0);

        assert_eq!(slot_index(-1, 7), 6);
        assert_eq!(slot_index(i32::MIN, 2), 0);

        let mut dict = ChainedDictionary::new();
        dict.put(b"zzzzzzzz", 7u32);
        assert_eq!(dict.get(b"zzzzzzzz"), Some(&7));
    }

    #[test]
    fn primes() {
        let primes: Vec<_> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, [2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(!is_prime(9));
        assert!(!is_prime(25));
        assert!(is_prime(211));

        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(24), 29);
        assert_eq!(next_prime(29), 29);
        assert_eq!(next_prime(202), 211);
    }

    #[test]
    fn starting_capacity_grows_with_input() {
        assert_eq!(capacity_for_input(0), 211);
        assert_eq!(capacity_for_input(1 << 20), 211);
        assert_eq!(capacity_for_input(100 << 20), 409);
        assert!(is_prime(capacity_for_input(u64::MAX)));
    }

    #[test]
    fn seeded_holds_literals() {
        let dict = ChainedDictionary::seeded(BASE_CAPACITY);
        assert_eq!(dict.len(), literal::SEED_LEN);
        assert_eq!(dict.get(b" "), Some(&32));
        assert_eq!(dict.get(b"~"), Some(&126));
        assert_eq!(dict.get(b"\n"), Some(&literal::LINE_FEED));
        assert_eq!(dict.get(b"\r\n"), Some(&literal::CRLF));
        assert_eq!(dict.rehashes(), 0);
    }
}
