//! Prime sizing for hash table backing arrays.
//!
//! A prime table length makes every stride in `[1, len - 1]` coprime to the
//! length, so a double-hashing probe visits each slot once before repeating.

/// Smallest prime `>= max(x, 2)`.
pub fn next_prime(x: i64) -> usize {
    if x < 3 {
        return 2;
    }
    next_prime_usize(usize::try_from(x).unwrap_or(usize::MAX))
}

/// `next_prime` for sizes already known to be non-negative.
pub(crate) fn next_prime_usize(n: usize) -> usize {
    if n <= 2 {
        return 2;
    }
    // First odd candidate >= n.
    let mut candidate = n | 1;
    while !is_prime(candidate) {
        candidate = match candidate.checked_add(2) {
            Some(c) => c,
            None => return candidate,
        };
    }
    candidate
}

/// Trial division by odd divisors up to `sqrt(n)`.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3usize;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
