//! Key hashing for the double-hashed table.
//!
//! Keys expose a byte encoding (UTF-8 for strings, little-endian
//! two's-complement at native width for integers). Two independent,
//! non-cryptographic hashes run over those bytes: a polynomial rolling hash
//! picks the home slot and an FNV-1a style hash picks the probe stride.

use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;
use std::borrow::Cow;

const PRIMARY_MULTIPLIER: u64 = 31;
const FNV_OFFSET_BASIS: u64 = 2_166_136_261;
const FNV_PRIME: u64 = 16_777_619;

/// Polynomial rolling hash, `h = 31 * h + byte`, wrapping at 2^64.
pub fn primary_hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |h, &b| {
        h.wrapping_mul(PRIMARY_MULTIPLIER).wrapping_add(u64::from(b))
    })
}

/// FNV-1a style hash, `h = (h * 16777619 mod 2^64) xor byte`.
pub fn step_hash(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET_BASIS, |h, &b| h.wrapping_mul(FNV_PRIME) ^ u64::from(b))
}

/// Both hashes of one key, computed once and cached alongside the entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyHashes {
    pub primary: u64,
    pub step: u64,
}

impl KeyHashes {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self {
            primary: primary_hash(bytes),
            step: step_hash(bytes),
        }
    }

    /// First slot probed in a table of `len` slots.
    #[inline]
    pub fn home(&self, len: usize) -> usize {
        (self.primary % len as u64) as usize
    }

    /// Probe stride in `[1, len - 1]`; never zero. Requires `len >= 2`.
    #[inline]
    pub fn stride(&self, len: usize) -> usize {
        debug_assert!(len >= 2);
        (self.step % (len as u64 - 1)) as usize + 1
    }
}

/// A key the table can place: equality plus a deterministic byte encoding.
///
/// Lookups accept any `Q: HashKey` the stored key borrows as, so a
/// `HashTable<String, _>` can be queried with `&str`. `Borrow` requires the
/// borrowed form to encode identically, which holds for the impls below.
pub trait HashKey: Eq {
    /// Byte encoding fed to both hash functions.
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>>;

    fn key_hashes(&self) -> Result<KeyHashes> {
        let bytes = self.key_bytes()?;
        Ok(KeyHashes::of_bytes(&bytes))
    }
}

impl HashKey for str {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl HashKey for String {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.as_str().key_bytes()
    }
}

impl HashKey for Box<str> {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).key_bytes()
    }
}

impl<T: HashKey + ?Sized> HashKey for &T {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).key_bytes()
    }
}

macro_rules! int_hash_key {
    ($($t:ty),* $(,)?) => {$(
        impl HashKey for $t {
            fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
                Ok(Cow::Owned(self.to_le_bytes().to_vec()))
            }
        }
    )*};
}

int_hash_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Dynamically typed scalar, usable as both key and value.
///
/// Lets a single table hold string and integer keys side by side. Floats
/// are carried as values but refuse to hash, so using one as a key fails
/// with [`Error::UnsupportedKeyType`].
#[derive(Clone, Debug)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            // Bitwise so that equality stays reflexive.
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl HashKey for Scalar {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Scalar::Str(s) => s.key_bytes(),
            Scalar::Int(i) => i.key_bytes(),
            Scalar::Float(_) => Err(Error::UnsupportedKeyType("float")),
        }
    }
}

/// Text form used by `HashTable::export`. Integers print as digits and
/// floats always carry a `.`, an exponent or `inf`/`NaN`. A string that
/// would read back as a number, or that starts with `"`, is wrapped in
/// double quotes so that `parse` returns the same variant.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) if needs_quotes(s) => write!(f, "\"{s}\""),
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
        }
    }
}

fn needs_quotes(s: &str) -> bool {
    s.starts_with('"') || s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok()
}

/// Inverse of `Display`: a quoted token is a `Str`, then integers parse as
/// `Int` and other numbers as `Float`. Anything else is kept verbatim.
impl FromStr for Scalar {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        if let Some(inner) = s
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return Ok(Scalar::Str(inner.to_owned()));
        }
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Scalar::Int(i));
        }
        Ok(match s.parse::<f64>() {
            Ok(x) => Scalar::Float(x),
            Err(_) => Scalar::Str(s.to_owned()),
        })
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hash_is_polynomial_rolling() {
        assert_eq!(primary_hash(b""), 0);
        assert_eq!(primary_hash(b"a"), 97);
        assert_eq!(primary_hash(b"ab"), 31 * 97 + 98);
        // Same value the JVM gives for "hello" before 32-bit truncation.
        assert_eq!(primary_hash(b"hello"), 99_162_322);
    }

    #[test]
    fn step_hash_starts_at_offset_basis() {
        assert_eq!(step_hash(b""), FNV_OFFSET_BASIS);
        assert_eq!(
            step_hash(b"a"),
            FNV_OFFSET_BASIS.wrapping_mul(FNV_PRIME) ^ 97
        );
    }

    #[test]
    fn stride_is_never_zero() {
        for len in [2usize, 3, 5, 7, 101, 163] {
            for step in [0u64, 1, len as u64 - 1, len as u64, u64::MAX] {
                let h = KeyHashes { primary: 0, step };
                let s = h.stride(len);
                assert!((1..len).contains(&s), "stride {s} for len {len}");
            }
        }
    }

    #[test]
    fn integers_encode_at_native_width() {
        assert_eq!(&*1i32.key_bytes().unwrap(), &[1, 0, 0, 0]);
        assert_eq!(&*(-1i32).key_bytes().unwrap(), &[0xff; 4]);
        assert_eq!(1i64.key_bytes().unwrap().len(), 8);
        assert_ne!(1i32.key_hashes().unwrap(), 1i64.key_hashes().unwrap());
    }

    #[test]
    fn borrowed_forms_hash_identically() {
        let owned = String::from("alice");
        assert_eq!(owned.key_hashes().unwrap(), "alice".key_hashes().unwrap());
        let boxed: Box<str> = "alice".into();
        assert_eq!(boxed.key_hashes().unwrap(), "alice".key_hashes().unwrap());
    }

    #[test]
    fn scalar_float_key_is_unsupported() {
        assert_eq!(
            Scalar::from(1.5).key_hashes(),
            Err(Error::UnsupportedKeyType("float"))
        );
        assert!(Scalar::from(7).key_hashes().is_ok());
        assert!(Scalar::from("seven").key_hashes().is_ok());
    }

    #[test]
    fn scalar_parses_ints_and_keeps_strings() {
        assert_eq!("42".parse::<Scalar>().unwrap(), Scalar::Int(42));
        assert_eq!("-7".parse::<Scalar>().unwrap(), Scalar::Int(-7));
        assert_eq!("4x".parse::<Scalar>().unwrap(), Scalar::from("4x"));
        assert_eq!("2.5".parse::<Scalar>().unwrap(), Scalar::Float(2.5));
        assert_eq!(Scalar::from(42).to_string(), "42");
        assert_ne!(Scalar::from(1), Scalar::from("1"));
    }

    /// Invariant: `parse(to_string(x)) == x` for every variant, including
    /// strings that look like numbers or start with a quote.
    #[test]
    fn scalar_text_form_reads_back_as_same_variant() {
        let cases = [
            Scalar::from("1"),
            Scalar::from("-7"),
            Scalar::from("2.5"),
            Scalar::from("inf"),
            Scalar::from("NaN"),
            Scalar::from("\""),
            Scalar::from("\"quoted\""),
            Scalar::from("\"half"),
            Scalar::from(""),
            Scalar::from("plain"),
            Scalar::Int(1),
            Scalar::Int(i64::MIN),
            Scalar::Float(2.0),
            Scalar::Float(2.5),
            Scalar::Float(-0.0),
            Scalar::Float(1e-7),
            Scalar::Float(f64::INFINITY),
        ];
        for x in cases {
            let text = x.to_string();
            assert_eq!(text.parse::<Scalar>().unwrap(), x, "via {text:?}");
        }
        assert_eq!(Scalar::from("1").to_string(), "\"1\"");
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
        assert_eq!(Scalar::from("plain").to_string(), "plain");
    }
}
