//! Per-cycle resource names.

use std::fmt;

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Prefix shared by every generated name.
pub const DEFAULT_PREFIX: &str = "kubernoisy-";

/// Number of random characters appended to the prefix.
pub const DEFAULT_SUFFIX_LEN: usize = 18;

/// Name used for both resources of one churn cycle and for the DNS lookups
/// that verify them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CycleIdentity(String);

impl CycleIdentity {
    /// Wraps an existing name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CycleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CycleIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Produces statistically unique, DNS-1123 compatible names.
#[derive(Clone, Debug)]
pub struct NameGenerator {
    prefix: String,
    suffix_len: usize,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_SUFFIX_LEN)
    }
}

impl NameGenerator {
    /// Creates a generator with a custom prefix and random suffix length.
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            suffix_len,
        }
    }

    /// Generates a fresh identity.
    #[must_use]
    pub fn generate(&self) -> CycleIdentity {
        let mut rng = rand::thread_rng();
        let mut name = String::with_capacity(self.prefix.len() + self.suffix_len);
        name.push_str(&self.prefix);
        name.extend(
            (0..self.suffix_len).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])),
        );
        CycleIdentity(name)
    }
}
