//! Short code generation
//!
//! Codes are drawn from a fixed alphabet that leaves out visually ambiguous
//! characters (`0`, `O`, `1`, `I`, `l`). Generation never consults the store:
//! uniqueness is the caller's job (see `LinkService::create`).

use std::sync::Arc;

/// 短码字母表（57 个字符，去掉易混淆的 0/O/1/I/l）
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 8;
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Source of randomness for code generation.
///
/// `pick(bound)` must return a value in `0..bound`.
pub trait EntropySource: Send + Sync {
    fn pick(&self, bound: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngEntropy;

impl EntropySource for ThreadRngEntropy {
    fn pick(&self, bound: usize) -> usize {
        rand::random_range(0..bound)
    }
}

/// Fixed-length code generator over an entropy source.
#[derive(Clone)]
pub struct CodeGenerator {
    length: usize,
    entropy: Arc<dyn EntropySource>,
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator {
    /// Length is clamped to `MIN_CODE_LENGTH..=MAX_CODE_LENGTH`.
    pub fn new(length: usize) -> Self {
        Self::with_entropy(length, Arc::new(ThreadRngEntropy))
    }

    pub fn with_entropy(length: usize, entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            length: length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
            entropy,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        std::iter::repeat_with(|| {
            CODE_ALPHABET[self.entropy.pick(CODE_ALPHABET.len()) % CODE_ALPHABET.len()] as char
        })
        .take(self.length)
        .collect()
    }
}

/// Whether `code` could be a short code at all (used to reject junk paths
/// before they reach the store). Accepts a wider charset than the generator
/// emits so previously issued codes keep resolving if the alphabet changes.
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
