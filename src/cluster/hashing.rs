use std::hash::Hasher;
use twox_hash::XxHash64;

/// Maps a string onto the 64-bit ring. Implementations must be deterministic
/// and stable across processes, otherwise independent routers disagree.
pub trait HashFunction: Sync + Send {
    fn hash(&self, key: &str) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XxHash;

impl HashFunction for XxHash {
    fn hash(&self, key: &str) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// Lets callers inject any hash as a plain closure.
impl<F> HashFunction for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn hash(&self, key: &str) -> u64 {
        self(key)
    }
}
