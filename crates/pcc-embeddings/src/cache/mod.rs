pub mod l1_memory;

pub use l1_memory::L1MemoryCache;

/// Content hash used as the cache key for a text.
pub fn content_key(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}
