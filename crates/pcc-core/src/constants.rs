/// PCC system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Domain separator for Merkle leaf hashes.
pub const LEAF_DOMAIN: &[u8] = b"pcc:leaf:v1\0";

/// Domain separator for interior Merkle node hashes.
pub const NODE_DOMAIN: &[u8] = b"pcc:node:v1\0";

/// Domain separator for the padding node used on odd levels.
pub const EMPTY_DOMAIN: &[u8] = b"pcc:empty:v1\0";

/// Domain separator for certificate digests.
pub const CERTIFICATE_DOMAIN: &[u8] = b"pcc:certificate:v1\0";

/// Upper bound on Merkle tree depth accepted from untrusted proofs.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Upper bound on the number of spans a single certificate may carry.
pub const MAX_CERTIFICATE_SPANS: usize = 256;

/// Bytes in one mebibyte, used for memory budget accounting.
pub const BYTES_PER_MB: u64 = 1024 * 1024;
