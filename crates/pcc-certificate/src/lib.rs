//! # pcc-certificate
//!
//! Coverage certificates bind retrieved spans to a committed corpus root.
//! A certificate carries each span's inclusion branch, the stamps of the
//! parameters that selected it, and a digest over a canonical byte encoding,
//! so it can be checked later without the corpus.

pub mod assembler;
pub mod canonical;
pub mod verify;

pub use assembler::{CertificateAssembler, CertificateContext};
pub use canonical::certificate_digest;
pub use verify::CertificateVerifier;
