pub mod index;
pub mod quantizer;

pub use index::{PqIndex, SpanMeta};
pub use quantizer::{LookupTable, ProductQuantizer};
