pub mod compression;
pub mod error;
pub mod pipeline;

pub use compression::{Algorithm, Compression};
pub use error::{Error, Result};
pub use pipeline::{compress_file, decompress_file, CompressionReport};
