//! Whole-buffer and whole-file compression with size reporting.
//!
//! Inputs are loaded entirely into memory. Every call builds fresh codec
//! state, so independent calls may run concurrently without coordination.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::compression::{Algorithm, Artifact, Compression, LzwConfig};
use crate::error::{Error, Result};

/// Sizes of one compression, rendered in the three-line report format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionReport {
    pub algorithm: Algorithm,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl CompressionReport {
    /// Original size divided by compressed size.
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original file size: {} bytes", self.original_size)?;
        writeln!(f, "Compressed file size: {} bytes", self.compressed_size)?;
        write!(f, "Compression Ratio: {:.2}x", self.ratio())
    }
}

/// Sizes of one decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressionReport {
    pub algorithm: Algorithm,
    pub compressed_size: u64,
    pub decompressed_size: u64,
}

/// Compresses a whole buffer into artifact bytes.
///
/// Fails with [`Error::EmptyInput`] on a zero-length buffer.
pub fn compress_bytes(codec: &dyn Compression, data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    codec.compress(data)
}

/// Decompresses artifact bytes, selecting the codec from the artifact header.
pub fn decompress_bytes(artifact: &[u8]) -> Result<(Algorithm, Vec<u8>)> {
    let artifact = Artifact::deserialize(artifact)?;
    let algorithm = artifact.algorithm;
    let decoded = algorithm
        .codec(LzwConfig::default())
        .decompress_artifact(artifact)?;
    Ok((algorithm, decoded))
}

/// Reads `input`, writes its artifact to `output`, and reports both sizes.
pub fn compress_file(
    codec: &dyn Compression,
    input: &Path,
    output: &Path,
) -> Result<CompressionReport> {
    log::info!(
        "compressing {} with {}",
        input.display(),
        codec.algorithm()
    );
    let data = read_input(input)?;
    let artifact = compress_bytes(codec, &data)?;
    fs::write(output, &artifact)?;

    let report = CompressionReport {
        algorithm: codec.algorithm(),
        original_size: data.len() as u64,
        compressed_size: fs::metadata(output)?.len(),
    };
    log::info!("wrote {} ({:.2}x)", output.display(), report.ratio());
    Ok(report)
}

/// Reads an artifact from `input` and writes the restored content to `output`.
pub fn decompress_file(input: &Path, output: &Path) -> Result<DecompressionReport> {
    log::info!("decompressing {}", input.display());
    let artifact = read_input(input)?;
    let (algorithm, decoded) = decompress_bytes(&artifact)?;
    fs::write(output, &decoded)?;

    log::info!("wrote {} using {}", output.display(), algorithm);
    Ok(DecompressionReport {
        algorithm,
        compressed_size: artifact.len() as u64,
        decompressed_size: decoded.len() as u64,
    })
}

/// Compresses `data` with every algorithm in memory, best ratio first.
///
/// Algorithms that cannot represent the input (the character codecs on
/// non-UTF-8 data) are left out of the result.
pub fn compare(data: &[u8], lzw: LzwConfig) -> Result<Vec<CompressionReport>> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut reports = Vec::with_capacity(Algorithm::ALL.len());
    for algorithm in Algorithm::ALL {
        match algorithm.codec(lzw).compress(data) {
            Ok(artifact) => reports.push(CompressionReport {
                algorithm,
                original_size: data.len() as u64,
                compressed_size: artifact.len() as u64,
            }),
            Err(Error::InvalidInput(reason)) => {
                log::warn!("skipping {algorithm}: {reason}");
            }
            Err(e) => return Err(e),
        }
    }
    reports.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));
    Ok(reports)
}

/// Reads a whole file, mapping a missing path to [`Error::NotFound`].
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}
