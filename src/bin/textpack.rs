use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use textpack::compression::lzw::DEFAULT_MAX_CODE_WIDTH;
use textpack::compression::{Algorithm, LzwConfig};
use textpack::pipeline;

/// Compress and decompress text files with Huffman, Shannon-Fano or LZW coding.
#[derive(Debug, Parser)]
#[command(name = "textpack", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compress INPUT into the artifact OUTPUT
    Compress {
        /// huffman, shannon-fano or lzw
        #[arg(short, long, default_value = "huffman")]
        algorithm: Algorithm,
        /// Largest LZW code width in bits (9-32)
        #[arg(long, default_value_t = DEFAULT_MAX_CODE_WIDTH)]
        max_code_width: u8,
        input: PathBuf,
        output: PathBuf,
    },
    /// Restore the artifact INPUT into OUTPUT; the algorithm is read from the artifact
    Decompress { input: PathBuf, output: PathBuf },
    /// Compress INPUT with every algorithm in memory and rank them by ratio
    Compare {
        #[arg(long, default_value_t = DEFAULT_MAX_CODE_WIDTH)]
        max_code_width: u8,
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match Cli::parse().command {
        Command::Compress {
            algorithm,
            max_code_width,
            input,
            output,
        } => {
            let lzw = LzwConfig::new(max_code_width).context("parsing --max-code-width")?;
            let codec = algorithm.codec(lzw);
            let report = pipeline::compress_file(codec.as_ref(), &input, &output)
                .with_context(|| format!("compressing {} with {algorithm}", input.display()))?;
            println!("{report}");
            println!("Successfully compressed and saved to {}", output.display());
        }
        Command::Decompress { input, output } => {
            let report = pipeline::decompress_file(&input, &output)
                .with_context(|| format!("decompressing {}", input.display()))?;
            println!(
                "Successfully decompressed {} bytes of {} data into {} bytes and saved to {}",
                report.compressed_size,
                report.algorithm,
                report.decompressed_size,
                output.display()
            );
        }
        Command::Compare {
            max_code_width,
            input,
        } => {
            let lzw = LzwConfig::new(max_code_width).context("parsing --max-code-width")?;
            let data = pipeline::read_input(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let reports = pipeline::compare(&data, lzw)
                .with_context(|| format!("comparing algorithms on {}", input.display()))?;

            println!(
                "{:<14} {:>22} {:>24} {:>8}",
                "Algorithm", "Original Size (bytes)", "Compressed Size (bytes)", "Ratio"
            );
            for report in reports {
                println!(
                    "{:<14} {:>22} {:>24} {:>7.2}x",
                    report.algorithm.to_string(),
                    report.original_size,
                    report.compressed_size,
                    report.ratio()
                );
            }
        }
    }
    Ok(())
}
