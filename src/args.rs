use crate::orientation::Orientation;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// The file path of the image
    #[arg(value_name = "FILE-PATH", env = "MCIM_INPUT")]
    pub input: PathBuf,

    /// What to save the function file as
    #[arg(short, long, value_name = "FILE-PATH", default_value = "image.mcfunction", env = "MCIM_DEST")]
    pub dest: PathBuf,

    /// A decimal to scale the image by before conversion
    #[arg(short, long, value_name = "N", default_value_t = 1.0, env = "MCIM_SCALE")]
    pub scale: f64,

    /// Direction to build the image in (e.g. N+U). Allowed: N, E, S, W, U, D
    #[arg(short, long, value_name = "D", default_value = "N", env = "MCIM_ORIENTATION")]
    pub orientation: Orientation,

    /// Compress rows into fill commands (problematic for large images, due to unloaded chunks)
    #[arg(short, long, env = "MCIM_COMPRESS")]
    pub compress: bool,

    /// Don't ask for confirmation on large images
    #[arg(short = 'q', long, env = "MCIM_SUPPRESS")]
    pub suppress: bool,

    /// JSON file mapping block names to colours, replacing the built-in table (optional)
    #[arg(long, value_name = "FILE-PATH", env = "MCIM_BLOCKS")]
    pub blocks: Option<PathBuf>,

    /// Enable debug logging (optional)
    #[arg(long)]
    pub debug: bool,
}

/// Validates CLI arguments after parsing.
pub fn validate_args(args: &Args) -> Result<(), String> {
    if !args.input.is_file() {
        return Err(format!("Input image does not exist: {}", args.input.display()));
    }

    if !args.scale.is_finite() || args.scale <= 0.0 {
        return Err(format!(
            "Scale must be a positive number, got {}",
            args.scale
        ));
    }

    if let Some(ref blocks) = args.blocks {
        if !blocks.is_file() {
            return Err(format!("Block table does not exist: {}", blocks.display()));
        }
    }

    if args.dest.is_dir() {
        return Err(format!(
            "Destination is a directory: {}",
            args.dest.display()
        ));
    }

    Ok(())
}
