//! mcim: converts images into Minecraft `.mcfunction` files that build them block by block.

mod args;
mod block_definitions;
mod color_matcher;
mod colors;
mod command_emitter;
mod indexed_image;
mod orientation;
mod quantize;

use args::{validate_args, Args};
use block_definitions::{default_swatches, load_block_table, Swatch};
use clap::Parser;
use color_matcher::PaletteIndexMap;
use colored::*;
use command_emitter::{generate_function, EmitOptions};
use env_logger::Env;
use indexed_image::IndexedImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::{fs, process};

/// Images with at least this many pixels need confirmation before converting.
const LARGE_IMAGE_PIXELS: usize = 300_000;

enum Outcome {
    Written { commands: usize },
    Aborted,
}

fn print_banner() {
    let version: &str = env!("CARGO_PKG_VERSION");
    println!(
        r#"
                  _
         _ __ ___   ___(_)_ __ ___
        | '_ ` _ \ / __| | '_ ` _ \
        | | | | | | (__| | | | | | |
        |_| |_| |_|\___|_|_| |_| |_|

              version {}
        "#,
        version.bright_white().bold()
    );
}

/// Asks whether a large image should still be converted. Only an exact `y` proceeds.
fn confirm_large_image<R: BufRead, W: Write>(
    pixels: usize,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(
        output,
        "This image is big ({pixels} >= {LARGE_IMAGE_PIXELS}), it's suggested that you scale it. \
         Do you still want to proceed? (y/N) "
    )?;
    output.flush()?;

    let mut answer: String = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']) == "y")
}

fn load_swatches(args: &Args) -> Result<Vec<Swatch>, Box<dyn Error>> {
    Ok(match &args.blocks {
        Some(path) => load_block_table(path)?,
        None => default_swatches()?.to_vec(),
    })
}

fn run(args: &Args) -> Result<Outcome, Box<dyn Error>> {
    println!("{} Loading block table...", "[1/5]".bold());
    let swatches: Vec<Swatch> = load_swatches(args)?;

    println!("{} Loading image...", "[2/5]".bold());
    let image: IndexedImage = quantize::load_indexed_image(&args.input, args.scale)?;
    log::info!(
        "Image is {}x{} ({} blocks)",
        image.width(),
        image.height(),
        image.pixel_count()
    );

    if !args.suppress && image.pixel_count() >= LARGE_IMAGE_PIXELS {
        let stdin = io::stdin();
        let proceed: bool =
            confirm_large_image(image.pixel_count(), &mut stdin.lock(), &mut io::stdout())?;
        if !proceed {
            return Ok(Outcome::Aborted);
        }
    }

    println!("{} Matching colours to blocks...", "[3/5]".bold());
    let palette_map: PaletteIndexMap = PaletteIndexMap::build(&swatches, image.palette())?;
    let labels: Vec<&str> = palette_map.labels(&swatches);
    log::info!(
        "Matched {} palette entries against {} blocks",
        palette_map.len(),
        swatches.len()
    );
    if log::log_enabled!(log::Level::Debug) {
        for (index, rgb) in image.palette().iter().enumerate() {
            let index: u8 = index as u8;
            if let (Some(swatch), Some(distance)) =
                (palette_map.swatch_index(index), palette_map.distance(index))
            {
                log::debug!(
                    "palette[{}] {:?} -> {} (dE {:.2})",
                    index,
                    rgb,
                    swatches[swatch].label,
                    distance
                );
            }
        }
    }

    println!("{} Generating commands...", "[4/5]".bold());
    let progress: ProgressBar = ProgressBar::new(image.height() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:45.white/black}] {pos}/{len} rows ({eta})")?
            .progress_chars("█▓░"),
    );
    let options: EmitOptions = EmitOptions {
        orientation: args.orientation,
        compress: args.compress,
    };
    let function: String = generate_function(&image, &labels, options, &progress)?;
    progress.finish();

    // Nothing touches the destination until the whole function is built
    println!("{} Writing {}...", "[5/5]".bold(), args.dest.display());
    fs::write(&args.dest, &function)?;

    Ok(Outcome::Written {
        commands: function.lines().count(),
    })
}

fn main() {
    let args: Args = Args::parse();

    let default_level: &str = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    print_banner();

    if let Err(e) = validate_args(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }

    match run(&args) {
        Ok(Outcome::Written { commands }) => {
            println!(
                "{} {} commands ({}, orientation {})",
                "Done!".green().bold(),
                commands,
                if args.compress { "compressed" } else { "uncompressed" },
                args.orientation
            );
        }
        Ok(Outcome::Aborted) => {
            println!("Aborted.");
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    }
}
