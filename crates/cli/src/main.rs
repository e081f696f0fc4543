//! CLI tool for splitting PowerPoint presentations into one file per slide.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slidesplit_core::{DirectoryStorage, ExtractedSlideFile, SourcePresentation};
use slidesplit_pptx::{Presentation, PresentationSplitter};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Split PowerPoint presentations into single-slide presentations.
#[derive(Parser, Debug)]
#[command(name = "pptx-split")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one .pptx file per slide
    Split {
        /// Input presentation file(s) (.pptx)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mimetype to declare for the input instead of detecting it
        #[arg(short, long)]
        mimetype: Option<String>,

        /// Print a JSON manifest of the produced files
        #[arg(long)]
        json: bool,
    },

    /// List slide layouts and the master owning each of them
    Masters {
        /// Input presentation file (.pptx)
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Merge single-slide presentations into one (not implemented)
    Merge {
        /// Input presentation files (.pptx)
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Split {
            input,
            output,
            mimetype,
            json,
        } => {
            let mut manifest = Vec::new();
            for input_path in &input {
                if args.verbose {
                    eprintln!("Processing: {}", input_path.display());
                }

                let files = split_file(input_path, output.as_deref(), mimetype.as_deref())
                    .with_context(|| format!("Error processing {}", input_path.display()))?;

                if args.verbose {
                    for file in &files {
                        eprintln!("  Slide {} -> {}", file.number(), file.filename);
                    }
                }
                if !json {
                    for file in &files {
                        println!("{}", file.path.display());
                    }
                }
                manifest.extend(files);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
        }
        Command::Masters { input, json } => {
            let presentation = Presentation::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let masters: BTreeMap<_, _> = presentation
                .slide_masters()
                .with_context(|| format!("Failed to read masters of {}", input.display()))?
                .into_iter()
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&masters)?);
            } else {
                for (layout, master) in &masters {
                    println!("{}\t{}", layout, master.partname);
                }
            }
        }
        Command::Merge { input } => {
            log::debug!("Merge requested for {} files", input.len());
            PresentationSplitter::new().merge_slides(&[])?;
        }
    }

    Ok(())
}

/// Split a single presentation file.
fn split_file(
    input_path: &Path,
    output_dir: Option<&Path>,
    mimetype: Option<&str>,
) -> Result<Vec<ExtractedSlideFile>> {
    let mut source = SourcePresentation::from_path(input_path);
    if let Some(mimetype) = mimetype {
        source = source.with_mimetype(mimetype);
    }

    let splitter =
        PresentationSplitter::new().with_storage(DirectoryStorage::new(get_output_dir(input_path, output_dir)));

    Ok(splitter.split(&source)?)
}

/// Determine where the slide files of an input go.
fn get_output_dir(input_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    }
}
