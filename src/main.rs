use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::fs;
use std::time::Instant;

mod cli;
mod config_file;
mod processing;
mod utils;

use cli::{Args, WatermarkKind};
use processing::{BatchOutcome, ProcessingEngine};
use utils::{
    create_progress_bar, discover_sources, format_duration, validate_inputs, verbose_println,
};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();

    // Print banner
    println!(
        "{}",
        style("ImaginA Tools - Image Processor").bold().blue()
    );
    println!("{}", style("Batch conversion and watermarking").dim());
    println!();

    // Merge JSON preset under explicitly passed flags
    args.load_and_merge_config()?;

    // Validate inputs
    validate_inputs(&args)?;

    let extensions = args.parse_extensions();
    let sources = discover_sources(&args.input_paths, &extensions)?;

    if sources.is_empty() {
        println!(
            "{}",
            style("No images found with specified extensions").red()
        );
        return Ok(());
    }

    if args.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Inputs: {} image(s)", sources.len());
        println!("  Output directory: {}", args.output_dir.display());
        println!("  Format: {:?}", args.format);
        println!(
            "  Target size: {}x{}",
            args.target_width.map_or("auto".to_string(), |w| w.to_string()),
            args.target_height.map_or("auto".to_string(), |h| h.to_string())
        );
        println!("  Watermark: {:?}", args.watermark_mode);
        if args.watermark_mode != WatermarkKind::None {
            println!("    Placement: {:?}", args.placement);
            println!("    Size: {}%", args.size_percent);
            println!("    Opacity: {}%", args.opacity_percent);
        }
        println!("  Extensions: {:?}", extensions);
        println!();
    }

    let spec = args.build_spec().context("Invalid configuration")?;
    let engine = ProcessingEngine::new(spec);

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.output_dir.display()
        )
    })?;

    let progress_bar = create_progress_bar(sources.len() as u64);
    let outcome = engine.run(&sources, |done, _total| {
        progress_bar.set_position(done as u64);
    })?;
    progress_bar.finish_and_clear();

    // Write the result to disk
    let (written_path, entry_count) = match outcome {
        BatchOutcome::Single(result) => {
            let path = args.output_dir.join(result.file_name());
            fs::write(&path, &result.data)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            (path, 1)
        }
        BatchOutcome::Archive {
            name,
            data,
            entries,
        } => {
            let path = args.output_dir.join(&name);
            fs::write(&path, &data)
                .with_context(|| format!("Failed to write archive: {}", path.display()))?;
            for entry in &entries {
                verbose_println(args.verbose, &format!("archived {}", entry));
            }
            (path, entries.len())
        }
    };

    println!("{}", style("Results Summary:").bold().green());
    println!("  Processed: {}", style(entry_count).bold().green());
    println!("  Output: {}", style(written_path.display()).bold());
    println!(
        "  Total time: {}",
        style(format_duration(start_time.elapsed())).bold()
    );

    Ok(())
}
