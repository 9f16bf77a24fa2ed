// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{print_json, print_report};

use anyhow::{bail, Result};
use clap::Parser;
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::{analyze_request, AnalysisRequest};

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

/// Run the CLI end to end: parse arguments, collect inputs, analyze.
pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = args.to_config();

    let image_files = collect_image_files(&args.input)?;
    if image_files.is_empty() {
        println!("{}", "No image files found!".red());
        return Ok(());
    }

    if !args.json {
        println!("Found {} image file(s)\n", image_files.len());
    }

    let progress = if image_files.len() > 1 && !args.json {
        let bar = ProgressBar::new(image_files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(image_files.len());
    for file_path in &image_files {
        if let Some(bar) = &progress {
            bar.set_message(file_path.display().to_string());
        }

        let request = AnalysisRequest::from_path(file_path, config.clone());
        let report = analyze_request(&request);

        if !args.json {
            if let Some(bar) = &progress {
                bar.suspend(|| print_one(file_path, &report, args.verbose));
            } else {
                print_one(file_path, &report, args.verbose);
            }
        }
        reports.push(report);

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if args.json {
        if reports.len() == 1 {
            print_json(&reports[0])?;
        } else {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(())
}

fn print_one(path: &Path, report: &crate::core::AnalysisReport, verbose: bool) {
    println!("Analyzing: {}", path.display().to_string().cyan());
    print_report(report, verbose);
    println!();
}

fn collect_image_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if has_image_extension(path) {
            files.push(path.to_path_buf());
        } else {
            bail!("not an image file: {}", path.display());
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && has_image_extension(entry_path) {
                files.push(entry_path.to_path_buf());
            }
        }
        files.sort();
    } else {
        bail!("input path does not exist: {}", path.display());
    }

    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_filter() {
        assert!(has_image_extension(Path::new("photo.JPG")));
        assert!(has_image_extension(Path::new("dir/render.webp")));
        assert!(!has_image_extension(Path::new("song.flac")));
        assert!(!has_image_extension(Path::new("noext")));
    }
}
