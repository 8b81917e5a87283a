//! Dump the resolved htoprc configuration for inspection
//!
//! Usage:
//!   cargo run --bin htoprc_dump
//!   cargo run --bin htoprc_dump -- --rcfile /path/to/htoprc --cpus 8

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use htoprc::{stock_catalog, ConfigPaths, Settings};

/// Print the configuration an htop-compatible viewer would start with
#[derive(Parser, Debug)]
#[command(name = "htoprc_dump")]
struct Args {
    /// Read this file instead of resolving from the environment
    #[arg(long = "rcfile", value_name = "PATH")]
    rcfile: Option<PathBuf>,

    /// CPU count used for the default meter layout
    #[arg(long = "cpus", value_name = "N", default_value_t = 4)]
    cpus: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let catalog = stock_catalog();

    let settings = match args.rcfile {
        Some(filename) => {
            let paths = ConfigPaths {
                filename,
                legacy: None,
                system: ConfigPaths::system_default(),
            };
            Settings::with_paths(paths, args.cpus, catalog)
        }
        None => Settings::new(args.cpus, catalog),
    };

    println!("file: {}", settings.filename.display());
    println!("dirty: {}", settings.changed);
    println!();

    let field_names: Vec<&str> = settings
        .fields
        .iter()
        .map(|&id| catalog.name(id))
        .collect();
    println!("fields: {}", field_names.join(" "));
    println!(
        "sort: {} ({})",
        catalog.name(settings.sort_key),
        if settings.direction == 1 {
            "ascending"
        } else {
            "descending"
        }
    );
    println!("delay: {} tenths of a second", settings.delay);
    println!("color scheme: {:?}", settings.color_scheme);
    println!();

    println!("tree_view: {}", settings.tree_view);
    println!("hide_threads: {}", settings.hide_threads);
    println!("hide_kernel_threads: {}", settings.hide_kernel_threads);
    println!("hide_userland_threads: {}", settings.hide_userland_threads);
    println!("shadow_other_users: {}", settings.shadow_other_users);
    println!("show_thread_names: {}", settings.show_thread_names);
    println!("show_program_path: {}", settings.show_program_path);
    println!("highlight_base_name: {}", settings.highlight_base_name);
    println!("highlight_megabytes: {}", settings.highlight_megabytes);
    println!("highlight_threads: {}", settings.highlight_threads);
    println!("header_margin: {}", settings.header_margin);
    println!("detailed_cpu_time: {}", settings.detailed_cpu_time);
    println!("cpu_count_from_zero: {}", settings.cpu_count_from_zero);
    println!("update_process_names: {}", settings.update_process_names);
    println!(
        "account_guest_in_cpu_meter: {}",
        settings.account_guest_in_cpu_meter
    );
    println!();

    for (label, column) in ["left", "right"].iter().zip(settings.columns.iter()) {
        let meters: Vec<String> = column
            .names
            .iter()
            .zip(column.modes.iter())
            .map(|(name, mode)| format!("{}({})", name, mode))
            .collect();
        println!("{} meters: {}", label, meters.join(" "));
    }

    Ok(())
}
