// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use scoreparts::command::order_choices;
use scoreparts::config::{validate_config, ConfigEvent, ConfigWatcher, ScoreFile};
use scoreparts::logging::init_logging;
use scoreparts::{FileInstrumentsRepository, InstrumentsRepository, NotationParts};

fn print_usage() {
    println!("scoreparts - Score part and staff structure tool");
    println!();
    println!("Usage: scoreparts [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-orders <CATALOG>                   List score order presets");
    println!("  --show <SCORE> <CATALOG>                  Print the roster with its staves");
    println!("  --apply-order <SCORE> <CATALOG> <ORDER>   Reorder the roster by a preset");
    println!("  --validate <CATALOG>                      Check that a catalog file parses");
    println!("  --watch <CATALOG>                         Report catalog reloads for 30 seconds");
    println!("  --verbose                                 Log edits at debug level");
    println!("  --help                                    Show this help message");
}

fn list_orders(catalog: &str) -> Result<()> {
    let repository = FileInstrumentsRepository::new(catalog);
    let choices = order_choices(&repository, None);
    if choices.is_empty() {
        println!("No score orders available in {}", catalog);
        return Ok(());
    }
    println!("Score orders:");
    for choice in choices {
        println!("  {:<16} {}", choice.id, choice.title);
    }
    Ok(())
}

fn load_parts(score: &str, catalog: &str) -> Result<NotationParts> {
    let repository = FileInstrumentsRepository::new(catalog);
    let meta = repository
        .instruments_meta()
        .with_context(|| format!("Failed to load catalog: {}", catalog))?;
    let store = ScoreFile::load(score)?.build_store(&meta)?;
    Ok(NotationParts::new(store))
}

fn print_roster(parts: &NotationParts) -> Result<()> {
    if let Some(order) = parts.store().score_order() {
        let note = if order.is_customized() { " (customized)" } else { "" };
        println!("Order: {}{}", order.name(), note);
    }
    for (index, part) in parts.part_list().into_iter().enumerate() {
        let hidden = if part.is_visible() { "" } else { " [hidden]" };
        println!("{:>3}. {} ({}){}", index + 1, part.name(), part.id(), hidden);
        for (tick, instrument) in part.instruments() {
            println!("       @{:<6} {}", tick.to_string(), instrument.name());
        }
        for staff in parts.staff_list(part.id())? {
            let hidden = if staff.is_visible() { "" } else { " [hidden]" };
            println!("       {} {:?}{}", staff.id(), staff.staff_type(), hidden);
        }
    }
    Ok(())
}

fn apply_order(score: &str, catalog: &str, order_id: &str) -> Result<()> {
    let mut parts = load_parts(score, catalog)?;
    let repository = FileInstrumentsRepository::new(catalog);
    parts.set_score_order_by_id(&repository, order_id)?;
    print_roster(&parts)
}

fn watch_catalog(catalog: &str) -> Result<()> {
    let watcher = ConfigWatcher::new(catalog, None)?;
    println!("Watching {:?} (press Ctrl+C to stop)...", watcher.watched_path());

    let start_time = Instant::now();
    while start_time.elapsed() < Duration::from_secs(30) {
        if let Some(event) = watcher.try_recv() {
            match event {
                ConfigEvent::Reloaded(catalog) => println!(
                    "Reloaded: {} instruments, {} orders",
                    catalog.instruments.len(),
                    catalog.orders.len()
                ),
                ConfigEvent::Error(message) => eprintln!("Error: {}", message),
                ConfigEvent::FileCreated(path) => println!("Created: {:?}", path),
                ConfigEvent::FileDeleted(path) => println!("Deleted: {:?}", path),
            }
        } else {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
    Ok(())
}

/// Positional argument `index`, or exit with a usage hint
fn required(args: &[String], index: usize, what: &str, flag: &str) -> String {
    match args.get(index) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {}", flag, what);
            eprintln!("Run with --help for usage information");
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    args.retain(|a| a != "--verbose");
    init_logging(verbose);

    if args.len() < 2 {
        println!("scoreparts - Score part and staff structure tool");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--list-orders" => {
            let catalog = required(&args, 2, "a catalog file", "--list-orders");
            list_orders(&catalog)?;
        }
        "--show" => {
            let score = required(&args, 2, "a score file", "--show");
            let catalog = required(&args, 3, "a catalog file", "--show");
            print_roster(&load_parts(&score, &catalog)?)?;
        }
        "--apply-order" => {
            let score = required(&args, 2, "a score file", "--apply-order");
            let catalog = required(&args, 3, "a catalog file", "--apply-order");
            let order = required(&args, 4, "an order id", "--apply-order");
            apply_order(&score, &catalog, &order)?;
        }
        "--validate" => {
            let catalog = required(&args, 2, "a catalog file", "--validate");
            let parsed = validate_config(&catalog)?;
            println!(
                "Catalog OK: {} instruments, {} orders",
                parsed.instruments.len(),
                parsed.orders.len()
            );
        }
        "--watch" => {
            let catalog = required(&args, 2, "a catalog file", "--watch");
            watch_catalog(&catalog)?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        other => {
            return Err(anyhow!("Unknown option: {} (run with --help)", other));
        }
    }

    Ok(())
}
