//! turf-inspect: territory data inspection tool.
//!
//! Usage:
//!   turf-inspect defs <territories.txt>
//!   turf-inspect sidecar <ownership_0.bin>

use std::process;

use turfwar_core::types::owner_to_code;
use turfwar_sim::persistence::decode_ownership;
use turfwar_sim::territory::parse_definitions;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "defs" => cmd_defs(&args[2..]),
        "sidecar" => cmd_sidecar(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "turf-inspect: TURFWAR territory data inspection tool\n\
         \n\
         Commands:\n\
         \n\
         defs <path>     Validate and summarize a territory definition file\n\
         sidecar <path>  Decode and dump an ownership sidecar blob\n\
         \n\
         Examples:\n\
         \n\
           turf-inspect defs territories.txt\n\
           turf-inspect sidecar saves/ownership_0.bin\n"
    );
}

fn cmd_defs(args: &[String]) {
    let Some(path) = args.first() else {
        eprintln!("Error: defs needs a file path");
        process::exit(1);
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read {path}: {e}");
            process::exit(1);
        }
    };

    let territories = match parse_definitions(&text) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("INVALID: {e}");
            process::exit(1);
        }
    };

    println!("OK: {} territories", territories.len());
    println!(
        "{:>6}  {:>9} {:>9} {:>9} {:>9}  {:>6}  {:>8}  area",
        "id", "minX", "minY", "maxX", "maxY", "owner", "defense"
    );
    let mut total_area = 0.0f32;
    for t in &territories {
        let area = t.rect.width() * t.rect.height();
        total_area += area;
        println!(
            "{:>6}  {:>9.1} {:>9.1} {:>9.1} {:>9.1}  {:>6}  {:>8?}  {:.0} m2",
            t.id,
            t.rect.min.x,
            t.rect.min.y,
            t.rect.max.x,
            t.rect.max.y,
            owner_to_code(t.owner),
            t.defense,
            area
        );
    }
    println!("Total area: {total_area:.0} m2");

    // Overlaps are legal (first-match-wins at runtime) but worth surfacing.
    for (i, a) in territories.iter().enumerate() {
        for b in territories.iter().skip(i + 1) {
            let overlap = a.rect.min.x < b.rect.max.x
                && b.rect.min.x < a.rect.max.x
                && a.rect.min.y < b.rect.max.y
                && b.rect.min.y < a.rect.max.y;
            if overlap {
                println!("Warning: {} overlaps {} ({} wins inside the overlap)", a.id, b.id, a.id);
            }
        }
    }
}

fn cmd_sidecar(args: &[String]) {
    let Some(path) = args.first() else {
        eprintln!("Error: sidecar needs a file path");
        process::exit(1);
    };

    let blob = match std::fs::read(path) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("Error: failed to read {path}: {e}");
            process::exit(1);
        }
    };

    let entries = match decode_ownership(&blob) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("INVALID: {e}");
            process::exit(1);
        }
    };

    println!("OK: {} entries ({} bytes)", entries.len(), blob.len());
    for entry in &entries {
        match entry.owner {
            Some(owner) => println!("{:>6}  faction {}", entry.id, owner),
            None => println!("{:>6}  neutral", entry.id),
        }
    }
}
