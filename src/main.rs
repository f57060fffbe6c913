// src/main.rs
// Command-line front end for RSA500 Reader

use std::env;
use std::process;
use rsa500_reader::Rsa500File;

fn print_usage() {
    eprintln!("Usage: rsa500_reader <command> <csv_file> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>              Display header and trace summary");
    eprintln!("  convert <file> <output>  Write the trace as frequency,amplitude CSV");
    eprintln!("  peak <file>              Print the highest-amplitude sample");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  rsa500_reader info 1M-11M.csv");
    eprintln!("  rsa500_reader convert 1M-11M.csv trace.csv");
    eprintln!("  RUST_LOG=debug rsa500_reader peak 1M-11M.csv");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let input_file = &args[2];

    let mut rsa = Rsa500File::new();
    if let Err(e) = rsa.load_file(input_file) {
        eprintln!("Error loading RSA500 file '{}': {}", input_file, e);
        process::exit(1);
    }

    match command.as_str() {
        "info" => {
            print_file_info(&rsa);
        }

        "convert" => {
            if args.len() < 4 {
                eprintln!("Error: Missing output file argument");
                print_usage();
                process::exit(1);
            }

            let output_file = &args[3];
            if let Err(e) = rsa.write_csv(output_file) {
                eprintln!("Error writing CSV file '{}': {}", output_file, e);
                process::exit(1);
            }

            println!("Successfully converted {} to {}", input_file, output_file);
            println!("Total points written: {}", rsa.trace.len());
        }

        "peak" => match rsa.peak() {
            Some(point) => {
                println!("{} {}, {}", point.frequency, rsa.file_header.frequency_unit, point.amplitude);
            }
            None => {
                eprintln!("Error: {} contains no trace points", input_file);
                process::exit(1);
            }
        },

        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_file_info(rsa: &Rsa500File) {
    println!("RSA500 File Information");
    println!("=======================");
    println!();
    println!("File: {}", rsa.file_path);
    println!("Format: {}", rsa.file_header.variant);
    println!();

    println!("Header:");
    for (key, value) in rsa.file_header.fields() {
        println!("  {:<20} {}", key, value);
    }
    println!();

    if rsa.trace.is_empty() {
        return;
    }

    let first = rsa.trace[0];
    let last = rsa.trace[rsa.trace.len() - 1];
    let amplitudes = rsa.amplitudes();
    let min_a = amplitudes.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max_a = amplitudes.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let avg = amplitudes.iter().sum::<f64>() / amplitudes.len() as f64;

    println!("Trace:");
    println!("  Points: {}", rsa.trace.len());
    println!("  Frequency range: {} to {} {}",
             first.frequency, last.frequency, rsa.file_header.frequency_unit);
    if rsa.trace.len() > 1 {
        let step = (last.frequency - first.frequency) / (rsa.trace.len() - 1) as f64;
        println!("  Frequency step: {:.3}", step);
    }
    println!("  Amplitude: min={:.3}, max={:.3}, avg={:.3} {}",
             min_a, max_a, avg, rsa.file_header.ref_level_units);
}
