// src/lib.rs
// RSA500 Reader Library - Public API

//! # RSA500 Reader
//!
//! A Rust library for reading the CSV files saved by Tektronix RSA500-series
//! spectrum analyzers.
//!
//! ## Features
//!
//! - Recognizes `Spectrum` (ver 0), `Spectrum 1` and `EMC-EMI 1` exports
//! - Extracts center frequency, reference level, span / start-stop and RBW
//! - Decodes the trace into `(frequency, amplitude)` pairs
//! - Typed errors naming the section and line that failed
//!
//! Only the first trace of a file is decoded; `num_traces` is always 1.
//!
//! ## Example
//!
//! ```no_run
//! use rsa500_reader::Rsa500File;
//!
//! let mut rsa = Rsa500File::new();
//! rsa.load_file("1M-11M.csv").expect("Failed to load file");
//!
//! println!("Center frequency: {} {}",
//!          rsa.file_header.center_freq, rsa.file_header.center_freq_units);
//! println!("Points: {}", rsa.file_header.num_points);
//!
//! if let Some(peak) = rsa.peak() {
//!     println!("Peak: {} at {} Hz", peak.amplitude, peak.frequency);
//! }
//! ```
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade; install
//! whichever logger you like in the calling application.

mod record_reader;
mod rsa500_tools;

pub use record_reader::{Record, RecordReader};
pub use rsa500_tools::{
    parse_records, read_csv_file, FormatVariant, HeaderValue, Result, Rsa500Error, Rsa500File,
    Rsa500Header, TracePoint,
};
