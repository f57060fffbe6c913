// RSA500Reader Module
// TK Ales, 2024
// Version 1.0 - Spectrum, Spectrum 1 and EMC-EMI 1 exports

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::record_reader::{Record, RecordReader};

const PARAMETERS_MARKER: &str = "[Parameters]";
const TRACES_MARKER: &str = "[Traces]";

const STEP_SIGNATURE: &str = "reading file signature";
const STEP_CENTER_FREQ: &str = "locating center frequency";
const STEP_REF_LEVEL: &str = "reading reference level";
const STEP_PARAMETERS: &str = "locating [Parameters] section";
const STEP_PARAMETER_BLOCK: &str = "reading parameter block";
const STEP_TRACES: &str = "locating [Traces] section";
const STEP_TRACE_HEADER: &str = "reading trace header";
const STEP_TRACE_DATA: &str = "reading trace data";

// Upper bound on up-front allocation; the point count comes from the file.
const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

#[derive(Error, Debug)]
pub enum Rsa500Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    #[error("Malformed input at line {line} while {step}: {detail}")]
    MalformedInput {
        line: usize,
        step: &'static str,
        detail: String,
    },

    #[error("Invalid value {value:?} for field '{field}' at line {line}")]
    FieldParseError {
        field: &'static str,
        value: String,
        line: usize,
    },
}

impl Rsa500Error {
    pub(crate) fn malformed(line: usize, step: &'static str, detail: impl Into<String>) -> Self {
        Rsa500Error::MalformedInput {
            line,
            step,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Rsa500Error>;

/// File layout, selected by the first field of the first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatVariant {
    /// `Spectrum`: version 0 spectrum export.
    #[default]
    Spectrum0,
    /// `Spectrum 1`: version 1 spectrum export.
    Spectrum1,
    /// `EMC-EMI 1`: version 1 EMC-EMI export.
    EmcEmi1,
}

impl FormatVariant {
    pub fn from_signature(signature: &str) -> Option<Self> {
        match signature {
            "Spectrum" => Some(FormatVariant::Spectrum0),
            "Spectrum 1" => Some(FormatVariant::Spectrum1),
            "EMC-EMI 1" => Some(FormatVariant::EmcEmi1),
            _ => None,
        }
    }

    pub fn signature(self) -> &'static str {
        match self {
            FormatVariant::Spectrum0 => "Spectrum",
            FormatVariant::Spectrum1 => "Spectrum 1",
            FormatVariant::EmcEmi1 => "EMC-EMI 1",
        }
    }

    pub fn version(self) -> u8 {
        match self {
            FormatVariant::Spectrum0 => 0,
            FormatVariant::Spectrum1 | FormatVariant::EmcEmi1 => 1,
        }
    }

    pub fn is_spectrum(self) -> bool {
        !matches!(self, FormatVariant::EmcEmi1)
    }

    /// Source column indices of (frequency, amplitude) in a trace row.
    fn trace_columns(self) -> (usize, usize) {
        if self.is_spectrum() {
            (1, 0)
        } else {
            (0, 1)
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_spectrum() { "spectrum" } else { "emc-emi" };
        write!(f, "{} (ver {})", kind, self.version())
    }
}

/// A single header value as it appears in the key/value view.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Float(f64),
    Integer(u64),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(s) => write!(f, "{s}"),
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// Instrument configuration decoded from the file header.
///
/// Spectrum files carry the span / RBW window fields, EMC-EMI files carry
/// the start / stop frequencies instead; the other set is `None`.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Rsa500Header {
    pub file: String,
    pub variant: FormatVariant,
    pub timestamp: String,
    pub center_freq: f64,
    pub center_freq_units: String,
    pub ref_level: f64,
    pub ref_level_units: String,
    pub span_freq: Option<f64>,
    pub span_freq_units: Option<String>,
    pub resolution_bw: f64,
    pub resolution_bw_units: String,
    pub rbw_window_type: Option<String>,
    pub start_freq: Option<f64>,
    pub start_freq_units: Option<String>,
    pub stop_freq: Option<f64>,
    pub stop_freq_units: Option<String>,
    pub num_points: usize,
    /// Always 1: files holding more than one trace are not decoded.
    pub num_traces: u32,
    pub frequency_unit: String,
}

impl Rsa500Header {
    /// The header as key/value pairs in document order. Keys absent for the
    /// file's variant are left out.
    pub fn fields(&self) -> Vec<(&'static str, HeaderValue)> {
        let text = |s: &str| HeaderValue::Text(s.to_string());

        let mut out = vec![
            ("file", text(&self.file)),
            ("timestamp", text(&self.timestamp)),
            ("center_freq", HeaderValue::Float(self.center_freq)),
            ("center_freq_units", text(&self.center_freq_units)),
            ("ref_level", HeaderValue::Float(self.ref_level)),
            ("ref_level_units", text(&self.ref_level_units)),
        ];

        if let Some(span) = self.span_freq {
            out.push(("span_freq", HeaderValue::Float(span)));
        }
        if let Some(units) = &self.span_freq_units {
            out.push(("span_freq_units", text(units)));
        }
        if let Some(start) = self.start_freq {
            out.push(("start_freq", HeaderValue::Float(start)));
        }
        if let Some(units) = &self.start_freq_units {
            out.push(("start_freq_units", text(units)));
        }
        if let Some(stop) = self.stop_freq {
            out.push(("stop_freq", HeaderValue::Float(stop)));
        }
        if let Some(units) = &self.stop_freq_units {
            out.push(("stop_freq_units", text(units)));
        }

        out.push(("resolution_bw", HeaderValue::Float(self.resolution_bw)));
        out.push(("resolution_bw_units", text(&self.resolution_bw_units)));

        if let Some(window) = &self.rbw_window_type {
            out.push(("rbw_window_type", text(window)));
        }

        out.push(("num_points", HeaderValue::Integer(self.num_points as u64)));
        out.push(("num_traces", HeaderValue::Integer(u64::from(self.num_traces))));
        out.push(("frequency_unit", text(&self.frequency_unit)));
        out
    }

    /// Look up one header value by key name.
    pub fn get(&self, key: &str) -> Option<HeaderValue> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }
}

/// One trace sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TracePoint {
    pub frequency: f64,
    pub amplitude: f64,
}

/// Read an RSA500 CSV export from `path`.
///
/// The header's `file` entry is the basename of `path`.
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<(Rsa500Header, Vec<TracePoint>)> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_handle = File::open(path)?;
    parse_records(BufReader::new(file_handle), filename)
}

/// Parse an already opened export. `filename` is stored verbatim in the header.
pub fn parse_records<R: BufRead>(
    reader: R,
    filename: impl Into<String>,
) -> Result<(Rsa500Header, Vec<TracePoint>)> {
    let mut records = RecordReader::new(reader);

    let header = scan_header(&mut records, filename.into())?;
    let trace = decode_trace(&mut records, &header)?;

    log::info!(
        "parsed {} points from {} ({}, {} lines)",
        trace.len(),
        header.file,
        header.variant,
        records.line()
    );
    Ok((header, trace))
}

/// Header phase: signature through the trace header rows.
fn scan_header<R: BufRead>(records: &mut RecordReader<R>, file: String) -> Result<Rsa500Header> {
    let mut header = Rsa500Header {
        file,
        num_traces: 1,
        ..Default::default()
    };

    let first = records.expect_record(STEP_SIGNATURE)?;
    let signature = first.field(0).unwrap_or_default();
    header.variant = FormatVariant::from_signature(signature)
        .ok_or_else(|| Rsa500Error::UnsupportedFormat(signature.to_string()))?;
    header.timestamp = first.require(1, STEP_SIGNATURE)?.to_string();
    log::debug!("{}: detected {} export", header.file, header.variant);

    // Center frequency and reference level
    let center = if header.variant.version() == 0 {
        records.skip(2, STEP_CENTER_FREQ)?;
        records.expect_record(STEP_CENTER_FREQ)?
    } else {
        records.scan_until(STEP_CENTER_FREQ, |r| {
            r.len() == 3 && r.field(0) == Some("Center Frequency")
        })?
    };
    header.center_freq = parse_f64(&center, 1, "center_freq", STEP_CENTER_FREQ)?;
    header.center_freq_units = center.require(2, STEP_CENTER_FREQ)?.to_string();

    let ref_level = records.expect_record(STEP_REF_LEVEL)?;
    header.ref_level = parse_f64(&ref_level, 1, "ref_level", STEP_REF_LEVEL)?;
    header.ref_level_units = ref_level.require(2, STEP_REF_LEVEL)?.to_string();

    records.scan_until(STEP_PARAMETERS, |r| r.is_marker(PARAMETERS_MARKER))?;
    if header.variant.is_spectrum() {
        read_spectrum_parameters(records, &mut header)?;
    } else {
        read_emc_parameters(records, &mut header)?;
    }
    log::debug!(
        "{}: center {} {}, rbw {} {}",
        header.file,
        header.center_freq,
        header.center_freq_units,
        header.resolution_bw,
        header.resolution_bw_units
    );

    // Trace header
    records.scan_until(STEP_TRACES, |r| r.is_marker(TRACES_MARKER))?;
    records.skip(2, STEP_TRACE_HEADER)?;
    let points = records.expect_record(STEP_TRACE_HEADER)?;
    header.num_points = parse_usize(&points, 1, "num_points", STEP_TRACE_HEADER)?;

    // The two variants lay the trace header rows out differently: spectrum
    // files put the unit on its own row, EMC-EMI files do not.
    header.frequency_unit = if header.variant.is_spectrum() {
        let unit = records.expect_record(STEP_TRACE_HEADER)?;
        unit.require(2, STEP_TRACE_HEADER)?.to_string()
    } else {
        points.require(1, STEP_TRACE_HEADER)?.to_string()
    };

    Ok(header)
}

fn read_spectrum_parameters<R: BufRead>(
    records: &mut RecordReader<R>,
    header: &mut Rsa500Header,
) -> Result<()> {
    let span = records.expect_record(STEP_PARAMETER_BLOCK)?;
    header.span_freq = Some(parse_f64(&span, 1, "span_freq", STEP_PARAMETER_BLOCK)?);
    header.span_freq_units = Some(span.require(2, STEP_PARAMETER_BLOCK)?.to_string());

    let rbw = records.expect_record(STEP_PARAMETER_BLOCK)?;
    header.resolution_bw = parse_f64(&rbw, 1, "resolution_bw", STEP_PARAMETER_BLOCK)?;
    header.resolution_bw_units = rbw.require(2, STEP_PARAMETER_BLOCK)?.to_string();

    let window = records.expect_record(STEP_PARAMETER_BLOCK)?;
    header.rbw_window_type = Some(window.require(1, STEP_PARAMETER_BLOCK)?.to_string());
    Ok(())
}

fn read_emc_parameters<R: BufRead>(
    records: &mut RecordReader<R>,
    header: &mut Rsa500Header,
) -> Result<()> {
    let start = records.scan_until(STEP_PARAMETER_BLOCK, |r| {
        r.len() == 5 && r.field(0) == Some("Start Frequency")
    })?;
    header.start_freq = Some(parse_f64(&start, 2, "start_freq", STEP_PARAMETER_BLOCK)?);
    header.start_freq_units = Some(start.require(3, STEP_PARAMETER_BLOCK)?.to_string());

    let stop = records.expect_record(STEP_PARAMETER_BLOCK)?;
    header.stop_freq = Some(parse_f64(&stop, 2, "stop_freq", STEP_PARAMETER_BLOCK)?);
    header.stop_freq_units = Some(stop.require(3, STEP_PARAMETER_BLOCK)?.to_string());

    let rbw = records.expect_record(STEP_PARAMETER_BLOCK)?;
    header.resolution_bw = parse_f64(&rbw, 2, "resolution_bw", STEP_PARAMETER_BLOCK)?;
    header.resolution_bw_units = rbw.require(3, STEP_PARAMETER_BLOCK)?.to_string();
    Ok(())
}

/// Trace phase: one column heading row, then exactly `num_points` samples.
fn decode_trace<R: BufRead>(
    records: &mut RecordReader<R>,
    header: &Rsa500Header,
) -> Result<Vec<TracePoint>> {
    records.skip(1, STEP_TRACE_DATA)?;

    let (freq_col, amp_col) = header.variant.trace_columns();
    let mut trace = Vec::with_capacity(header.num_points.min(MAX_PREALLOCATED_POINTS));

    for _ in 0..header.num_points {
        let row = records.expect_record(STEP_TRACE_DATA)?;
        let frequency = parse_f64(&row, freq_col, "frequency", STEP_TRACE_DATA)?;
        let amplitude = parse_f64(&row, amp_col, "amplitude", STEP_TRACE_DATA)?;
        trace.push(TracePoint {
            frequency,
            amplitude,
        });
    }

    Ok(trace)
}

fn parse_f64(record: &Record, index: usize, field: &'static str, step: &'static str) -> Result<f64> {
    let raw = record.require(index, step)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Rsa500Error::FieldParseError {
            field,
            value: raw.to_string(),
            line: record.line,
        })
}

fn parse_usize(
    record: &Record,
    index: usize,
    field: &'static str,
    step: &'static str,
) -> Result<usize> {
    let raw = record.require(index, step)?;
    raw.trim()
        .parse::<usize>()
        .map_err(|_| Rsa500Error::FieldParseError {
            field,
            value: raw.to_string(),
            line: record.line,
        })
}

/// Main RSA500 file reader
#[derive(Default, Debug)]
pub struct Rsa500File {
    pub file_path: String,
    pub file_header: Rsa500Header,
    pub trace: Vec<TracePoint>,
}

impl Rsa500File {
    /// Create a new Rsa500File instance
    pub fn new() -> Self {
        Rsa500File::default()
    }

    /// Load an RSA500 CSV export. On error the previous contents are kept.
    pub fn load_file<P: AsRef<Path>>(&mut self, input_file: P) -> Result<()> {
        let (header, trace) = read_csv_file(&input_file)?;

        self.file_path = input_file.as_ref().to_string_lossy().to_string();
        self.file_header = header;
        self.trace = trace;
        Ok(())
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.trace.iter().map(|p| p.frequency).collect()
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.trace.iter().map(|p| p.amplitude).collect()
    }

    /// Get a single sample by index
    pub fn get_point(&self, index: usize) -> Option<TracePoint> {
        self.trace.get(index).copied()
    }

    /// Sample with the largest amplitude
    pub fn peak(&self) -> Option<TracePoint> {
        self.trace
            .iter()
            .copied()
            .max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
    }

    /// Write the trace as plain `frequency,amplitude` rows
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(output_file)?;

        writer.write_record(["frequency", "amplitude"])?;
        for point in &self.trace {
            writer.write_record([point.frequency.to_string(), point.amplitude.to_string()])?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const SPECTRUM_V0: &str = "\
Spectrum,2023-01-05 10:11:12
Source,Trace 1
Detection,+Peak
Center Frequency,6000000,Hz
Reference Level,80,dBuV
[Parameters]
Span,10000000,Hz
RBW,9000,Hz
RBW Window,Kaiser
Ref Level Offset,0,dB
[Traces]
[Trace 1]
Show,True
Number of Points,3
XStart,1000000,Hz
Amplitude,Frequency
57.5,1000000
40.25,6000000
20,11000000
";

    const EMC_V1: &str = "\
EMC-EMI 1,2023-03-07 09:00:00
Instrument,RSA507A
Center Frequency,200000
Center Frequency,1,Hz,x
Center Frequency,15075000,Hz
Reference Level,90,dBuV
[Parameters]
Standard,CISPR,,,
Start Frequency,,999,Hz
Start Frequency,,150000,Hz,Start
Stop Frequency,,30000000,Hz,Stop
RBW,,9000,Hz,RBW
[Traces]
[Trace 1]
Show,True
Number of Points,2,Hz
Frequency,Amplitude
150000,31.5
30000000,12.25
";

    fn parse(text: &str) -> Result<(Rsa500Header, Vec<TracePoint>)> {
        parse_records(Cursor::new(text.as_bytes().to_vec()), "test.csv")
    }

    #[test]
    fn test_variant_signatures() {
        assert_eq!(FormatVariant::from_signature("Spectrum"), Some(FormatVariant::Spectrum0));
        assert_eq!(FormatVariant::from_signature("Spectrum 1"), Some(FormatVariant::Spectrum1));
        assert_eq!(FormatVariant::from_signature("EMC-EMI 1"), Some(FormatVariant::EmcEmi1));
        assert_eq!(FormatVariant::from_signature("spectrum"), None);
        assert_eq!(FormatVariant::EmcEmi1.to_string(), "emc-emi (ver 1)");
        assert_eq!(FormatVariant::Spectrum0.to_string(), "spectrum (ver 0)");
    }

    #[test]
    fn test_spectrum_v0_parsing() {
        let (header, trace) = parse(SPECTRUM_V0).unwrap();

        assert_eq!(header.file, "test.csv");
        assert_eq!(header.variant, FormatVariant::Spectrum0);
        assert_eq!(header.timestamp, "2023-01-05 10:11:12");
        assert_eq!(header.center_freq, 6_000_000.0);
        assert_eq!(header.center_freq_units, "Hz");
        assert_eq!(header.ref_level, 80.0);
        assert_eq!(header.ref_level_units, "dBuV");
        assert_eq!(header.span_freq, Some(10_000_000.0));
        assert_eq!(header.resolution_bw, 9_000.0);
        assert_eq!(header.rbw_window_type.as_deref(), Some("Kaiser"));
        assert_eq!(header.start_freq, None);
        assert_eq!(header.num_points, 3);
        assert_eq!(header.num_traces, 1);
        assert_eq!(header.frequency_unit, "Hz");

        assert_eq!(
            trace,
            vec![
                TracePoint { frequency: 1_000_000.0, amplitude: 57.5 },
                TracePoint { frequency: 6_000_000.0, amplitude: 40.25 },
                TracePoint { frequency: 11_000_000.0, amplitude: 20.0 },
            ]
        );
    }

    #[test]
    fn test_emc_parsing() {
        let (header, trace) = parse(EMC_V1).unwrap();

        assert_eq!(header.variant, FormatVariant::EmcEmi1);
        // Only the three-field "Center Frequency" row counts.
        assert_eq!(header.center_freq, 15_075_000.0);
        assert_eq!(header.center_freq_units, "Hz");
        assert_eq!(header.ref_level, 90.0);
        // Only the five-field "Start Frequency" row counts.
        assert_eq!(header.start_freq, Some(150_000.0));
        assert_eq!(header.start_freq_units.as_deref(), Some("Hz"));
        assert_eq!(header.stop_freq, Some(30_000_000.0));
        assert_eq!(header.resolution_bw, 9_000.0);
        assert_eq!(header.resolution_bw_units, "Hz");
        assert_eq!(header.span_freq, None);
        assert_eq!(header.rbw_window_type, None);
        assert_eq!(header.num_points, 2);
        // Taken from the point-count row itself for EMC-EMI exports.
        assert_eq!(header.frequency_unit, "2");

        assert_eq!(trace[0], TracePoint { frequency: 150_000.0, amplitude: 31.5 });
        assert_eq!(trace[1], TracePoint { frequency: 30_000_000.0, amplitude: 12.25 });
    }

    #[test]
    fn test_header_fields_view() {
        let (header, _) = parse(SPECTRUM_V0).unwrap();
        let fields = header.fields();

        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.first(), Some(&"file"));
        assert!(keys.contains(&"rbw_window_type"));
        assert!(!keys.contains(&"start_freq"));

        assert_eq!(header.get("num_points"), Some(HeaderValue::Integer(3)));
        assert_eq!(header.get("span_freq"), Some(HeaderValue::Float(10_000_000.0)));
        assert_eq!(
            header.get("resolution_bw_units"),
            Some(HeaderValue::Text("Hz".to_string()))
        );
        assert_eq!(header.get("stop_freq"), None);
    }

    #[test]
    fn test_unsupported_signature() {
        let result = parse("Unknown,2023-01-05\nfoo\n");
        assert!(matches!(result, Err(Rsa500Error::UnsupportedFormat(ref s)) if s == "Unknown"));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let result = parse("");
        assert!(matches!(
            result,
            Err(Rsa500Error::MalformedInput { step: STEP_SIGNATURE, .. })
        ));
    }

    #[test]
    fn test_missing_traces_marker() {
        let truncated = SPECTRUM_V0.replace("[Traces]\n", "");
        let result = parse(&truncated);
        assert!(matches!(
            result,
            Err(Rsa500Error::MalformedInput { step: STEP_TRACES, .. })
        ));
    }

    #[test]
    fn test_short_trace_is_malformed() {
        let short = SPECTRUM_V0.replace("20,11000000\n", "");
        let result = parse(&short);
        assert!(matches!(
            result,
            Err(Rsa500Error::MalformedInput { step: STEP_TRACE_DATA, line: 18, .. })
        ));
    }

    #[test]
    fn test_emc_missing_start_frequency() {
        let truncated = EMC_V1.replace("Start Frequency,,150000,Hz,Start\n", "");
        assert!(matches!(
            parse(&truncated),
            Err(Rsa500Error::MalformedInput { step: STEP_PARAMETER_BLOCK, .. })
        ));
    }

    #[test]
    fn test_emc_non_numeric_stop_frequency() {
        let bad = EMC_V1.replace("Stop Frequency,,30000000", "Stop Frequency,,30 MHz");
        match parse(&bad) {
            Err(Rsa500Error::FieldParseError { field, value, .. }) => {
                assert_eq!(field, "stop_freq");
                assert_eq!(value, "30 MHz");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_amplitude() {
        let bad = SPECTRUM_V0.replace("40.25,6000000", "n/a,6000000");
        match parse(&bad) {
            Err(Rsa500Error::FieldParseError { field, value, line }) => {
                assert_eq!(field, "amplitude");
                assert_eq!(value, "n/a");
                assert_eq!(line, 18);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_point_count() {
        let bad = SPECTRUM_V0.replace("Number of Points,3", "Number of Points,three");
        assert!(matches!(
            parse(&bad),
            Err(Rsa500Error::FieldParseError { field: "num_points", .. })
        ));
    }

    #[test]
    fn test_file_loading() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SPECTRUM_V0.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let mut rsa = Rsa500File::new();
        let result = rsa.load_file(temp_file.path());
        assert!(result.is_ok(), "Failed to load file: {:?}", result.err());

        let expected_name = temp_file.path().file_name().unwrap().to_string_lossy();
        assert_eq!(rsa.file_header.file, expected_name);
        assert_eq!(rsa.trace.len(), 3);
        assert_eq!(rsa.frequencies(), vec![1_000_000.0, 6_000_000.0, 11_000_000.0]);
        assert_eq!(rsa.amplitudes(), vec![57.5, 40.25, 20.0]);
    }

    #[test]
    fn test_failed_load_keeps_previous_contents() {
        let mut good = NamedTempFile::new().unwrap();
        good.write_all(SPECTRUM_V0.as_bytes()).unwrap();
        good.flush().unwrap();

        let mut bad = NamedTempFile::new().unwrap();
        bad.write_all(b"Unknown,0\n").unwrap();
        bad.flush().unwrap();

        let mut rsa = Rsa500File::new();
        rsa.load_file(good.path()).unwrap();
        assert!(rsa.load_file(bad.path()).is_err());
        assert_eq!(rsa.trace.len(), 3);
        assert_eq!(rsa.file_path, good.path().to_string_lossy());
    }

    #[test]
    fn test_point_access() {
        let mut rsa = Rsa500File::new();
        rsa.trace = vec![
            TracePoint { frequency: 1.0, amplitude: -3.0 },
            TracePoint { frequency: 2.0, amplitude: 7.5 },
            TracePoint { frequency: 3.0, amplitude: 1.0 },
        ];

        assert_eq!(rsa.get_point(1), Some(TracePoint { frequency: 2.0, amplitude: 7.5 }));
        assert!(rsa.get_point(3).is_none());
        assert_eq!(rsa.peak().map(|p| p.frequency), Some(2.0));
        assert!(Rsa500File::new().peak().is_none());
    }
}
