//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod timeseries {
    use std::io::{self, Write};

    use voyage_core::units::{m_to_nmi, ms_to_knots, seconds_to_minutes};

    const HEADER: &str = "step,time_s,time_min,position_m,distance_nmi,velocity_m_s,velocity_kn,acceleration_m_s2,thrust_n,resistance_n,waypoint";

    /// Write the standard time-series CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One CSV row of the exported time series, in SI units.
    #[derive(Debug, Clone, Copy)]
    pub struct Record {
        pub step: usize,
        pub time_s: f64,
        pub position_m: f64,
        pub velocity_m_s: f64,
        pub acceleration_m_s2: f64,
        pub thrust_n: f64,
        pub resistance_n: f64,
        /// Index of the waypoint reached at this step, if any.
        pub waypoint: Option<usize>,
    }

    impl Record {
        /// Serialize the record to CSV, adding the nautical display columns.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            write!(
                writer,
                "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.3},{:.3},",
                self.step,
                self.time_s,
                seconds_to_minutes(self.time_s),
                self.position_m,
                m_to_nmi(self.position_m),
                self.velocity_m_s,
                ms_to_knots(self.velocity_m_s),
                self.acceleration_m_s2,
                self.thrust_n,
                self.resistance_n,
            )?;
            match self.waypoint {
                Some(idx) => writeln!(writer, "{idx}"),
                None => writeln!(writer),
            }
        }
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::{self, Write};

    /// Per-leg entry of the JSON summary.
    #[derive(Debug, Clone, Serialize)]
    pub struct LegRecord {
        pub index: usize,
        pub distance_m: f64,
        pub target_m: f64,
        pub thrust_n: f64,
        pub start_step: u64,
        pub end_step: u64,
        pub start_time_s: f64,
        pub end_time_s: f64,
        pub end_velocity_m_s: f64,
    }

    /// Envelope of a finished voyage.
    #[derive(Debug, Clone, Serialize)]
    pub struct VoyageSummary {
        pub name: Option<String>,
        pub mass_kg: f64,
        pub timestep_s: f64,
        pub steps: usize,
        pub duration_s: f64,
        pub distance_m: f64,
        pub distance_nmi: f64,
        pub max_velocity_m_s: f64,
        pub max_velocity_kn: f64,
        pub termination: String,
        pub waypoint_markers: Vec<usize>,
        pub legs: Vec<LegRecord>,
        pub warnings: Vec<String>,
    }

    /// Write the summary as pretty JSON followed by a newline.
    pub fn write_summary(writer: &mut dyn Write, summary: &VoyageSummary) -> io::Result<()> {
        to_writer_pretty(&mut *writer, summary)?;
        writeln!(writer)
    }
}
