//! Turning a [`VoyageReport`] into export artifacts.

use std::io::{self, Write};
use std::path::Path;

use voyage_core::units::{m_to_nmi, ms_to_knots};
use voyage_export::summary::{LegRecord, VoyageSummary, write_summary};
use voyage_export::timeseries::{Record, write_header};
use voyage_export::writer_for_path;

use crate::voyage::VoyageReport;

/// Rows of the time-series CSV, one per history entry.
///
/// A step shared by several markers (zero-length legs) is tagged with the
/// last waypoint reached there.
pub fn timeseries_records(report: &VoyageReport) -> Vec<Record> {
    let series = &report.series;
    let mut waypoints = vec![None; series.len()];
    for (idx, &step) in report.waypoint_markers.iter().enumerate() {
        if let Some(slot) = waypoints.get_mut(step) {
            *slot = Some(idx);
        }
    }

    (0..series.len())
        .map(|i| Record {
            step: i,
            time_s: series.time_s[i],
            position_m: series.position_m[i],
            velocity_m_s: series.velocity_m_s[i],
            acceleration_m_s2: series.acceleration_m_s2[i],
            thrust_n: series.thrust_n[i],
            resistance_n: series.resistance_n[i],
            waypoint: waypoints[i],
        })
        .collect()
}

pub fn summarize(report: &VoyageReport, name: Option<&str>) -> VoyageSummary {
    let max_velocity_m_s = report.max_velocity_m_s();
    VoyageSummary {
        name: name.map(str::to_owned),
        mass_kg: report.mass_kg,
        timestep_s: report.timestep_s,
        steps: report.steps(),
        duration_s: report.duration_s(),
        distance_m: report.distance_m(),
        distance_nmi: m_to_nmi(report.distance_m()),
        max_velocity_m_s,
        max_velocity_kn: ms_to_knots(max_velocity_m_s),
        termination: report.termination.to_string(),
        waypoint_markers: report.waypoint_markers.clone(),
        legs: report
            .legs
            .iter()
            .map(|leg| LegRecord {
                index: leg.index,
                distance_m: leg.distance_m,
                target_m: leg.target_m,
                thrust_n: leg.thrust_n,
                start_step: leg.start_step,
                end_step: leg.end_step,
                start_time_s: leg.start_time_s,
                end_time_s: leg.end_time_s,
                end_velocity_m_s: leg.end_velocity_m_s,
            })
            .collect(),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
    }
}

pub fn write_timeseries(writer: &mut dyn Write, report: &VoyageReport) -> io::Result<()> {
    write_header(writer)?;
    for record in timeseries_records(report) {
        record.write_to(writer)?;
    }
    writer.flush()
}

/// Write the time-series CSV to `path` (`-` for stdout).
pub fn export_timeseries(path: &Path, report: &VoyageReport) -> io::Result<()> {
    let mut writer = writer_for_path(path)?;
    write_timeseries(&mut *writer, report)
}

/// Write the JSON summary to `path` (`-` for stdout).
pub fn export_summary(path: &Path, report: &VoyageReport, name: Option<&str>) -> io::Result<()> {
    let mut writer = writer_for_path(path)?;
    write_summary(&mut *writer, &summarize(report, name))?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twin::SimulationRun;
    use crate::voyage::{Voyage, Waypoint};
    use voyage_core::geo::DistanceModel;
    use voyage_resistance::ResistanceTable;

    fn short_report() -> VoyageReport {
        let table = ResistanceTable::from_pairs(&[(0.0, 0.0), (10.0, 100.0)]).unwrap();
        let run = SimulationRun::at_rest(1_000.0, 1.0, table).unwrap();
        let wps = [
            Waypoint::new(0.0, 0.0, 1_000.0),
            Waypoint::new(0.0, 0.0, 500.0),
            Waypoint::new(0.0, 0.0005, 0.0),
        ];
        Voyage::new(run, &wps, DistanceModel::GreatCircle)
            .unwrap()
            .run()
    }

    #[test]
    fn records_follow_the_series() {
        let report = short_report();
        let records = timeseries_records(&report);
        assert_eq!(records.len(), report.series.len());
        // legs 0 and 1 both start at step 0; the later one wins the tag
        assert_eq!(records[0].waypoint, Some(1));
        let last = records.last().unwrap();
        assert_eq!(last.waypoint, Some(2));
        assert_eq!(last.position_m, report.distance_m());
    }

    #[test]
    fn summary_carries_warnings_and_legs() {
        let report = short_report();
        let summary = summarize(&report, Some("harbour"));
        assert_eq!(summary.name.as_deref(), Some("harbour"));
        assert_eq!(summary.legs.len(), 2);
        assert_eq!(summary.termination, "completed");
        assert!(summary.warnings.iter().any(|w| w.contains("zero length")));
    }

    #[test]
    fn csv_has_header_and_one_row_per_entry() {
        let report = short_report();
        let mut buf = Vec::new();
        write_timeseries(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), report.series.len() + 1);
    }
}
