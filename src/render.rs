use anyhow::Result;
use std::fmt::Write;

use crate::fuel::{distribution, FuelCount};
use crate::session::SearchResults;
use crate::stations::{GeoPoint, StationRecord, TABLE_COLUMNS};

/// Width of the longest bar in the fuel type chart
const CHART_WIDTH: usize = 20;

pub const INTRO_TITLE: &str = "Usability Test: Alternative Fuel Finder";

pub const INTRO_TEXT: &str = "\
Welcome! You will be participating in a usability test for a tool that helps users
find alternative fuel locations in their desired area.

Instructions
- Complete each task in the order presented
- Provide honest feedback based on your experience, and submit!
- There is no technical experience needed to complete this test.";

pub const THANK_YOU_TEXT: &str = "\
Thank you for completing the usability test and sharing your feedback.
Your input helps us improve the Alternative Fuel Finder experience for everyone.
You may now close this window.";

/// How the stations of the results step are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsMode {
    #[default]
    Table,
    Map,
}

/// Everything the results step displays, derived from one search
pub struct ResultsView<'a> {
    pub location: &'a str,
    pub stations: &'a [StationRecord],
    pub locations: &'a [GeoPoint],
    pub distribution: Vec<FuelCount>,
}

impl<'a> ResultsView<'a> {
    pub fn new(location: &'a str, results: &'a SearchResults) -> Self {
        ResultsView {
            location,
            stations: &results.stations,
            locations: &results.locations,
            distribution: distribution(&results.stations),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Found {} fuel stations near your {}.",
            self.stations.len(),
            self.location
        )
    }
}

/// Render the full results step
pub fn render_results(view: &ResultsView<'_>, mode: ResultsMode) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "✓ {}", view.summary())?;

    match mode {
        ResultsMode::Table => {
            writeln!(&mut output, "\n## Table of Locations\n")?;
            output.push_str(&render_table(view.stations));
        }
        ResultsMode::Map => {
            writeln!(&mut output, "\n## Map View\n")?;
            output.push_str(&render_map(view.locations));
        }
    }

    writeln!(&mut output, "\n## Nearest Fuel Stations\n")?;
    for station in view.stations {
        write_station(&mut output, station)?;
    }

    writeln!(&mut output, "\n## Fuel Types Distribution\n")?;
    output.push_str(&render_chart(&view.distribution));

    Ok(output)
}

/// Fixed-column table of stations
pub fn render_table(stations: &[StationRecord]) -> String {
    let rows: Vec<[&str; 5]> = stations.iter().map(StationRecord::table_row).collect();

    let mut widths = TABLE_COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    output.push_str(&format_row(&TABLE_COLUMNS, &widths));
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');
    for row in &rows {
        output.push_str(&format_row(row, &widths));
    }
    output
}

fn format_row(cells: &[&str; 5], widths: &[usize; 5]) -> String {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}\n", line.trim_end())
}

/// Numbered list of map points
pub fn render_map(locations: &[GeoPoint]) -> String {
    if locations.is_empty() {
        return "No fuel stations available to display on map.\n".to_string();
    }

    let mut output = String::new();
    for (i, point) in locations.iter().enumerate() {
        output.push_str(&format!("{:>3}. {:.5}, {:.5}\n", i + 1, point.lat, point.lon));
    }
    output
}

fn write_station(output: &mut String, station: &StationRecord) -> Result<()> {
    writeln!(output, "**{}**", station.station_name.as_deref().unwrap_or(""))?;
    writeln!(
        output,
        "{}, {}, {}, {}",
        station.street_address.as_deref().unwrap_or(""),
        station.city.as_deref().unwrap_or(""),
        station.state.as_deref().unwrap_or(""),
        station.zip.as_deref().unwrap_or("N/A")
    )?;
    writeln!(
        output,
        "Fuel Type: {}",
        station.fuel_type_code.as_deref().unwrap_or("Unknown")
    )?;
    writeln!(output, "---")?;
    Ok(())
}

/// Horizontal bar chart of a fuel type distribution
pub fn render_chart(counts: &[FuelCount]) -> String {
    let label_width = counts
        .iter()
        .map(|c| c.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);

    let mut output = String::new();
    for entry in counts {
        let bar_len = if entry.count == 0 || max == 0 {
            0
        } else {
            (entry.count * CHART_WIDTH / max).max(1)
        };
        let line = format!(
            "{:<width$} {:>3} {}",
            entry.label,
            entry.count,
            "█".repeat(bar_len),
            width = label_width
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}
