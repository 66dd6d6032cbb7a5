use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use loadline_core::{Flight, HistoricalPoint, RiskLevel, SyncStatus};
use owo_colors::OwoColorize;

/// Standard output formatting for the CLI
#[derive(Debug, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    /// Print a success message (indented)
    pub fn success(&self, message: &str) {
        println!("  {} {}", "✓".bright_green(), message);
    }

    /// Print an error message (indented)
    pub fn error(&self, message: &str) {
        println!("  {} {}", "✗".bright_red(), message);
    }

    /// Print a warning message (indented)
    pub fn warning(&self, message: &str) {
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
    }

    /// Print a list item (already indented)
    pub fn list_item(&self, item: &str) {
        println!("    • {}", item);
    }

    /// Print a key-value pair (indented)
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {} {}", format!("{}:", key).dimmed(), value);
    }

    pub fn sync_status(&self, sync: &SyncStatus) {
        match sync {
            SyncStatus::Idle => {}
            SyncStatus::Fetching => self.status("Fetching..."),
            SyncStatus::Failed { message } => {
                self.warning(&format!("Last refresh failed, showing earlier data: {}", message))
            }
        }
    }

    pub fn flights(&self, flights: &[Flight]) {
        if flights.is_empty() {
            self.status("No flights match");
            return;
        }
        println!("{}", flights_table(flights));
    }

    pub fn flight_detail(&self, flight: &Flight) {
        self.section(&format!("Flight {}", flight.flight_number));
        self.kv("Route", &flight.route().label());
        self.kv("Date", &flight.flight_date);
        self.kv(
            "Utilization",
            &format!("{:.1}%", flight.utilization_percent),
        );
        self.kv("Risk", &risk_label(flight.risk_level));
        self.kv(
            "Weight",
            &format!(
                "{:.0} / {:.0} lb ({:.0} lb free)",
                flight.current_pounds,
                flight.max_pounds,
                flight.pounds_headroom()
            ),
        );
        self.kv(
            "Volume",
            &format!(
                "{:.0} / {:.0} ft³ ({:.0} ft³ free)",
                flight.current_cubic_feet,
                flight.max_cubic_feet,
                flight.cubic_feet_headroom()
            ),
        );
    }

    pub fn history(&self, points: &[HistoricalPoint]) {
        if points.is_empty() {
            self.status("No payload history");
            return;
        }
        for point in points {
            let marker = if point.predicted { " (predicted)" } else { "" };
            self.list_item(&format!(
                "{}  {:>10.0} lb  {:>8.0} ft³{}",
                point.date,
                point.pounds,
                point.cubic_feet,
                marker.dimmed()
            ));
        }
    }
}

pub fn flights_table(flights: &[Flight]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Flight", "Date", "Route", "Pounds", "Cubic ft", "Util %", "Risk",
        ]);

    for flight in flights {
        table.add_row(vec![
            Cell::new(&flight.flight_number),
            Cell::new(&flight.flight_date),
            Cell::new(flight.route().label()),
            Cell::new(format!("{:.0}", flight.current_pounds)),
            Cell::new(format!("{:.0}", flight.current_cubic_feet)),
            Cell::new(format!("{:.1}", flight.utilization_percent)),
            Cell::new(flight.risk_level.as_str()).fg(risk_color(flight.risk_level)),
        ]);
    }
    table
}

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Critical => Color::Red,
        RiskLevel::High => Color::Yellow,
        RiskLevel::Medium => Color::Cyan,
        RiskLevel::Low => Color::Green,
    }
}

fn risk_label(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Critical => risk.as_str().bright_red().to_string(),
        RiskLevel::High => risk.as_str().yellow().to_string(),
        RiskLevel::Medium => risk.as_str().cyan().to_string(),
        RiskLevel::Low => risk.as_str().green().to_string(),
    }
}
