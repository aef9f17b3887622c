//! Plain-text rendering of screens for terminal hosts.

use std::fmt;

use vista_core::format_metric;

use crate::render::{
    BarChart, DashboardBody, DashboardScreen, DatasetView, HistoryPanel, LoginScreen, Screen,
};

const BRAND: &str = "V.I.S.T.A.";
const BAR_WIDTH: usize = 30;

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login(login) => fmt::Display::fmt(login, f),
            Self::Dashboard(dashboard) => fmt::Display::fmt(dashboard, f),
        }
    }
}

impl fmt::Display for LoginScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BRAND} | Secure Gateway")?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        writeln!(f, "Username: {}", self.username)?;
        writeln!(f, "Password: {}", self.password_mask)?;
        let marker = if self.submit_enabled { "" } else { " (busy)" };
        writeln!(f, "[ {} ]{marker}", self.submit_label)
    }
}

impl fmt::Display for DashboardScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BRAND} | Hybrid Chemical Telemetry")?;
        if let Some(welcome) = &self.welcome {
            writeln!(f, "{welcome}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        writeln!(
            f,
            "[EXPORT PDF{}] [{}{}] [LOGOUT]",
            disabled_marker(self.export_enabled),
            self.upload_label,
            disabled_marker(self.upload_enabled),
        )?;
        writeln!(f)?;

        match &self.body {
            DashboardBody::Empty { message } => writeln!(f, "{message}")?,
            DashboardBody::Loaded(view) => write_dataset(f, view)?,
        }

        writeln!(f)?;
        writeln!(f, "Sync History")?;
        match &self.history {
            HistoryPanel::Empty { message } => writeln!(f, "  {message}"),
            HistoryPanel::Entries(lines) => {
                for line in lines {
                    writeln!(f, "  {} // {}", line.name, line.date)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for BarChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max = self
            .values
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .fold(0.0_f64, f64::max);
        let label_width = self
            .categories
            .iter()
            .map(|label| label.len())
            .max()
            .unwrap_or(0);

        for (label, value) in self.categories.iter().zip(&self.values) {
            writeln!(
                f,
                "  {label:<label_width$} {bar:<width$} {}",
                format_metric(*value),
                bar = "#".repeat(bar_length(*value, max)),
                width = BAR_WIDTH,
            )?;
        }
        Ok(())
    }
}

fn write_dataset(f: &mut fmt::Formatter<'_>, view: &DatasetView) -> fmt::Result {
    let cards: Vec<String> = view
        .cards
        .iter()
        .map(|card| format!("{}: {}", card.title, card.value))
        .collect();
    writeln!(f, "{}", cards.join(" | "))?;

    writeln!(f)?;
    writeln!(f, "Parameter Distribution")?;
    write!(f, "{}", view.chart)?;

    if !view.distribution.is_empty() {
        writeln!(f)?;
        writeln!(f, "Type Distribution")?;
        for (kind, count) in &view.distribution {
            writeln!(f, "  {kind}: {count}")?;
        }
    }

    writeln!(f)?;
    writeln!(f, "Asset Preview")?;
    if view.preview.rows.is_empty() {
        return writeln!(f, "  {}", crate::render::EMPTY_PREVIEW_MESSAGE);
    }
    for row in &view.preview.rows {
        writeln!(f, "  {}", row.join(" | "))?;
    }
    Ok(())
}

fn bar_length(value: f64, max: f64) -> usize {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn disabled_marker(enabled: bool) -> &'static str {
    if enabled { "" } else { " (disabled)" }
}
