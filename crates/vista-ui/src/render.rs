//! Pure projection of [`ViewState`] into screen models.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use vista_core::{Dataset, HistoryEntry, format_metric};

use crate::{Phase, ViewState};

/// Text shown for any missing value.
pub const PLACEHOLDER: &str = "N/A";
/// Shown in place of metrics before the first upload.
pub const EMPTY_DATASET_MESSAGE: &str = "Ready for data ingestion.";
/// Shown when the upload returned no rows.
pub const EMPTY_PREVIEW_MESSAGE: &str = "No asset data available";
/// Shown when the history list is empty.
pub const EMPTY_HISTORY_MESSAGE: &str = "No recent activity detected";
/// History name fallback.
pub const UNKNOWN_NAME: &str = "Unknown";
/// History date fallback.
pub const NO_DATE: &str = "No date";
/// Chart categories, in display order.
pub const CHART_CATEGORIES: [&str; 3] = ["Flowrate", "Pressure", "Temp"];

/// Tunables for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum preview table rows.
    pub preview_rows: usize,
    /// Maximum history entries.
    pub history_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            history_limit: 5,
        }
    }
}

/// Top-level screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Credential form.
    Login(LoginScreen),
    /// Authenticated dashboard.
    Dashboard(DashboardScreen),
}

/// Credential form model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginScreen {
    /// Username field contents.
    pub username: String,
    /// Password field rendered as a mask.
    pub password_mask: String,
    /// Submit button label.
    pub submit_label: &'static str,
    /// Whether the submit button is enabled.
    pub submit_enabled: bool,
    /// Message shown above the form.
    pub error: Option<String>,
}

/// Dashboard model.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardScreen {
    /// Greeting line when the username is known.
    pub welcome: Option<String>,
    /// Message shown in the header.
    pub error: Option<String>,
    /// Upload control label.
    pub upload_label: &'static str,
    /// Whether the upload control is enabled.
    pub upload_enabled: bool,
    /// Whether the report export control is enabled.
    pub export_enabled: bool,
    /// Main content area.
    pub body: DashboardBody,
    /// Side panel.
    pub history: HistoryPanel,
}

/// Main content of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardBody {
    /// No dataset loaded yet.
    Empty {
        /// Placeholder text.
        message: &'static str,
    },
    /// A dataset is loaded.
    Loaded(Box<DatasetView>),
}

/// Everything derived from one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetView {
    /// Metric cards, left to right.
    pub cards: Vec<MetricCard>,
    /// Parameter distribution chart.
    pub chart: BarChart,
    /// Equipment count per type, most common first.
    pub distribution: Vec<(String, u64)>,
    /// Leading rows.
    pub preview: PreviewTable,
}

/// One metric card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCard {
    /// Card title.
    pub title: &'static str,
    /// Rendered value, [`PLACEHOLDER`] when missing.
    pub value: String,
}

/// Bar chart input for a chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    /// Category labels.
    pub categories: Vec<&'static str>,
    /// One value per category; missing values are `0`.
    pub values: Vec<f64>,
}

/// Row preview table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTable {
    /// `[equipment name, type, flowrate]` per row.
    pub rows: Vec<[String; 3]>,
}

/// History side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryPanel {
    /// No entries.
    Empty {
        /// Placeholder text.
        message: &'static str,
    },
    /// Entries in server order.
    Entries(Vec<HistoryLine>),
}

/// One rendered history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLine {
    /// File name or [`UNKNOWN_NAME`].
    pub name: String,
    /// Formatted date or [`NO_DATE`].
    pub date: String,
}

/// Renders `state`. Pure: equal inputs always produce equal screens.
pub fn render(state: &ViewState, options: &RenderOptions) -> Screen {
    if !state.is_authenticated() {
        return Screen::Login(render_login(state));
    }

    Screen::Dashboard(DashboardScreen {
        welcome: state.username().map(|name| format!("Welcome {name}")),
        error: state.error().map(str::to_string),
        upload_label: if state.phase() == Phase::Uploading {
            "ANALYZING..."
        } else {
            "UPLOAD CSV"
        },
        upload_enabled: state.can_upload(),
        export_enabled: state.can_export_report(),
        body: match state.dataset() {
            Some(dataset) => DashboardBody::Loaded(Box::new(render_dataset(dataset, options))),
            None => DashboardBody::Empty {
                message: EMPTY_DATASET_MESSAGE,
            },
        },
        history: render_history(state.history(), options.history_limit),
    })
}

fn render_login(state: &ViewState) -> LoginScreen {
    let authenticating = state.phase() == Phase::Authenticating;
    LoginScreen {
        username: state.credentials().username.clone(),
        password_mask: "*".repeat(state.credentials().password.chars().count()),
        submit_label: if authenticating {
            "Verifying..."
        } else {
            "Initialize Session"
        },
        submit_enabled: !state.loading(),
        error: state.error().map(str::to_string),
    }
}

fn render_dataset(dataset: &Dataset, options: &RenderOptions) -> DatasetView {
    let averages = dataset.averages;
    let cards = vec![
        MetricCard {
            title: "Total Items",
            value: dataset
                .total_count
                .map_or_else(|| PLACEHOLDER.to_string(), |count| count.to_string()),
        },
        MetricCard {
            title: "Avg Pressure",
            value: with_unit(averages.avg_pressure, "PSI"),
        },
        MetricCard {
            title: "Mean Temp",
            value: with_unit(averages.avg_temp, "°C"),
        },
    ];

    let chart = BarChart {
        categories: CHART_CATEGORIES.to_vec(),
        values: [
            averages.avg_flowrate,
            averages.avg_pressure,
            averages.avg_temp,
        ]
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect(),
    };

    let mut distribution: Vec<(String, u64)> = dataset
        .distribution
        .iter()
        .map(|(kind, count)| (kind.clone(), *count))
        .collect();
    distribution.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

    let preview = PreviewTable {
        rows: dataset
            .preview(options.preview_rows)
            .iter()
            .map(|row| {
                [row.equipment_name(), row.equipment_type(), row.flowrate()]
                    .map(|cell| cell.unwrap_or_else(|| PLACEHOLDER.to_string()))
            })
            .collect(),
    };

    DatasetView {
        cards,
        chart,
        distribution,
        preview,
    }
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(
        || PLACEHOLDER.to_string(),
        |value| format!("{} {unit}", format_metric(value)),
    )
}

fn render_history(entries: &[HistoryEntry], limit: usize) -> HistoryPanel {
    if entries.is_empty() {
        return HistoryPanel::Empty {
            message: EMPTY_HISTORY_MESSAGE,
        };
    }

    HistoryPanel::Entries(
        entries
            .iter()
            .take(limit)
            .map(|entry| HistoryLine {
                name: entry
                    .name
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(UNKNOWN_NAME)
                    .to_string(),
                date: entry
                    .date
                    .as_deref()
                    .filter(|date| !date.trim().is_empty())
                    .map_or_else(|| NO_DATE.to_string(), format_history_date),
            })
            .collect(),
    )
}

/// Formats an RFC 3339 timestamp as `Mon DD, YYYY HH:MM`; anything else is
/// returned verbatim.
pub fn format_history_date(raw: &str) -> String {
    let format = format_description!("[month repr:short] [day], [year] [hour]:[minute]");
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .ok()
        .and_then(|parsed| parsed.format(&format).ok())
        .unwrap_or_else(|| raw.to_string())
}
