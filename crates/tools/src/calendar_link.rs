//! Calendar link tool: builds a Google Calendar event template URL.
//!
//! The tool never talks to the calendar service; the learner opens the
//! link to save the event.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use parley_core::error::ToolError;
use parley_core::tool::Tool;
use serde::Deserialize;

/// Start formats, tried in order.
const START_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const CALENDAR_URL: &str = "https://calendar.google.com/calendar/render";

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "startDateTime", alias = "start_datetime")]
    start_datetime_str: Option<String>,
    #[serde(default, alias = "durationMinutes", alias = "duration")]
    duration_minutes: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
}

pub struct CalendarLinkTool {
    offset: FixedOffset,
}

impl CalendarLinkTool {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    fn parse_start(&self, raw: &str) -> Result<DateTime<Utc>, ToolError> {
        let raw = raw.trim();
        let naive = START_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!(
                    "could not understand start time '{raw}'. Use a format like '2025-12-25 10:00' or '25/12/2025 10:00'"
                ))
            })?;

        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| ToolError::InvalidArguments(format!("start time '{raw}' is out of range")))
    }
}

/// Strip code fences and quoting the model sometimes wraps around JSON.
fn unwrap_payload(input: &str) -> &str {
    let mut text = input.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
        text = text.strip_suffix("```").unwrap_or(text);
    }
    text.trim().trim_matches('\'').trim()
}

fn required(value: Option<String>, field: &str) -> Result<String, ToolError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required field '{field}'")))
}

/// `30.0` counts as thirty minutes, `30.5` does not.
fn whole_minutes(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

fn parse_duration(value: Option<serde_json::Value>) -> Result<i64, ToolError> {
    let minutes = match value {
        None | Some(serde_json::Value::Null) => return Ok(60),
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole_minutes)),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_minutes))
        }
        Some(_) => None,
    };
    match minutes {
        Some(m) if m > 0 => Ok(m),
        _ => Err(ToolError::InvalidArguments(
            "duration_minutes must be a positive whole number".into(),
        )),
    }
}

fn compact_utc(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

#[async_trait]
impl Tool for CalendarLinkTool {
    fn name(&self) -> &str {
        "Calendar Link"
    }

    fn description(&self) -> &str {
        "Create a Google Calendar link for a study or practice session. Input: JSON with \
         \"title\", \"start_datetime_str\" (e.g. \"2025-12-25 10:00\", local time), optional \
         \"duration_minutes\" (default 60) and optional \"description\"."
    }

    async fn try_invoke(&self, input: &str) -> Result<String, ToolError> {
        let payload: EventPayload = serde_json::from_str(unwrap_payload(input)).map_err(|e| {
            ToolError::InvalidArguments(format!("input must be a JSON object ({e})"))
        })?;

        let title = required(payload.title, "title")?;
        let start_raw = required(payload.start_datetime_str, "start_datetime_str")?;
        let minutes = parse_duration(payload.duration_minutes)?;
        let description = payload.description.unwrap_or_default();

        let start = self.parse_start(&start_raw)?;
        let end = Duration::try_minutes(minutes)
            .and_then(|d| start.checked_add_signed(d))
            .ok_or_else(|| ToolError::InvalidArguments(format!("duration of {minutes} minutes is too long")))?;

        let url = format!(
            "{CALENDAR_URL}?action=TEMPLATE&text={}&dates={}/{}&details={}",
            urlencoding::encode(&title),
            compact_utc(start),
            compact_utc(end),
            urlencoding::encode(&description),
        );

        tracing::debug!(title = %title, %start, minutes, "Built calendar link");
        Ok(format!("Here is the calendar link for '{title}': {url}"))
    }
}
