use chrono::NaiveDate;
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

use crate::models::chat::{ ChatEntry, Role };
use crate::models::plan::{ non_empty, Reference, TripPlanResponse };

const DATE_FORMAT: &str = "%a %b %d %Y";
const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Ideas,
    Timeline,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseViewModeError {
    message: String,
}

impl fmt::Display for ParseViewModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseViewModeError {}

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ideas" => Ok(ViewMode::Ideas),
            "timeline" => Ok(ViewMode::Timeline),
            _ =>
                Err(ParseViewModeError {
                    message: format!("Invalid view mode: '{}'", s),
                }),
        }
    }
}

/// One card or timeline row, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub title: String,
    pub body: String,
    pub time: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

pub fn render_items(response: &TripPlanResponse, mode: ViewMode) -> Vec<DisplayItem> {
    match mode {
        ViewMode::Ideas =>
            response.ideas
                .iter()
                .map(|idea| DisplayItem {
                    title: idea.title.clone(),
                    body: idea.description.clone(),
                    time: None,
                    image: non_empty(&idea.image).map(str::to_string),
                    link: non_empty(&idea.link).map(str::to_string),
                })
                .collect(),
        ViewMode::Timeline =>
            response.timeline
                .iter()
                .map(|day| DisplayItem {
                    title: day.title.clone(),
                    body: day.details.clone(),
                    time: non_empty(&day.time).map(str::to_string),
                    image: non_empty(&day.image).map(str::to_string),
                    link: non_empty(&day.link).map(str::to_string),
                })
                .collect(),
    }
}

/// Label for the date picker.
pub fn format_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => {
            let millis = (end - start).num_milliseconds() as f64;
            let days = (millis / MS_PER_DAY).round() as i64 + 1;
            format!(
                "{} → {} ({} days)",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT),
                days
            )
        }
        (Some(start), None) => format!("{} → …", start.format(DATE_FORMAT)),
        _ => "Select date".to_string(),
    }
}

pub fn render_item(item: &DisplayItem) -> String {
    let mut out = String::new();
    if let Some(time) = &item.time {
        out.push_str(&format!("  [{}]\n", time));
    }
    out.push_str(&format!("  {}\n", item.title));
    if !item.body.is_empty() {
        out.push_str(&format!("    {}\n", item.body));
    }
    if let Some(image) = &item.image {
        out.push_str(&format!("    image: {}\n", image));
    }
    if let Some(link) = &item.link {
        out.push_str(&format!("    Open Link → {}\n", link));
    }
    out
}

pub fn render_references(references: &[Reference]) -> String {
    let mut out = String::new();
    for reference in references {
        let title = non_empty(&reference.title).unwrap_or("Reference");
        match non_empty(&reference.url) {
            Some(url) => out.push_str(&format!("  - {} {}\n", title, url)),
            None => out.push_str(&format!("  - {}\n", title)),
        }
        if let Some(snippet) = non_empty(&reference.snippet) {
            out.push_str(&format!("    {}\n", snippet));
        }
    }
    out
}

pub fn render_chat_entry(entry: &ChatEntry) -> String {
    match entry.role {
        Role::User => format!("You: {}\n", entry.text),
        Role::Assistant => {
            let mut out = format!("Planner: {}\n", entry.text);
            out.push_str(&render_references(&entry.references));
            out
        }
    }
}

/// Full text rendering of a form-style result.
pub fn render_plan(response: &TripPlanResponse, mode: ViewMode) -> String {
    let items = render_items(response, mode);
    let mut out = String::new();

    if let Some(destination) = non_empty(&response.destination) {
        match mode {
            ViewMode::Timeline =>
                out.push_str(&format!("{}-day plan for {}\n", items.len(), destination)),
            ViewMode::Ideas => out.push_str(&format!("Ideas for {}\n", destination)),
        }
    }
    if items.is_empty() {
        out.push_str("  (nothing to show)\n");
    }
    for item in &items {
        out.push_str(&render_item(item));
    }
    if let Some(notes) = non_empty(&response.notes) {
        out.push_str(&format!("{}\n", notes));
    }
    out
}
