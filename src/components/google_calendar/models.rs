/// Simplified calendar event representation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
}

impl CalendarEvent {
    /// Build an event from one item of an events list response
    pub fn from_item(item: &serde_json::Value) -> Self {
        let id = item
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or("")
            .to_string();
        let summary = item
            .get("summary")
            .and_then(|s| s.as_str())
            .map(|s| s.to_string());

        let start_date_time = item
            .get("start")
            .and_then(|start| start.get("dateTime"))
            .and_then(|dt| dt.as_str())
            .map(|s| s.to_string());

        let start_date = item
            .get("start")
            .and_then(|start| start.get("date"))
            .and_then(|d| d.as_str())
            .map(|s| s.to_string());

        CalendarEvent {
            id,
            summary,
            start_date_time,
            start_date,
        }
    }

    /// Display title, with a placeholder for untitled events
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("No Title")
    }
}
