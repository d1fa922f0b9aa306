use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub class_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub birth_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: String,
}

impl Student {
    /// Finishes a draft with a fresh id and a creation timestamp.
    pub fn from_draft(draft: StudentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name: draft.full_name,
            class_name: draft.class_name,
            birth_date: draft.birth_date,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub birth_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Entry,
    List,
    Analytics,
    Settings,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Entry => "entry",
            View::List => "list",
            View::Analytics => "analytics",
            View::Settings => "settings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "entry" => Some(View::Entry),
            "list" => Some(View::List),
            "analytics" => Some(View::Analytics),
            "settings" => Some(View::Settings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub google_script_url: String,
}

impl SheetConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            google_script_url: url.into(),
        }
    }

    /// The endpoint, or `None` when remote sync is disabled.
    pub fn endpoint(&self) -> Option<&str> {
        let url = self.google_script_url.trim();
        if url.is_empty() { None } else { Some(url) }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub loading: bool,
    pub view: View,
    pub student_count: usize,
    pub endpoint_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub visible: usize,
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: usize,
    pub class_count: usize,
    pub average: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightView {
    pub generating: bool,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub summary: StatsSummary,
    pub classes: Vec<ClassCount>,
    pub insight: InsightView,
}

/// Spreadsheet cells come back typed, so a class like `10` or a date cell
/// may arrive as a number. Anything scalar is accepted as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected a scalar, got {other}"))),
    }
}
