//! Natural-language commentary on the class distribution.
//!
//! `InsightPanel` decides when a new summary is needed and which completion
//! is allowed to land; `GeminiClient` talks to the Gemini REST API.

use crate::errors::InsightError;
use crate::models::{InsightView, Student};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const INITIAL_TEXT: &str = "Đang phân tích dữ liệu...";
pub const EMPTY_TEXT: &str = "Vui lòng thêm học sinh để nhận phân tích từ AI.";
pub const NO_ANALYSIS_TEXT: &str = "Không có dữ liệu phân tích.";
pub const ERROR_TEXT: &str = "Có lỗi xảy ra khi kết nối với AI. Vui lòng thử lại sau.";

pub fn build_prompt(students: &[Student]) -> String {
    let listing = students
        .iter()
        .map(|student| format!("{} - {}", student.full_name, student.class_name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Bạn là một trợ lý quản lý giáo dục. Dưới đây là danh sách học sinh: [{listing}]. \
         Hãy tóm tắt nhanh về phân bổ học sinh theo lớp và đưa ra một vài nhận xét ngắn gọn \
         về cấu trúc lớp học (Ví dụ: lớp nào đông nhất, tổng số lượng). \
         Trả lời bằng tiếng Việt, súc tích trong 3-4 câu."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightTicket {
    pub seq: u64,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightStep {
    /// Record count unchanged since the last request.
    Unchanged,
    /// Empty collection; placeholder shown without a network call.
    Placeholder,
    Generate(InsightTicket),
}

#[derive(Debug, Clone)]
pub struct InsightPanel {
    text: String,
    generating: bool,
    requested_for: Option<usize>,
    latest: u64,
}

impl Default for InsightPanel {
    fn default() -> Self {
        Self {
            text: INITIAL_TEXT.to_string(),
            generating: false,
            requested_for: None,
            latest: 0,
        }
    }
}

impl InsightPanel {
    /// Starts a new summary when the record count moved. Any request still
    /// in flight becomes stale.
    pub fn request(&mut self, students: &[Student]) -> InsightStep {
        let count = students.len();
        if self.requested_for == Some(count) {
            return InsightStep::Unchanged;
        }

        self.requested_for = Some(count);
        self.latest += 1;

        if count == 0 {
            self.generating = false;
            self.text = EMPTY_TEXT.to_string();
            return InsightStep::Placeholder;
        }

        self.generating = true;
        InsightStep::Generate(InsightTicket {
            seq: self.latest,
            prompt: build_prompt(students),
        })
    }

    /// Applies a finished request. Returns `false` when a newer request has
    /// superseded it and the result was dropped.
    pub fn complete(&mut self, seq: u64, result: Result<String, InsightError>) -> bool {
        if seq != self.latest {
            return false;
        }

        self.generating = false;
        self.text = match result {
            Ok(text) if text.trim().is_empty() => NO_ANALYSIS_TEXT.to_string(),
            Ok(text) => text,
            Err(_) => ERROR_TEXT.to_string(),
        };
        true
    }

    pub fn view(&self) -> InsightView {
        InsightView {
            generating: self.generating,
            text: self.text.clone(),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
        let api_key = self.api_key.as_deref().ok_or(InsightError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status,
                message: error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(extract_text(parsed))
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Joins the text parts of the first candidate; empty when there are none.
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students(n: usize) -> Vec<Student> {
        (0..n)
            .map(|i| Student {
                id: i.to_string(),
                full_name: format!("HS {i}"),
                class_name: if i % 2 == 0 { "10A".into() } else { "10B".into() },
                birth_date: "2010-01-01".into(),
                created_at: "2026-01-01T00:00:00.000Z".into(),
            })
            .collect()
    }

    #[test]
    fn prompt_lists_name_class_pairs() {
        let prompt = build_prompt(&students(2));
        assert!(prompt.contains("[HS 0 - 10A, HS 1 - 10B]"));
        assert!(prompt.contains("3-4 câu"));
    }

    #[test]
    fn empty_collection_short_circuits() {
        let mut panel = InsightPanel::default();
        assert_eq!(panel.request(&[]), InsightStep::Placeholder);
        let view = panel.view();
        assert!(!view.generating);
        assert_eq!(view.text, EMPTY_TEXT);
        assert_eq!(panel.request(&[]), InsightStep::Unchanged);
    }

    #[test]
    fn only_count_changes_trigger_requests() {
        let mut panel = InsightPanel::default();
        let InsightStep::Generate(ticket) = panel.request(&students(3)) else {
            panic!("expected a request");
        };
        assert!(panel.view().generating);
        assert_eq!(panel.request(&students(3)), InsightStep::Unchanged);

        assert!(panel.complete(ticket.seq, Ok("Ba học sinh.".into())));
        let view = panel.view();
        assert!(!view.generating);
        assert_eq!(view.text, "Ba học sinh.");
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut panel = InsightPanel::default();
        let InsightStep::Generate(first) = panel.request(&students(1)) else {
            panic!("expected a request");
        };
        let InsightStep::Generate(second) = panel.request(&students(2)) else {
            panic!("expected a request");
        };

        assert!(panel.complete(second.seq, Ok("newest".into())));
        assert!(!panel.complete(first.seq, Ok("older".into())));
        assert_eq!(panel.view().text, "newest");
    }

    #[test]
    fn failures_and_blank_answers_use_fixed_text() {
        let mut panel = InsightPanel::default();
        let InsightStep::Generate(ticket) = panel.request(&students(1)) else {
            panic!("expected a request");
        };
        panel.complete(ticket.seq, Err(InsightError::MissingApiKey));
        assert_eq!(panel.view().text, ERROR_TEXT);

        let InsightStep::Generate(ticket) = panel.request(&students(2)) else {
            panic!("expected a request");
        };
        panel.complete(ticket.seq, Ok("  ".into()));
        assert_eq!(panel.view().text, NO_ANALYSIS_TEXT);
    }

    #[test]
    fn response_text_parts_are_joined() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Lớp 10A " }, { "text": "đông nhất." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(parsed), "Lớp 10A đông nhất.");

        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extract_text(parsed), "");
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid");
        assert_eq!(error_message("plain"), "plain");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new(Client::new(), None, "m", "http://127.0.0.1:9");
        assert!(matches!(
            client.generate("hi").await,
            Err(InsightError::MissingApiKey)
        ));
    }
}
