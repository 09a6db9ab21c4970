use serde::{Deserialize, Serialize};

/// A job posting as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub job_level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_link: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Job {
    /// The subset of the posting the question and feedback services are keyed on
    pub fn context(&self) -> JobContext {
        JobContext {
            title: self.title.clone(),
            description: self.description.clone(),
            skills: self.skills.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
}

/// One page of search results; `total` is the server's count for the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionsRequest<'a> {
    pub job: &'a JobContext,
}

#[derive(Debug, Serialize)]
pub struct FeedbackRequest<'a> {
    pub job: &'a JobContext,
    pub questions: &'a [QuestionAnswer],
}

// Response bodies are parsed leniently so that a missing field is reported
// as a shape failure instead of a serde error.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub jobs: Option<Vec<Job>>,
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job_title: Option<String>,
    pub questions: Option<Vec<String>>,
    #[serde(default)]
    pub tech_skills: Vec<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedbackResponse {
    #[serde(default)]
    pub success: bool,
    pub feedback: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Question,
    Answer,
    Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl ChatMessage {
    pub fn question(index: usize, content: impl Into<String>) -> Self {
        Self {
            id: format!("question-{}", index),
            content: content.into(),
            kind: MessageKind::Question,
        }
    }

    pub fn answer(index: usize, content: impl Into<String>) -> Self {
        Self {
            id: format!("answer-{}", index),
            content: content.into(),
            kind: MessageKind::Answer,
        }
    }

    pub fn feedback(index: usize, content: impl Into<String>) -> Self {
        Self {
            id: format!("feedback-{}", index),
            content: content.into(),
            kind: MessageKind::Feedback,
        }
    }
}
