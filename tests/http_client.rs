use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use jobsim::core::config::ApiConfig;
use jobsim::core::{JobContext, QuestionAnswer, SearchParams};
use jobsim::utils::tui_writer::{LogLevel, TuiWriter};
use jobsim::{JobApiClient, JobBackend};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn record(&self, route: &str, headers: &HeaderMap, body: Value) {
        self.bodies.lock().unwrap().push((route.to_string(), body));
        if let Some(content_type) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
            self.content_types
                .lock()
                .unwrap()
                .push(content_type.to_string());
        }
    }
}

async fn jobs_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.record("jobs", &headers, body.clone());
    match body["query"].as_str() {
        Some("explode") => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"}))),
        Some("malformed") => (StatusCode::OK, Json(json!({"results": []}))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "jobs": [
                    {
                        "company": "Leonardo",
                        "title": "Principal Software Engineer",
                        "location": "Basildon, England, United Kingdom",
                        "job_type": "Onsite",
                        "job_level": "Mid senior",
                        "description": "## About Us\n\nLeonardo is a global high-tech company.",
                        "first_seen": "2023-12-25",
                        "job_link": "https://example.com/jobs/1",
                        "skills": ["C++", "C#"]
                    },
                    {
                        "company": "Meta",
                        "title": "Frontend Software Engineer",
                        "location": "London, England, United Kingdom",
                        "job_type": "Hybrid",
                        "job_level": "Mid senior",
                        "description": "Build products used by billions.",
                        "first_seen": "2024-01-02",
                        "skills": ["React"]
                    }
                ],
                "total": 128
            })),
        ),
    }
}

async fn questions_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.record("questions", &headers, body.clone());
    if body["job"]["title"] == "Unlucky" {
        return Json(json!({"success": false, "job_title": "Unlucky", "questions": [], "tech_skills": [], "total": 0}));
    }
    Json(json!({
        "success": true,
        "job_title": body["job"]["title"],
        "questions": ["Q1", "Q2"],
        "tech_skills": ["Python"],
        "total": 2
    }))
}

async fn feedback_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.record("feedback", &headers, body.clone());
    let count = body["questions"].as_array().map(|a| a.len()).unwrap_or(0);
    if count == 0 {
        return Json(json!({"success": true, "job_title": "x"}));
    }
    Json(json!({
        "success": true,
        "feedback": format!("Reviewed {} answer(s)", count),
        "job_title": body["job"]["title"]
    }))
}

async fn spawn_backend() -> (JobApiClient, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/jobs", post(jobs_handler))
        .route("/api/questions", post(questions_handler))
        .route("/api/feedback", post(feedback_handler))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = ApiConfig {
        base_url: format!("http://{}/api", addr),
        ..Default::default()
    };
    (JobApiClient::new(&api).unwrap(), recorded)
}

fn context(title: &str) -> JobContext {
    JobContext {
        title: title.to_string(),
        description: "Data role".to_string(),
        skills: vec!["Python".to_string()],
    }
}

#[tokio::test]
async fn test_search_sends_expected_body_and_keeps_server_total() {
    let (client, recorded) = spawn_backend().await;

    let page = client
        .search_jobs(&SearchParams {
            query: "data scientist".to_string(),
            limit: Some(5),
            tech_skills: None,
            job_level: Some("Senior".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(page.jobs.len(), 2);
    assert_eq!(page.total, 128);
    assert_eq!(page.jobs[0].job_link.as_deref(), Some("https://example.com/jobs/1"));
    assert!(page.jobs[1].job_link.is_none());

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(
        bodies[0],
        (
            "jobs".to_string(),
            json!({"query": "data scientist", "limit": 5, "job_level": "Senior"})
        )
    );
    assert_eq!(recorded.content_types.lock().unwrap()[0], "application/json");
}

#[tokio::test]
async fn test_search_http_error_is_reported() {
    let (client, _) = spawn_backend().await;

    let err = client
        .search_jobs(&SearchParams {
            query: "explode".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_search_http_error_logs_one_error() {
    let (writer, mut log_rx) = TuiWriter::new();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(writer)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (client, _) = spawn_backend().await;
    let _ = client
        .search_jobs(&SearchParams {
            query: "explode".to_string(),
            ..Default::default()
        })
        .await;

    let mut errors = Vec::new();
    while let Ok(entry) = log_rx.try_recv() {
        if entry.level == LogLevel::Error {
            errors.push(entry.message);
        }
    }
    assert_eq!(errors.len(), 1, "errors logged: {:?}", errors);
    assert!(errors[0].contains("500"));
}

#[tokio::test]
async fn test_search_without_jobs_array_is_invalid() {
    let (client, _) = spawn_backend().await;

    let err = client
        .search_jobs(&SearchParams {
            query: "malformed".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid response format"));
}

#[tokio::test]
async fn test_questions_roundtrip() {
    let (client, recorded) = spawn_backend().await;

    let questions = client
        .get_interview_questions(&context("Data Scientist"))
        .await
        .unwrap();
    assert_eq!(questions, vec!["Q1", "Q2"]);

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(
        bodies[0].1,
        json!({"job": {"title": "Data Scientist", "description": "Data role", "skills": ["Python"]}})
    );
}

#[tokio::test]
async fn test_questions_unsuccessful_is_error() {
    let (client, _) = spawn_backend().await;

    assert!(client
        .get_interview_questions(&context("Unlucky"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_feedback_carries_all_pairs() {
    let (client, recorded) = spawn_backend().await;
    let pairs = vec![
        QuestionAnswer {
            question: "Q1".to_string(),
            answer: "A1".to_string(),
        },
        QuestionAnswer {
            question: "Q2".to_string(),
            answer: "A2".to_string(),
        },
    ];

    let feedback = client
        .get_feedback(&context("Data Scientist"), &pairs)
        .await
        .unwrap();
    assert_eq!(feedback, "Reviewed 2 answer(s)");

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(
        bodies[0].1["questions"],
        json!([{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}])
    );
}

#[tokio::test]
async fn test_feedback_missing_text_is_error() {
    let (client, _) = spawn_backend().await;

    assert!(client
        .get_feedback(&context("Data Scientist"), &[])
        .await
        .is_err());
}

#[tokio::test]
async fn test_unreachable_backend_is_error() {
    let api = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    };
    let client = JobApiClient::new(&api).unwrap();

    assert!(client
        .search_jobs(&SearchParams {
            query: "rust".to_string(),
            ..Default::default()
        })
        .await
        .is_err());
}
