//! Integration tests for the HTTP surface.
//!
//! Each test spins up an Axum server on a random port backed by a stub LLM
//! and an in-memory chat store, then drives it with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use talent_scout::api::{self, AppServices};
use talent_scout::documents::{DocumentParser, ParserConfig, PlainTextExtractor};
use talent_scout::error::LlmError;
use talent_scout::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use talent_scout::screening::{OrchestratorConfig, ScreeningOrchestrator};
use talent_scout::store::LibSqlBackend;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stub LLM that answers according to which prompt it receives.
#[derive(Default)]
struct StubLlm {
    down: AtomicBool,
}

impl StubLlm {
    fn reply_for(prompt: &str) -> String {
        if prompt.contains("extract candidate information") {
            json!({
                "full_name": "Sam Lee",
                "email": "sam@example.com",
                "phone": "555-0100",
                "years_of_experience": 5,
                "desired_position": "Backend Engineer",
                "current_location": "Austin, TX",
                "tech_stack": ["Rust"]
            })
            .to_string()
        } else if prompt.contains("technical interviewer") {
            r#"{"Rust": ["Explain ownership.", "What does Send mean?"]}"#.to_string()
        } else if prompt.contains("Resume Text:") {
            r#"{"personal_detail": {"full_name": "Priya Patel"}, "skills": ["Rust", "SQL"]}"#
                .to_string()
        } else if prompt.contains("Job Description Text:") {
            r#"{"job_detail": {"job_position": "SRE", "no_of_openings": "2"}}"#.to_string()
        } else if prompt.contains("Start by greeting") {
            "Hello! I'm the TalentScout hiring assistant.".to_string()
        } else {
            "Thanks for sharing.".to_string()
        }
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(LlmError::RequestFailed {
                provider: "stub".to_string(),
                reason: "upstream unavailable".to_string(),
            });
        }
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CompletionResponse {
            content: Self::reply_for(&prompt),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

/// Start a server on a random port, return (base url, stub).
async fn start_server() -> (String, Arc<StubLlm>) {
    let stub = Arc::new(StubLlm::default());
    let llm: Arc<dyn LlmProvider> = stub.clone();

    let services = AppServices {
        orchestrator: Arc::new(ScreeningOrchestrator::new(
            Arc::clone(&llm),
            OrchestratorConfig::default(),
        )),
        parser: Arc::new(DocumentParser::new(
            llm,
            Arc::new(PlainTextExtractor),
            ParserConfig::default(),
        )),
        store: Arc::new(LibSqlBackend::new_memory().await.unwrap()),
    };
    let app = api::router(services);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), stub)
}

async fn chat(client: &reqwest::Client, base: &str, message: &str, state: Option<&Value>) -> Value {
    let resp = client
        .post(format!("{base}/chat/hiring"))
        .json(&json!({"message": message, "conversation_state": state}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "turn {message:?} failed");
    resp.json().await.unwrap()
}

fn upload(name: &str, text: &str) -> Value {
    json!({"fileName": name, "fileContent": BASE64_STANDARD.encode(text)})
}

#[tokio::test]
async fn status_and_health() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();

        let root: Value = client.get(format!("{base}/")).send().await.unwrap().json().await.unwrap();
        assert_eq!(root["status"], "online");
        assert!(root["endpoints"].as_array().unwrap().contains(&json!("/chat/hiring")));

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_screening_conversation() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();

        let turn = chat(&client, &base, "Hello", None).await;
        assert_eq!(turn["stage"], "info_gathering");
        assert_eq!(turn["conversation_ended"], false);
        assert_eq!(turn["response"], "Hello! I'm the TalentScout hiring assistant.");
        assert_eq!(
            turn["conversation_state"]["conversation_history"].as_array().unwrap().len(),
            2
        );

        let turn = chat(
            &client,
            &base,
            "I'm Sam Lee, sam@example.com, 555-0100, five years as a backend engineer in Austin, mostly Rust",
            Some(&turn["conversation_state"]),
        )
        .await;
        assert_eq!(turn["stage"], "info_gathering");
        assert_eq!(turn["candidate_info"]["full_name"], "Sam Lee");
        assert_eq!(turn["candidate_info"]["tech_stack"], json!(["Rust"]));
        assert_eq!(turn["response"], "Thanks for sharing.");

        let turn = chat(
            &client,
            &base,
            "ready for the questions",
            Some(&turn["conversation_state"]),
        )
        .await;
        assert_eq!(turn["stage"], "tech_questions");
        assert_eq!(turn["tech_questions"]["Rust"].as_array().unwrap().len(), 2);
        assert!(
            turn["response"]
                .as_str()
                .unwrap()
                .starts_with("I've prepared some technical questions for your skills in Rust.")
        );

        let turn = chat(
            &client,
            &base,
            "Ownership means every value has exactly one owner",
            Some(&turn["conversation_state"]),
        )
        .await;
        assert_eq!(turn["stage"], "tech_questions");

        let turn = chat(&client, &base, "bye", Some(&turn["conversation_state"])).await;
        assert_eq!(turn["stage"], "conclusion");
        assert_eq!(turn["conversation_ended"], true);
        assert!(
            turn["response"]
                .as_str()
                .unwrap()
                .starts_with("Thank you for your time, Sam Lee.")
        );
        assert_eq!(
            turn["conversation_state"]["conversation_history"].as_array().unwrap().len(),
            10
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bye_mid_gathering_ends_immediately() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();

        let turn = chat(&client, &base, "Hello", None).await;
        let turn = chat(&client, &base, "bye", Some(&turn["conversation_state"])).await;
        assert_eq!(turn["stage"], "conclusion");
        assert_eq!(turn["conversation_ended"], true);
        assert!(turn["candidate_info"]["email"].is_null());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_snapshot_starts_fresh() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();

        let junk = json!({"stage": "somewhere", "conversation_history": "nope"});
        let turn = chat(&client, &base, "Hello", Some(&junk)).await;
        assert_eq!(turn["stage"], "info_gathering");
        assert_eq!(
            turn["conversation_state"]["conversation_history"].as_array().unwrap().len(),
            2
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/chat/hiring"))
            .json(&json!({"message": "   "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn upstream_outage_is_502() {
    timeout(TEST_TIMEOUT, async {
        let (base, stub) = start_server().await;
        stub.down.store(true, Ordering::SeqCst);

        let resp = reqwest::Client::new()
            .post(format!("{base}/chat/hiring"))
            .json(&json!({"message": "Hello"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = resp.json().await.unwrap();
        assert!(!body["error"].as_str().unwrap().contains("upstream unavailable"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn document_parsing_endpoints() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/parse/resume"))
            .json(&upload("priya.txt", "Priya Patel\nRust, SQL"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let resume: Value = resp.json().await.unwrap();
        assert_eq!(resume["personal_detail"]["full_name"], "Priya Patel");
        assert_eq!(resume["skills"], json!(["Rust", "SQL"]));
        assert_eq!(resume["certifications"], json!([]));

        let resp = client
            .post(format!("{base}/parse/jd"))
            .json(&upload("sre.txt", "Hiring two SREs"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let jd: Value = resp.json().await.unwrap();
        assert_eq!(jd["job_detail"]["no_of_openings"], 2);

        let cases = [
            (upload("photo.png", "x"), StatusCode::BAD_REQUEST),
            (upload("blank.txt", "   "), StatusCode::BAD_REQUEST),
            (upload("cv.pdf", "%PDF-1.7"), StatusCode::NOT_IMPLEMENTED),
            (
                json!({"fileName": "cv.txt", "fileContent": "***"}),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (body, expected) in cases {
            let resp = client
                .post(format!("{base}/parse/resume"))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), expected, "upload {body}");
            let err: Value = resp.json().await.unwrap();
            assert!(err["error"].is_string());
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_history_crud() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let client = reqwest::Client::new();
        let chats = format!("{base}/api/users/user-42/chats");

        let resp = client.post(&chats).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = resp.json().await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 8);
        assert_eq!(created["title"], "New Chat");

        let resp = client
            .put(format!("{chats}/{id}"))
            .json(&json!({
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Welcome!"}
                ],
                "conversation_state": {"stage": "info_gathering"}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let saved: Value = resp.json().await.unwrap();
        assert_eq!(saved["title"], "Hello");

        let listed: Value = client.get(&chats).send().await.unwrap().json().await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());

        let loaded: Value = client
            .get(format!("{chats}/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(loaded["messages"][1]["content"], "Welcome!");
        assert_eq!(loaded["conversation_state"]["stage"], "info_gathering");

        // Other users cannot see it
        let resp = client
            .get(format!("{base}/api/users/someone-else/chats/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = client.delete(format!("{chats}/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = client.get(format!("{chats}/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = client.delete(format!("{chats}/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    })
    .await
    .expect("test timed out");
}
