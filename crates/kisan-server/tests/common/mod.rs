//! Shared fixtures: in-process providers and a router on a temp database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kisan_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use kisan_server::{app, AppState, CredentialStatus};
use kisan_voice::{
    AnswerGenerator, RecognitionRequest, RecognitionResponse, SpeechRecognizer,
    SpeechSynthesizer, SttService, SynthesisRequest, TtsService, VoiceError,
};
use kisan_voice::stt::{RecognitionAlternative, RecognitionResult};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const FAKE_MP3: &str = "SUQzBAAAAAAAI1RTU0UAAAAPAAADTGF2ZjU4";

/// Answers every question with a fixed prefix, or fails.
#[derive(Default)]
pub struct ScriptedAnswers {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl AnswerGenerator for ScriptedAnswers {
    async fn answer(&self, question: &str, language: &str) -> Result<String, VoiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VoiceError::Llm("provider returned 503 Service Unavailable".to_string()));
        }
        Ok(format!("[{language}] answer to: {question}"))
    }
}

/// Returns fixed audio and records the voice each call used.
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub fail: bool,
    pub voices: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    pub fn calls(&self) -> usize {
        self.voices.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, VoiceError> {
        self.voices.lock().unwrap().push(request.voice.name.to_string());
        if self.fail {
            return Err(VoiceError::Tts("request timed out after 30 seconds".to_string()));
        }
        Ok(FAKE_MP3.to_string())
    }
}

/// Transcribes everything to the same sentence.
pub struct FixedRecognizer {
    pub configured: bool,
    pub calls: AtomicUsize,
}

impl Default for FixedRecognizer {
    fn default() -> Self {
        Self {
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    fn ensure_configured(&self) -> Result<(), VoiceError> {
        if self.configured {
            Ok(())
        } else {
            Err(VoiceError::MissingCredential("GOOGLE_STT_API_KEY"))
        }
    }

    async fn recognize(
        &self,
        _request: &RecognitionRequest<'_>,
    ) -> Result<RecognitionResponse, VoiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RecognitionResponse {
            results: vec![RecognitionResult {
                alternatives: vec![RecognitionAlternative {
                    transcript: "dhan mein kaun si khad daalein".to_string(),
                    confidence: Some(0.91),
                }],
            }],
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub answers: Arc<ScriptedAnswers>,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub recognizer: Arc<FixedRecognizer>,
    _dir: TempDir,
}

pub struct TestAppBuilder {
    migrate: bool,
    answers: ScriptedAnswers,
    synthesizer: RecordingSynthesizer,
    recognizer: FixedRecognizer,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            migrate: true,
            answers: ScriptedAnswers::default(),
            synthesizer: RecordingSynthesizer::default(),
            recognizer: FixedRecognizer::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub fn stored_rows(&self) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM chat_history", [], |row| row.get(0))
            .unwrap_or(0)
    }
}

impl TestAppBuilder {
    /// Leaves the schema out so every history write fails.
    pub fn without_schema(mut self) -> Self {
        self.migrate = false;
        self
    }

    pub fn failing_answers(mut self) -> Self {
        self.answers.fail = true;
        self
    }

    pub fn failing_synthesis(mut self) -> Self {
        self.synthesizer.fail = true;
        self
    }

    pub fn unconfigured_recognizer(mut self) -> Self {
        self.recognizer.configured = false;
        self
    }

    pub fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("kisan.db");
        let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
        if self.migrate {
            run_migrations(&pool.get().unwrap()).unwrap();
        }

        let answers = Arc::new(self.answers);
        let synthesizer = Arc::new(self.synthesizer);
        let recognizer = Arc::new(self.recognizer);

        let state = AppState::new(
            pool.clone(),
            Arc::new(SttService::new(recognizer.clone())),
            Arc::new(TtsService::new(synthesizer.clone())),
            answers.clone(),
            CredentialStatus {
                google_stt: recognizer.configured,
                google_tts: true,
            },
        );

        TestApp {
            router: app(state),
            pool,
            answers,
            synthesizer,
            recognizer,
            _dir: dir,
        }
    }
}
