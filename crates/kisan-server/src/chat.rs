//! The chat turn: answer, speak, remember.

use crate::history::HistoryStore;
use kisan_types::NewChatRecord;
use kisan_voice::{preview, AnswerGenerator, TtsService, VoiceError};
use std::sync::Arc;
use tracing::Instrument;

/// Input to one chat turn, with request defaults already applied.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub question: String,
    pub language: String,
    pub farmer_id: String,
    pub farmer_name: Option<String>,
}

/// Result of a successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    /// Base64 MP3 of `response`.
    pub audio: String,
    pub farmer_id: String,
    /// Whether the interaction reached the history store.
    pub saved: bool,
}

/// Runs answer generation, synthesis and persistence in order.
#[derive(Clone)]
pub struct ChatPipeline {
    answers: Arc<dyn AnswerGenerator>,
    tts: Arc<TtsService>,
    history: HistoryStore,
}

impl ChatPipeline {
    pub fn new(
        answers: Arc<dyn AnswerGenerator>,
        tts: Arc<TtsService>,
        history: HistoryStore,
    ) -> Self {
        Self {
            answers,
            tts,
            history,
        }
    }

    /// Runs one turn.
    ///
    /// Generation and synthesis failures abort the turn. A persistence
    /// failure is logged and reported through `saved`; the answer and audio
    /// are still returned.
    pub async fn run(&self, turn: ChatTurn) -> Result<ChatOutcome, VoiceError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "chat_turn",
            %request_id,
            farmer_id = %turn.farmer_id,
            language = %turn.language,
        );
        self.run_turn(turn).instrument(span).await
    }

    async fn run_turn(&self, turn: ChatTurn) -> Result<ChatOutcome, VoiceError> {
        tracing::info!(question = %preview(&turn.question, 80), "chat turn started");

        let answer = self
            .answers
            .answer(&turn.question, &turn.language)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "answer generation failed"))?;

        let audio = self
            .tts
            .synthesize(&answer, &turn.language)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "speech synthesis failed"))?;

        let record = NewChatRecord::new(turn.farmer_id.clone(), turn.question, answer.clone())
            .with_farmer_name(turn.farmer_name)
            .with_language(turn.language);

        let saved = match self.history.append(record).await {
            Ok(stored) => {
                tracing::info!(record_id = stored.id, "chat turn saved");
                true
            }
            Err(e) => {
                tracing::warn!(
                    category = e.category(),
                    error = %e,
                    "failed to save chat turn, returning answer anyway"
                );
                false
            }
        };

        Ok(ChatOutcome {
            response: answer,
            audio,
            farmer_id: turn.farmer_id,
            saved,
        })
    }
}
