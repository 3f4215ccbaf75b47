//! One prompt-submission cycle: validate the user's text, frame it with the
//! trainer persona, ask the model once, and report what happened.

use tracing::{info, warn};

use crate::gemini::TextModel;

/// Prepended to every submission before it reaches the model.
pub const PERSONA_PREFIX: &str = "Act as a FitFocus trainer and create a workout for: ";

pub const EMPTY_INPUT_WARNING: &str = "Please type your goal first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    Request,
}

/// What a submission produced, ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Warning(String),
    Answer(String),
    Failed { kind: FailureKind, message: String },
}

impl Outcome {
    pub fn configuration(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            kind: FailureKind::Configuration,
            message: format!("Configuration error: {error}"),
        }
    }

    pub fn request(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            kind: FailureKind::Request,
            message: format!("Connection error: {error}"),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Warning(text) | Self::Answer(text) => text,
            Self::Failed { message, .. } => message,
        }
    }
}

/// Free-form text captured when the button was pressed.
#[derive(Debug)]
pub struct Submission<'a> {
    text: &'a str,
}

impl<'a> Submission<'a> {
    /// Returns `None` for empty or whitespace-only input. Accepted text is
    /// kept as typed.
    pub fn parse(raw: &'a str) -> Option<Self> {
        (!raw.trim().is_empty()).then_some(Self { text: raw })
    }

    pub fn prompt(&self) -> String {
        format!("{PERSONA_PREFIX}{}", self.text)
    }
}

pub async fn submit(model: &dyn TextModel, raw: &str) -> Outcome {
    let Some(submission) = Submission::parse(raw) else {
        return Outcome::Warning(EMPTY_INPUT_WARNING.to_string());
    };

    match model.generate(&submission.prompt()).await {
        Ok(answer) => {
            info!(
                model = model.model_name(),
                chars = answer.len(),
                "workout generated"
            );
            Outcome::Answer(answer)
        }
        Err(error) => {
            warn!(model = model.model_name(), %error, "workout request failed");
            Outcome::request(error)
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use crate::gemini::{ModelError, TextModel};

    /// Records prompts and replays a canned reply.
    pub struct FakeModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        pub fn answering(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextModel for FakeModel {
        fn model_name(&self) -> &str {
            "fake-flash"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|message| ModelError::Api {
                status: StatusCode::NOT_FOUND,
                message,
            })
        }
    }
}
