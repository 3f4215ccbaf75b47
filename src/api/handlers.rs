use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use tracing::warn;

use crate::page;
use crate::submission::{self, FailureKind, Outcome};
use crate::AppState;

use super::models::{AskRequest, AskResponse, ErrorResponse, GoalForm, HealthResponse};

pub async fn index(State(state): State<AppState>) -> Response {
    match state {
        AppState::Ready(_) => Html(page::form("", None)).into_response(),
        AppState::Halted(error) => halted_page(&Outcome::configuration(error)),
    }
}

pub async fn submit_form(State(state): State<AppState>, Form(form): Form<GoalForm>) -> Response {
    let model = match state {
        AppState::Ready(model) => model,
        AppState::Halted(error) => {
            warn!("submission rejected: service is halted");
            return halted_page(&Outcome::configuration(error));
        }
    };

    let outcome = submission::submit(model.as_ref(), &form.goal).await;
    let status = match &outcome {
        Outcome::Failed { kind, .. } => failure_status(*kind),
        Outcome::Warning(_) | Outcome::Answer(_) => StatusCode::OK,
    };

    (status, Html(page::form(&form.goal, Some(&outcome)))).into_response()
}

pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorResponse>)> {
    let model = match state {
        AppState::Ready(model) => model,
        AppState::Halted(error) => {
            return Err(error_response(&Outcome::configuration(error)));
        }
    };

    match submission::submit(model.as_ref(), &payload.prompt).await {
        Outcome::Answer(answer) => Ok(Json(AskResponse {
            answer,
            model: model.model_name().to_string(),
        })),
        outcome => Err(error_response(&outcome)),
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state {
        AppState::Ready(model) => Json(HealthResponse {
            status: "ok",
            model: Some(model.model_name().to_string()),
        })
        .into_response(),
        AppState::Halted(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "halted",
                model: None,
            }),
        )
            .into_response(),
    }
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "route not found".to_string(),
        }),
    )
        .into_response()
}

fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Request => StatusCode::BAD_GATEWAY,
    }
}

fn halted_page(outcome: &Outcome) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(page::halted(outcome.message())),
    )
        .into_response()
}

fn error_response(outcome: &Outcome) -> (StatusCode, Json<ErrorResponse>) {
    let status = match outcome {
        Outcome::Failed { kind, .. } => failure_status(*kind),
        Outcome::Warning(_) | Outcome::Answer(_) => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: outcome.message().to_string(),
        }),
    )
}
