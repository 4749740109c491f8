//! POST /ask: question in, answer and optional chart out.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{error, info, warn};

use titanic_charts::{plot_requested, ChartKind};
use titanic_common::{is_on_topic, validate_question, ApiError, AskRequest, AskResponse};
use titanic_llm::log_user_query;

use crate::state::SharedState;

pub async fn ask(
    State(state): State<SharedState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let started = Instant::now();
    let Json(req) = payload?;
    let question = validate_question(&req.question)?;

    if !is_on_topic(&question) {
        info!(question = %question, "Off-topic question rejected");
        return Ok(Json(AskResponse::out_of_context()));
    }

    let agent = state.agent().await.map_err(|e| {
        error!(error = %e, "Agent unavailable");
        ApiError::Internal
    })?;

    let output = agent.invoke(&question).await.map_err(|e| {
        error!(error = %e, question = %question, "Agent run failed");
        ApiError::Internal
    })?;

    let plot_needed = plot_requested(&question, &output.output);
    let plot_base64 = if plot_needed { render_plot(&state, &question).await } else { None };

    log_user_query(
        &question,
        &output.output,
        plot_needed,
        agent.model_id(),
        started.elapsed().as_millis() as u64,
    );

    Ok(Json(AskResponse {
        text_answer: output.output,
        plot_needed,
        plot_base64,
    }))
}

/// Chart failures never fail the request; the answer goes out without one.
async fn render_plot(state: &SharedState, question: &str) -> Option<String> {
    let kind = ChartKind::select(question);
    let dataset = match state.dataset.get().await {
        Ok(ds) => ds,
        Err(e) => {
            warn!(error = %e, "Dataset unavailable for chart");
            return None;
        }
    };

    let charts = state.charts.clone();
    let rendered = tokio::task::spawn_blocking(move || charts.render_base64(kind, &dataset)).await;
    match rendered {
        Ok(Ok(b64)) => {
            info!(chart = ?kind, bytes = b64.len(), "Chart rendered");
            Some(b64)
        }
        Ok(Err(e)) => {
            warn!(chart = ?kind, error = %e, "Chart rendering failed");
            None
        }
        Err(e) => {
            warn!(error = %e, "Chart task panicked");
            None
        }
    }
}
