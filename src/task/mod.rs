// src/task/mod.rs

use crate::analyze::{correlation, count_over_threshold, earliest_over_threshold};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::fetch::fetch_document;
use crate::normalize::{normalize, NumericColumn};
use crate::render::render_scatter_with_regression;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Chart size limit for the movie question set.
const CHART_MAX_BYTES: usize = 100 * 1024;

/// Question sets we recognise from the task description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    HighestGrossingFilms,
    HighCourtJudgments,
}

impl TaskKind {
    pub fn detect(task: &str) -> Result<Self> {
        let lower = task.to_lowercase();
        if lower.contains("wikipedia") && lower.contains("highest-grossing") {
            Ok(TaskKind::HighestGrossingFilms)
        } else if lower.contains("indian high court") {
            Ok(TaskKind::HighCourtJudgments)
        } else {
            Err(Error::UnsupportedTask(
                "no known question set matches this task".into(),
            ))
        }
    }
}

/// Work out which question set `task` asks about and answer it.
pub async fn execute_task(client: &Client, films_url: &str, task: &str) -> Result<Value> {
    let kind = TaskKind::detect(task)?;
    info!(?kind, "dispatching task");
    match kind {
        TaskKind::HighestGrossingFilms => {
            let document = fetch_document(client, films_url).await?;
            // the pipeline is CPU-only; keep it off the async workers
            let answers = tokio::task::spawn_blocking(move || answer_film_questions(&document))
                .await
                .map_err(|e| Error::Internal(format!("analysis task failed: {e}")))??;
            Ok(Value::Array(answers))
        }
        TaskKind::HighCourtJudgments => Err(Error::TaskNotServed(
            "Indian High Court judgment questions are recognised, but that dataset is not \
             analysed by this service"
                .into(),
        )),
    }
}

/// Run the fixed film questions against a fetched page, answers in question order:
///
/// 1. films grossing ≥ $2bn released before 2020
/// 2. earliest film grossing ≥ $1.5bn
/// 3. Rank/Peak correlation, rounded to 6 places
/// 4. Rank vs Peak scatter with a dotted red regression line, as a data URI
pub fn answer_film_questions(document: &str) -> Result<Vec<Value>> {
    let raw = extract(document)?;
    let table = normalize(&raw);
    debug!(records = table.len(), "film table ready");

    let over_two = count_over_threshold(&table, 2.0, 2020);
    let earliest = earliest_over_threshold(&table, 1.5);
    let r = correlation(&table, NumericColumn::Rank, NumericColumn::Peak);
    let chart = render_scatter_with_regression(
        &table,
        NumericColumn::Rank,
        NumericColumn::Peak,
        "red",
        "dotted",
        CHART_MAX_BYTES,
    );

    Ok(vec![
        json!(over_two),
        json!(earliest.as_answer()),
        json!(round_to(r, 6)),
        json!(chart.to_data_uri()),
    ])
}

fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}
