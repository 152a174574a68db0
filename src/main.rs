use anyhow::{Context, Result};
use futures::TryStreamExt;
use reqwest::Client;
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use warp::{
    http::StatusCode,
    hyper::body::Buf,
    multipart::{FormData, Part},
    reject::Rejection,
    reply::Reply,
    Filter,
};
use wikistats::{config::ServiceConfig, fetch, task};

/// Upper bound on the uploaded task description.
const MAX_TASK_BYTES: u64 = 1024 * 1024;

struct AppState {
    client: Client,
    cfg: ServiceConfig,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: Option<String>,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "wikistats"
    })))
}

/// Pull the `file` part out of the upload and read it as UTF-8 task text.
async fn read_task(form: FormData) -> Result<String> {
    let parts: Vec<Part> = form.try_collect().await.context("reading multipart body")?;
    let part = parts
        .into_iter()
        .find(|p| p.name() == "file")
        .context("multipart body has no `file` part")?;

    let bytes = part
        .stream()
        .try_fold(Vec::new(), |mut acc, buf| async move {
            acc.extend_from_slice(buf.chunk());
            Ok(acc)
        })
        .await
        .context("reading `file` part")?;
    String::from_utf8(bytes).context("task description is not UTF-8")
}

async fn analyze(form: FormData, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    let start = Instant::now();

    let outcome = async {
        let task_text = read_task(form).await?;
        let preview: String = task_text.chars().take(100).collect();
        info!("Received task: {}...", preview);
        let answers =
            task::execute_task(&state.client, state.cfg.films_url.as_str(), &task_text).await?;
        Ok::<_, anyhow::Error>(answers)
    }
    .await;

    let elapsed = start.elapsed().as_secs_f64();
    match outcome {
        Ok(answers) => {
            info!("Task completed in {:.2} seconds", elapsed);
            Ok(warp::reply::with_status(
                warp::reply::json(&answers),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            error!("Error processing task after {:.2}s: {:#}", elapsed, e);
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorResponse {
                    error: "Task failed".to_string(),
                    details: Some(format!("{:#}", e)),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = ServiceConfig::from_env()?;

    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(cfg.log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    info!("Starting data analyst service");

    let client = fetch::build_client(&cfg)?;
    let port = cfg.port;
    let state = Arc::new(AppState { client, cfg });
    let with_state = warp::any().map(move || state.clone());

    let health = warp::path("health").and(warp::get()).and_then(health_check);

    let api = warp::path("api")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_TASK_BYTES))
        .and(with_state)
        .and_then(analyze);

    let routes = health.or(api);

    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Analysis endpoint: POST http://localhost:{}/api/", port);

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    fn test_state() -> Arc<AppState> {
        let cfg = ServiceConfig::default();
        Arc::new(AppState {
            client: Client::new(),
            cfg,
        })
    }

    fn api_filter(
        state: Arc<AppState>,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        warp::path("api")
            .and(warp::post())
            .and(warp::multipart::form().max_length(MAX_TASK_BYTES))
            .and(warp::any().map(move || state.clone()))
            .and_then(analyze)
    }

    fn multipart_body(boundary: &str, text: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"questions.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n{text}\r\n--{b}--\r\n",
            b = boundary
        )
    }

    #[tokio::test]
    async fn unsupported_task_returns_500() {
        let boundary = "XBOUNDARYX";
        let resp = warp::test::request()
            .method("POST")
            .path("/api/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(multipart_body(boundary, "Tell me a joke"))
            .reply(&api_filter(test_state()))
            .await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("unsupported task"));
    }
}
