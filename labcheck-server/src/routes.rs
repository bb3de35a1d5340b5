use std::convert::Infallible;
use std::io;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use labcheck_api::api::{ErrorResponse, LabsResponse, RunChecksRequest, StudentsResponse};
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::{labs, process};

pub fn routes(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/check/:lab", get(view_lab))
        .route("/run_check/:lab", post(run_check))
        .with_state(config)
}

async fn index(State(config): State<Arc<ServerConfig>>) -> Response {
    match labs::list_dirs(&config.data_root).await {
        Ok(labs) => Json(LabsResponse { labs }).into_response(),
        Err(e) => {
            log::error!("failed to list labs: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: String::from("failed to list labs"),
                }),
            )
                .into_response()
        }
    }
}

async fn view_lab(State(config): State<Arc<ServerConfig>>, Path(lab): Path<String>) -> Response {
    match labs::list_dirs(&config.lab_dir(&lab)).await {
        Ok(students) => Json(StudentsResponse { lab, students }).into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!(lab:display; "lab directory not found");
            not_found(&lab)
        }
        Err(e) => {
            log::error!(lab:display; "failed to list students: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: String::from("failed to list students"),
                }),
            )
                .into_response()
        }
    }
}

async fn run_check(
    State(config): State<Arc<ServerConfig>>,
    Path(lab): Path<String>,
    Json(request): Json<RunChecksRequest>,
) -> Response {
    let id = fastrand::u64(..);
    log::info!(id, lab:display; "received check run");

    let script = config.checker_script(&lab);
    if !script.exists() {
        log::info!(id, script:debug; "checker script not found");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("no checker script for lab: {lab}"),
            }),
        )
            .into_response();
    }

    let lab_dir = config.lab_dir(&lab);
    if !lab_dir.is_dir() {
        return not_found(&lab);
    }

    let students = match request.students {
        Some(selected) => labs::existing_students(&lab_dir, selected).await,
        None => match labs::list_dirs(&lab_dir).await {
            Ok(all) => all,
            Err(e) => {
                log::error!(id; "failed to list students: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: String::from("failed to list students"),
                    }),
                )
                    .into_response();
            }
        },
    };
    log::debug!(id, students = students.len(); "students selected");

    // The run loop outlives the response if the client disconnects early;
    // see `process::run_checks`.
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(process::run_checks(id, Arc::clone(&config), lab, students, tx));

    let body = Body::from_stream(futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|line| (Ok::<_, Infallible>(Bytes::from(line)), rx))
    }));
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

fn not_found(lab: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("no such lab: {lab}"),
        }),
    )
        .into_response()
}
