#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        all_students::{
            delete_student, get_students, internal_get_deactivate_form, internal_get_students,
        },
        index::get_index_route,
        sse::sse_feed,
        student_forms::{
            internal_get_edit_student_form, internal_get_new_student_form,
            internal_post_edit_student, internal_put_new_student,
        },
        student_in_detail::internal_get_student_in_detail,
    },
    state::TweedState,
};
use axum::{Router, routing::get};
use std::env;
use tokio::{net::TcpListener, signal};
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod flow;
mod maud_conveniences;
mod routes;
mod state;
mod validation;
mod view;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("not loading a .env file: {e}");
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = TweedState::new(config).expect("unable to create state");

    let app = Router::new()
        .route("/", get(get_index_route))
        .route("/students", get(get_students).delete(delete_student))
        .route("/internal/students", get(internal_get_students))
        .route("/internal/student", get(internal_get_student_in_detail))
        .route(
            "/internal/students/new_form",
            get(internal_get_new_student_form).put(internal_put_new_student),
        )
        .route(
            "/internal/students/edit_form",
            get(internal_get_edit_student_form).post(internal_post_edit_student),
        )
        .route(
            "/internal/students/deactivate_form",
            get(internal_get_deactivate_form),
        )
        .route("/sse_feed", get(sse_feed))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let server_ip = env::var("TWEED_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
