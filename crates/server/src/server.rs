use axum::{
    Router,
    routing::{get, post, put},
};

use std::sync::Arc;

use crate::{categories, families, members, statistics, tags, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/families", post(families::create).get(families::list))
        .route(
            "/families/{family_id}",
            get(families::get)
                .put(families::rename)
                .delete(families::remove),
        )
        .route("/families/{family_id}/members", get(members::list))
        .route("/families/{family_id}/tags", get(tags::list))
        .route(
            "/families/{family_id}/transactions",
            get(transactions::list),
        )
        .route(
            "/families/{family_id}/statistics/by_category",
            get(statistics::by_category),
        )
        .route(
            "/families/{family_id}/statistics/by_time",
            get(statistics::by_time),
        )
        .route("/members", post(members::create))
        .route(
            "/members/{member_id}",
            get(members::get)
                .put(members::update)
                .delete(members::remove),
        )
        .route("/members/{member_id}/role", put(members::change_role))
        .route("/categories", post(categories::create).get(categories::list))
        .route("/categories/roots", get(categories::roots))
        .route("/categories/tree", get(categories::tree))
        .route(
            "/categories/{category_id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route(
            "/categories/{category_id}/full_path",
            get(categories::full_path),
        )
        .route("/tags", post(tags::create))
        .route(
            "/tags/{tag_id}",
            get(tags::get).put(tags::update).delete(tags::remove),
        )
        .route("/transactions", post(transactions::create))
        .route(
            "/transactions/{transaction_id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route(
            "/transactions/{transaction_id}/tags/{tag_id}",
            post(transactions::attach_tag).delete(transactions::detach_tag),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, addr: std::net::SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
