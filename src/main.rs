//! `bookshelf` server: configuration from the environment, one collection
//! opened for the life of the process, axum on top.

use bookshelf::{logging, router, AppState, Collection, Config, DefaultBackend};
use std::sync::Arc;

#[tokio::main]
async fn main() -> bookshelf::Result<()> {
    logging::init();
    let config = Config::from_env()?;

    let books = Arc::new(
        Collection::<DefaultBackend>::builder(&config.db_path, config.collection.as_str())
            .policy(config.policy.clone())
            .pretty(config.pretty)
            .build()?,
    );
    tracing::info!(
        path = %config.db_path.display(),
        collection = %config.collection,
        books = books.len(),
        policy = ?config.policy,
        "store opened"
    );

    let app = router(AppState::new(Arc::clone(&books), config.missing_ids));
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    books.flush()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
