use alumnet_live::{alumnet_route, state::AppStateBuilder};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = match AppStateBuilder::new().build().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to build AppState: {:?}", e);
            return;
        }
    };

    let app = alumnet_route(Arc::new(state));

    let addr = std::env::var("ALUMNET_LIVE_ADDR").unwrap_or_else(|_| "0.0.0.0:4850".into());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!("Alumnet live service listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
