//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use roomkeeper_shared::time::SystemClock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{RoomCatalogRepository, RoomRegistry},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryRoomCatalog, JsonFileRoomCatalog},
    },
    usecase::{GetRoomsUseCase, RoomCoordinator},
};

use super::{
    handler::{debug_rooms, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room coordination server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// Server::from_config(&config).run(&config.bind_address()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        coordinator: RoomCoordinator,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        trust_forwarded_headers: bool,
        utc_offset_hours: i32,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                coordinator,
                get_rooms_usecase,
                trust_forwarded_headers,
                utc_offset_hours,
            }),
        }
    }

    /// Wire catalog, pusher and coordinator from `config`.
    ///
    /// Spawns the coordinator task, so it must be called inside a Tokio runtime.
    pub fn from_config(config: &ServerConfig) -> Self {
        // 1. Room catalog
        let catalog: Arc<dyn RoomCatalogRepository> = match &config.rooms_file {
            Some(path) => {
                tracing::info!("Serving rooms from {}", path.display());
                Arc::new(JsonFileRoomCatalog::new(path.clone()))
            }
            None => {
                tracing::info!("No rooms file configured; serving the open lobby only");
                Arc::new(InMemoryRoomCatalog::with_lobby())
            }
        };

        // 2. MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::default());

        // 3. Coordinator owning the room registry
        let coordinator = RoomCoordinator::spawn(
            RoomRegistry::new(config.policy),
            catalog.clone(),
            message_pusher,
            Arc::new(SystemClock),
            config.utc_offset_hours,
        );

        Self::new(
            coordinator,
            Arc::new(GetRoomsUseCase::new(catalog)),
            config.trust_forwarded_headers,
            config.utc_offset_hours,
        )
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/debug/rooms", get(debug_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind `bind_addr` (`host:port`) and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(bind_addr).await?;

        tracing::info!("Room server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
