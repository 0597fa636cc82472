mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::config::ServerConfig;
use crate::state::AppState;

pub fn api_routes(config: &ServerConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes(config))
}
