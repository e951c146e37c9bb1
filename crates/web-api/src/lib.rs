//! Web API 层。
//!
//! 提供 Axum 路由，把两个流式端点以 WebSocket 形式暴露，并委托给应用层的会话服务。

mod auth;
mod error;
mod routes;
mod state;
mod ws_connection;

pub use auth::{Claims, JwtService};
pub use config::JwtConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
