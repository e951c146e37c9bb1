//! JWT 认证模块
//!
//! 只负责验证 token 并解析出调用主体；token 的签发由外部身份服务完成。

use application::ApplicationError;
use axum::http::HeaderMap;
use config::JwtConfig;
use domain::{Principal, UserId};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
        }
    }

    /// 验证并解析 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApplicationError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "token 校验失败");
                ApplicationError::unauthenticated("invalid token")
            })
    }

    /// 解析调用主体
    ///
    /// 优先读取 `Authorization: Bearer` 头；浏览器的 WebSocket 客户端无法设置请求头，
    /// 因此也接受 `?token=` 查询参数。
    pub fn resolve_principal(
        &self,
        headers: &HeaderMap,
        query_token: Option<&str>,
    ) -> Result<Principal, ApplicationError> {
        let token = match headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
        {
            Some(auth_header) => auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                ApplicationError::unauthenticated("invalid authorization header format")
            })?,
            None => query_token
                .filter(|token| !token.is_empty())
                .ok_or_else(|| ApplicationError::unauthenticated("missing token"))?,
        };

        let claims = self.verify_token(token)?;
        Ok(Principal::new(UserId::new(claims.user_id)))
    }
}
