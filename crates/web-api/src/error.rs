use application::{Code, Status};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// 升级前失败时返回的 HTTP 错误，响应体是分类后的状态
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Status,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::Unavailable | Code::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        Code::Internal | Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Status> for ApiError {
    fn from(body: Status) -> Self {
        Self {
            status: http_status(body.code()),
            body,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::{ApplicationError, ErrorClassifier};

    #[test]
    fn test_unauthenticated_maps_to_401() {
        let status =
            ErrorClassifier::default().classify(&ApplicationError::unauthenticated("missing token"));
        let err = ApiError::from(status);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_masked_errors_map_to_500() {
        let status = ErrorClassifier::default().classify(&ApplicationError::Internal("db".into()));
        assert_eq!(
            ApiError::from(status).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
