use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("datastore unavailable: {0}")]
    Connection(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Store(String),
}

impl DomainError {
    pub fn missing_field(field: &str) -> Self {
        DomainError::Validation(format!(
            "product validation failed: {field}: field `{field}` is required"
        ))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: message.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            DomainError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::Store("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DomainError::Connection("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = DomainError::missing_field("price");
        assert!(err.is_validation());
        assert!(err.to_string().contains("`price` is required"));
    }
}
