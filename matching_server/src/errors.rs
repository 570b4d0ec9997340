use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use matching_engine::{traits::MatchingStoreError, LifecycleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Lifecycle error. {0}")]
    LifecycleError(#[from] LifecycleError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::LifecycleError(e) => match e {
                LifecycleError::SelfProposal | LifecycleError::EmptyChoices | LifecycleError::EmptyContact => {
                    StatusCode::BAD_REQUEST
                },
                LifecycleError::StoreError(e) => match e {
                    MatchingStoreError::InsufficientCredits(_) => StatusCode::PAYMENT_REQUIRED,
                    MatchingStoreError::DuplicateRequest(_) |
                    MatchingStoreError::AlreadyResolved(_) |
                    MatchingStoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
                    MatchingStoreError::NotAPairMember { .. } => StatusCode::FORBIDDEN,
                    MatchingStoreError::RequestNotFound(_) |
                    MatchingStoreError::PairNotFound(_) |
                    MatchingStoreError::ProposalNotFound(_) |
                    MatchingStoreError::RequesterNotFound(_) |
                    MatchingStoreError::NoActiveRequest(_) => StatusCode::NOT_FOUND,
                    MatchingStoreError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
