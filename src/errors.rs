use axum::http::StatusCode;

/// Failures raised by the record store and record validation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("at least one plano must be recorded")]
    InvalidUnits,
    #[error("price and cost must be non-negative numbers")]
    InvalidAmount,
    #[error("plan type must not be empty")]
    MissingPlanType,
    #[error("nothing selected")]
    NothingSelected,
    #[error("failed to access data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode data file: {0}")]
    Csv(#[from] csv::Error),
    #[error("data file is unreadable, refusing to overwrite it: {0}")]
    Unreadable(String),
}

impl StoreError {
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidUnits
                | StoreError::InvalidAmount
                | StoreError::MissingPlanType
                | StoreError::NothingSelected
        )
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_user_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(err)
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
