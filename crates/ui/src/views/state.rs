use services::{ApiError, AuthError, QuizError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unauthorized,
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unauthorized => "Your session has expired. Please sign in again.",
            ViewError::NotFound => "This assessment could not be found.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ViewError::Unauthorized,
            ApiError::HttpStatus { status, .. } if status.as_u16() == 404 => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&QuizError> for ViewError {
    fn from(err: &QuizError) -> Self {
        match err {
            QuizError::Api(api) => ViewError::from_api(api),
            _ => ViewError::Unknown,
        }
    }
}

impl From<&AuthError> for ViewError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::Api(api) => ViewError::from_api(api),
            _ => ViewError::Unknown,
        }
    }
}
