pub enum Error {
    Status(axum::http::StatusCode, String),
    BoxError(axum::BoxError),
}

impl Error {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Error::Status(code, _) => *code,
            Error::BoxError(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Status(code, reason) => (code, reason),
            Error::BoxError(err) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}", err),
            ),
        }
        .into_response()
    }
}

impl From<crate::resolve::Error> for Error {
    fn from(err: crate::resolve::Error) -> Self {
        use crate::resolve::Error as E;
        match err {
            E::UnknownDid | E::Retired => {
                Error::Status(axum::http::StatusCode::NOT_FOUND, err.to_string())
            }
            E::Stale(_) => Error::Status(axum::http::StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            E::Tracker(_) | E::Store(_) => Error::BoxError(err.into()),
        }
    }
}

impl From<crate::info::Error> for Error {
    fn from(err: crate::info::Error) -> Self {
        use crate::info::Error as E;
        match err {
            E::UnknownDid | E::UnknownHandle => {
                Error::Status(axum::http::StatusCode::NOT_FOUND, err.to_string())
            }
            E::Store(_) => Error::BoxError(err.into()),
        }
    }
}

impl From<crate::shutdown::Cancelled> for Error {
    fn from(err: crate::shutdown::Cancelled) -> Self {
        Error::Status(axum::http::StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    }
}
