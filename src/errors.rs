use crate::analysis::LlmError;
use crate::db::errors::DbError;
use crate::image::ImageError;
use crate::ocr::OcrError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data, detected before any provider call
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found (or not visible to the requesting user)
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    /// A required provider is not configured
    #[error("{provider} no está configurado")]
    ProviderUnavailable { provider: String },

    /// An upstream provider reported a non-success result
    #[error("{provider}: {message}")]
    Provider { provider: String, message: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ProviderUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error category for the response body, mirrored from the status.
    fn category(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Solicitud inválida",
            StatusCode::NOT_FOUND => "No encontrado",
            _ => "Error interno del servidor",
        }
    }

    /// User-safe message, without leaking internal implementation details.
    fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { .. } => "No se encontró el análisis con el ID proporcionado".to_string(),
            Error::ProviderUnavailable { provider } => {
                format!("{provider} no está configurado. Verifica las variables de entorno del servicio.")
            }
            Error::Provider { provider, message } => format!("Error al procesar el documento con {provider}: {message}"),
            Error::Database(_) | Error::Other(_) => "Ocurrió un error inesperado al procesar la solicitud".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Full error details stay server-side; clients get the safe message.
        match &self {
            Error::Database(DbError::Other(_)) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::ProviderUnavailable { .. } | Error::Provider { .. } => {
                tracing::error!("Provider error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Database(DbError::NotFound) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = json!({
            "error": self.category(),
            "message": self.user_message(),
        });

        (self.status_code(), axum::Json(body)).into_response()
    }
}

impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        Error::BadRequest { message: err.to_string() }
    }
}

impl From<OcrError> for Error {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Unavailable => Error::ProviderUnavailable {
                provider: "El servicio de OCR".to_string(),
            },
            OcrError::Provider { message } => Error::Provider {
                provider: "OCR".to_string(),
                message,
            },
            OcrError::Timeout { attempts } => Error::Provider {
                provider: "OCR".to_string(),
                message: format!("el análisis no terminó después de {attempts} intentos"),
            },
            OcrError::Transport(e) => Error::Provider {
                provider: "OCR".to_string(),
                message: e.to_string(),
            },
        }
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unavailable => Error::ProviderUnavailable {
                provider: "El servicio de análisis".to_string(),
            },
            LlmError::Provider { message } => Error::Provider {
                provider: "el modelo de lenguaje".to_string(),
                message,
            },
            LlmError::Transport(e) => Error::Provider {
                provider: "el modelo de lenguaje".to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
