use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("corrupted record: {0}")]
    CorruptedRecord(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error(transparent)]
    Engine(#[from] crate::engine::EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_norway::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl DashError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::CorruptedRecord(_) => "CORRUPTED_RECORD",
            Self::Download(_) => "DOWNLOAD_FAILED",
            Self::Engine(_) => "ENGINE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
            Self::Toml(_) => "TOML_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub fn to_payload(
        &self,
        operation: impl Into<String>,
        namespace: Option<String>,
    ) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            namespace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_code_and_namespace() {
        let err = DashError::InvalidConfig("unknown score factor 'speed'".to_string());
        let payload = err.to_payload("config.load", Some("foo".to_string()));
        assert_eq!(payload.code, "INVALID_CONFIG");
        assert_eq!(payload.operation, "config.load");
        assert_eq!(payload.namespace.as_deref(), Some("foo"));
        assert!(payload.message.contains("speed"));
        assert!(Uuid::parse_str(&payload.trace_id).is_ok());
    }

    #[test]
    fn io_errors_map_to_io_code() {
        let err = DashError::from(std::io::Error::other("disk full"));
        assert_eq!(err.code(), "IO_ERROR");
    }
}
