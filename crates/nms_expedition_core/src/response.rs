//! JSON envelope for command results.
//!
//! Every core error converts into an [`ErrorResponse`] with a stable
//! [`ErrorCode`], so machine consumers of `--json` output can branch on the
//! code instead of parsing messages. Swap failures that leave a backup behind
//! say so in `context`.

use crate::error::{CatalogError, ConfigError, ServiceError, SwapError};
use serde::{Deserialize, Serialize};

/// Error codes exposed to UI consumers.
/// These are serialized as SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No cache directory configured
    Configuration,
    /// Cache file or expedition dataset missing
    NotFound,
    /// A file is not valid JSON
    Validation,
    /// Backup did not match the original after writing
    BackupVerification,
    /// Active file did not match the dataset after activation
    ActivationVerification,
    /// Active file did not match the backup after restoring
    RestorationVerification,
    /// Restore requested without a backup
    NoBackup,
    /// Expedition directory could not be read
    Catalog,
    /// The game is running
    GameRunning,
    /// Could not tell whether the game is running
    ProcessQuery,
    /// File system I/O error
    Io,
    /// Configuration file could not be read or written
    Config,
}

/// Structured error sent to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error code for pattern matching
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional contextual data (e.g., the invalid path, the running pid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Serialize) -> Self {
        self.context = serde_json::to_value(context).ok();
        self
    }
}

/// Outcome of a UI-facing operation.
///
/// Serializes to `{ "ok": true, "value": T }` or `{ "ok": false, "error": ErrorResponse }`.
/// `value` is always present on success, even when `T` serializes to `null`.
#[derive(Debug, Clone)]
pub enum Response<T> {
    Ok { value: T },
    Err { error: ErrorResponse },
}

#[derive(Serialize)]
#[serde(untagged)]
enum Envelope<'a, T> {
    Ok { ok: bool, value: &'a T },
    Err { ok: bool, error: &'a ErrorResponse },
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let envelope = match self {
            Response::Ok { value } => Envelope::Ok { ok: true, value },
            Response::Err { error } => Envelope::Err { ok: false, error },
        };
        envelope.serialize(serializer)
    }
}

impl<T> Response<T> {
    pub fn ok(value: T) -> Self {
        Response::Ok { value }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}

impl<T, E: Into<ErrorResponse>> From<Result<T, E>> for Response<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Response::Ok { value },
            Err(e) => Response::Err { error: e.into() },
        }
    }
}

impl From<SwapError> for ErrorResponse {
    fn from(error: SwapError) -> Self {
        let message = error.to_string();
        match error {
            SwapError::Configuration => ErrorResponse::new(ErrorCode::Configuration, message),
            SwapError::NotFound(_) => ErrorResponse::new(ErrorCode::NotFound, message),
            SwapError::Validation { path, .. } => {
                ErrorResponse::new(ErrorCode::Validation, message)
                    .with_context(serde_json::json!({ "path": path }))
            }
            SwapError::BackupVerification => {
                ErrorResponse::new(ErrorCode::BackupVerification, message)
            }
            SwapError::ActivationVerification => {
                ErrorResponse::new(ErrorCode::ActivationVerification, message).with_context(
                    serde_json::json!({
                        "backupKept": true,
                        "hint": "Restore the original to recover",
                    }),
                )
            }
            SwapError::RestorationVerification => {
                ErrorResponse::new(ErrorCode::RestorationVerification, message)
                    .with_context(serde_json::json!({ "backupKept": true }))
            }
            SwapError::NoBackup => ErrorResponse::new(ErrorCode::NoBackup, message),
            SwapError::Io(_) => ErrorResponse::new(ErrorCode::Io, message),
        }
    }
}

impl From<CatalogError> for ErrorResponse {
    fn from(error: CatalogError) -> Self {
        let message = error.to_string();
        match error {
            CatalogError::ReadDir { path, .. } => ErrorResponse::new(ErrorCode::Catalog, message)
                .with_context(serde_json::json!({ "path": path })),
        }
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        match error {
            ServiceError::GameRunning { pid } => ErrorResponse::new(ErrorCode::GameRunning, message)
                .with_context(serde_json::json!({ "pid": pid })),
            ServiceError::LivenessUnknown(_) => {
                ErrorResponse::new(ErrorCode::ProcessQuery, message)
            }
            ServiceError::Swap(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ErrorResponse {
    fn from(error: ConfigError) -> Self {
        ErrorResponse::new(ErrorCode::Config, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_serialization() {
        let response: Response<u32> = Response::ok(7);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "ok": true, "value": 7 })
        );
    }

    #[test]
    fn test_null_value_is_kept() {
        let response: Response<Option<u32>> = Response::ok(None);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "ok": true, "value": null })
        );
    }

    #[test]
    fn test_validation_error_names_path() {
        let error = ErrorResponse::from(SwapError::Validation {
            path: "/cache/SEASON_DATA_CACHE.JSON".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        });
        assert_eq!(error.code, ErrorCode::Validation);
        assert_eq!(
            error.context,
            Some(json!({ "path": "/cache/SEASON_DATA_CACHE.JSON" }))
        );
    }

    #[test]
    fn test_error_serialization() {
        let response: Response<()> = Err(SwapError::NoBackup).into();
        assert!(!response.is_ok());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "ok": false,
                "error": {
                    "code": "NO_BACKUP",
                    "message": "No backup file found - cannot restore",
                }
            })
        );
    }

    #[test]
    fn test_activation_failure_carries_recovery_hint() {
        let error = ErrorResponse::from(ServiceError::Swap(SwapError::ActivationVerification));
        assert_eq!(error.code, ErrorCode::ActivationVerification);
        assert_eq!(error.context.unwrap()["backupKept"], true);
    }

    #[test]
    fn test_game_running_context() {
        let error = ErrorResponse::from(ServiceError::GameRunning { pid: 31 });
        assert_eq!(error.code, ErrorCode::GameRunning);
        assert_eq!(error.context, Some(json!({ "pid": 31 })));
        assert_eq!(
            serde_json::to_value(error.code).unwrap(),
            json!("GAME_RUNNING")
        );
    }
}
