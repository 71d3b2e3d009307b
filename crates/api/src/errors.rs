use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use cragsupply_core::DomainError;
use cragsupply_infra::ServiceError;

pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// A failed request: status code, stable machine-readable code, message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(BAD_REQUEST, "validation_error", message)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Response body.
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": self.code,
            "message": self.message,
        })
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        let api = match err {
            ServiceError::CapacityExceeded { .. } => {
                ApiError::new(BAD_REQUEST, "capacity_exceeded", message)
            }
            ServiceError::InvalidOperation(_) => {
                ApiError::new(BAD_REQUEST, "invalid_operation", message)
            }
            ServiceError::Validation(_) => ApiError::new(BAD_REQUEST, "validation_error", message),
            ServiceError::NotFound(_) => ApiError::new(NOT_FOUND, "not_found", message),
            ServiceError::NameConflict(_) => ApiError::new(CONFLICT, "name_conflict", message),
            ServiceError::Conflict(_) => ApiError::new(CONFLICT, "conflict", message),
            ServiceError::InvariantViolation(_) => {
                ApiError::new(UNPROCESSABLE_ENTITY, "invariant_violation", message)
            }
            ServiceError::Lock(_) => ApiError::new(SERVICE_UNAVAILABLE, "busy", message),
            ServiceError::Store(_) => ApiError::new(INTERNAL_SERVER_ERROR, "store_error", message),
        };

        if api.is_client_error() {
            tracing::warn!(status = api.status, code = api.code, message = %api.message, "request rejected");
        } else {
            tracing::error!(status = api.status, code = api.code, message = %api.message, "request failed");
        }
        api
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ServiceError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cragsupply_core::WarehouseId;
    use cragsupply_infra::store::StoreError;

    #[test]
    fn capacity_exceeded_is_a_client_error() {
        let err: ApiError = ServiceError::CapacityExceeded {
            warehouse_id: WarehouseId::from_raw(1),
            requested: 1_001,
            max_capacity: 1_000,
        }
        .into();
        assert_eq!(err.status, BAD_REQUEST);
        assert_eq!(err.code, "capacity_exceeded");
        assert!(err.message.contains("maximum 1000"));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (ServiceError::NotFound("warehouse 4".into()), NOT_FOUND),
            (ServiceError::InvalidOperation("multiply".into()), BAD_REQUEST),
            (ServiceError::NameConflict("CA1".into()), CONFLICT),
            (ServiceError::Conflict("line 2".into()), CONFLICT),
            (ServiceError::InvariantViolation("negative".into()), UNPROCESSABLE_ENTITY),
            (
                ServiceError::Store(StoreError::Unavailable("db".into())),
                INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn body_carries_code_and_message() {
        let err = ApiError::validation("quantity must be a whole number");
        assert_eq!(
            err.body(),
            json!({"error": "validation_error", "message": "quantity must be a whole number"})
        );
    }
}
