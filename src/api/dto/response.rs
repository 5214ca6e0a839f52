//! Success envelope for the user endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope wrapping every success payload of the `/api/users` routes.
///
/// The HTTP status code is mirrored into the body; `data` carries the
/// payload or an explicit `null` when the operation has none.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// HTTP status code repeated in the body
    #[schema(example = 200)]
    pub status: u16,
    /// Operation payload, serialized as `null` when absent
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload in a 200 envelope.
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let response = ApiResponse::ok(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], 200);
        assert_eq!(json["data"]["id"], 1);
    }

    #[test]
    fn test_null_data_is_serialized() {
        let response: ApiResponse<String> = ApiResponse {
            status: 200,
            data: None,
        };
        let json = serde_json::to_string(&response).unwrap();

        assert_eq!(json, r#"{"status":200,"data":null}"#);
    }
}
