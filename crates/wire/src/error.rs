use serde::Serialize;

/// The error body shape from spec.md §6.1: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody { error: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_spec_error_shape() {
        let body = ErrorBody::new("port already in use");
        let json = serde_json::to_value(&body).expect("serialize failed");
        assert_eq!(json, serde_json::json!({"error": "port already in use"}));
    }
}
