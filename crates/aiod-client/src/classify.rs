use serde_json::Value;

use crate::error::{AiodError, ApiFailure};
use crate::transport::{HttpRequest, HttpResponse};

/// Detail or reference supplied by an internal call site. Both take
/// precedence over whatever the server sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorOverrides {
    pub detail: Option<String>,
    pub reference: Option<String>,
}

impl ErrorOverrides {
    #[must_use]
    pub fn detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            reference: None,
        }
    }
}

/// Translates a non-2xx response into exactly one typed error.
///
/// Never fails: bodies that are not JSON objects contribute their raw text,
/// possibly empty, as the detail and no reference.
pub fn classify(
    request: &HttpRequest,
    response: &HttpResponse,
    overrides: ErrorOverrides,
) -> AiodError {
    let (server_detail, server_reference) = match response.json() {
        Ok(Value::Object(map)) => (
            map.get("detail").and_then(field_text),
            map.get("reference").and_then(field_text),
        ),
        _ => (Some(response.text()), None),
    };

    let failure = ApiFailure {
        status: response.status,
        detail: overrides.detail.or(server_detail),
        reference: overrides.reference.or(server_reference),
        method: request.method.to_string(),
        url: request.url.clone(),
    };

    match response.status {
        404 => AiodError::AssetNotFound(failure),
        429 => AiodError::RateLimit(failure),
        401 | 403 => AiodError::Authentication(failure),
        500..=599 => AiodError::Server(failure),
        _ => AiodError::Api(failure),
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;

    const URL: &str = "https://api.example.test/datasets/v1/42";

    fn get() -> HttpRequest {
        HttpRequest::new(Method::Get, URL)
    }

    fn classify_status(status: u16) -> AiodError {
        classify(
            &get(),
            &HttpResponse::new(status, ""),
            ErrorOverrides::default(),
        )
    }

    #[test]
    fn every_status_maps_to_exactly_one_variant() {
        for status in 300..=599_u16 {
            let err = classify_status(status);
            let expected = match status {
                404 => "ASSET_NOT_FOUND",
                429 => "RATE_LIMIT",
                401 | 403 => "AUTHENTICATION_FAILED",
                500..=599 => "SERVER_ERROR",
                _ => "API_ERROR",
            };
            assert_eq!(err.code(), expected, "status {status}");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn boundary_statuses_pick_the_specific_variant() {
        assert!(matches!(classify_status(404), AiodError::AssetNotFound(_)));
        assert!(matches!(classify_status(499), AiodError::Api(_)));
        assert!(matches!(classify_status(500), AiodError::Server(_)));
        assert!(matches!(classify_status(599), AiodError::Server(_)));
        assert!(matches!(classify_status(600), AiodError::Api(_)));
        assert!(matches!(classify_status(403), AiodError::Authentication(_)));
    }

    #[test]
    fn empty_non_json_body_falls_back_to_method_and_url() {
        let err = classify_status(502);
        assert_eq!(err.detail(), Some(""));
        assert_eq!(err.reference(), None);
        assert_eq!(err.to_string(), format!("API Error 502 on GET {URL}"));
    }

    #[test]
    fn non_json_text_becomes_detail() {
        let err = classify(
            &get(),
            &HttpResponse::new(502, "<html>Bad gateway</html>"),
            ErrorOverrides::default(),
        );
        assert_eq!(err.detail(), Some("<html>Bad gateway</html>"));
        assert_eq!(err.reference(), None);
        assert_eq!(err.to_string(), "API Error 502: <html>Bad gateway</html>");
    }

    #[test]
    fn json_detail_and_reference_are_extracted() {
        let err = classify(
            &get(),
            &HttpResponse::new(400, r#"{"detail": "X", "reference": "R"}"#),
            ErrorOverrides::default(),
        );
        assert!(matches!(err, AiodError::Api(_)));
        assert_eq!(err.detail(), Some("X"));
        assert_eq!(err.reference(), Some("R"));
        assert_eq!(err.to_string(), "API Error 400: X");
    }

    #[test]
    fn json_object_without_detail_uses_request_context() {
        let err = classify(
            &HttpRequest::new(Method::Post, URL),
            &HttpResponse::new(409, r#"{"reference": "R"}"#),
            ErrorOverrides::default(),
        );
        assert_eq!(err.detail(), None);
        assert_eq!(err.reference(), Some("R"));
        assert_eq!(err.to_string(), format!("API Error 409 on POST {URL}"));
    }

    #[test]
    fn structured_detail_is_rendered_as_json_text() {
        let err = classify(
            &get(),
            &HttpResponse::new(422, r#"{"detail": [{"loc": ["query"], "msg": "bad"}]}"#),
            ErrorOverrides::default(),
        );
        let detail = err.detail().expect("detail");
        assert!(detail.contains("\"msg\":\"bad\""));
    }

    #[test]
    fn explicit_overrides_win_over_server_fields() {
        let err = classify(
            &get(),
            &HttpResponse::new(401, r#"{"detail": "server", "reference": "S"}"#),
            ErrorOverrides {
                detail: Some("local".to_string()),
                reference: Some("L".to_string()),
            },
        );
        assert_eq!(err.detail(), Some("local"));
        assert_eq!(err.reference(), Some("L"));
        assert_eq!(err.to_string(), "API Error 401: local");
    }

    #[test]
    fn json_array_body_is_tolerated() {
        let err = classify(
            &get(),
            &HttpResponse::new(500, "[1, 2]"),
            ErrorOverrides::default(),
        );
        assert!(matches!(err, AiodError::Server(_)));
        assert_eq!(err.detail(), Some("[1, 2]"));
    }
}
