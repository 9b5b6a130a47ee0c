//! Error types for API calls.

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`] and the service traits.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No access token was configured.
    #[error("access token is required (use --access-token or DIGITALOCEAN_ACCESS_TOKEN)")]
    MissingToken,

    /// A URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{method} {url}: {status} {}{message}", request_label(.request_id))]
    Api {
        /// HTTP method of the failed request.
        method: String,
        /// Full request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Request ID reported by the API, if any.
        request_id: Option<String>,
        /// Error message from the response body.
        message: String,
    },

    /// A lookup by name found nothing.
    #[error("{0} not found")]
    NotFound(String),

    /// A response body could not be decoded.
    #[error("decoding {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of an [`ApiError::Api`] error.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API rejected the request with `409 Conflict`.
    pub const fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409))
    }
}

#[allow(clippy::ref_option)]
fn request_label(request_id: &Option<String>) -> String {
    match request_id {
        Some(id) if !id.is_empty() => format!("(request \"{id}\") "),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(request_id: Option<&str>) -> ApiError {
        ApiError::Api {
            method: "GET".into(),
            url: "https://api.example.com/v2/droplets/1".into(),
            status: 404,
            request_id: request_id.map(str::to_owned),
            message: "The resource you were accessing could not be found.".into(),
        }
    }

    #[test]
    fn test_api_error_display_with_request_id() {
        assert_eq!(
            api_error(Some("abc-123")).to_string(),
            "GET https://api.example.com/v2/droplets/1: 404 (request \"abc-123\") The resource you were accessing could not be found."
        );
    }

    #[test]
    fn test_api_error_display_without_request_id() {
        assert_eq!(
            api_error(None).to_string(),
            "GET https://api.example.com/v2/droplets/1: 404 The resource you were accessing could not be found."
        );
    }

    #[test]
    fn test_is_conflict() {
        let err = ApiError::Api {
            method: "POST".into(),
            url: "https://api.example.com/v2/apps".into(),
            status: 409,
            request_id: None,
            message: "app name already in use".into(),
        };
        assert!(err.is_conflict());
        assert!(!api_error(None).is_conflict());
        assert!(!ApiError::MissingToken.is_conflict());
    }

    #[test]
    fn test_not_found_display() {
        let err = ApiError::NotFound("app \"web\"".into());
        assert_eq!(err.to_string(), "app \"web\" not found");
    }
}
