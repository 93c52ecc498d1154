//! Shared HTTP plumbing

use serde::Deserialize;
use url::Url;

/// Error payload the backend sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

/// Join a request path onto the configured base URL.
pub(crate) fn join_endpoint(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

/// Pull the human-readable message out of an error response, falling
/// back to the status line when the body is not the expected shape.
pub(crate) async fn rejection_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => format!("HTTP {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_endpoint_trims_trailing_slash() {
        let base: Url = "https://api.kontor.app/v1/".parse().unwrap();
        assert_eq!(
            join_endpoint(&base, "/suppliers"),
            "https://api.kontor.app/v1/suppliers"
        );

        // Url normalizes a bare authority to a trailing slash
        let base: Url = "https://api.kontor.app".parse().unwrap();
        assert_eq!(
            join_endpoint(&base, "/refresh-token"),
            "https://api.kontor.app/refresh-token"
        );
    }
}
