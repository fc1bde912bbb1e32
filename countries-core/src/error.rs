use reqwest::StatusCode;
use thiserror::Error;

/// Failure at one of the external fetch boundaries.
///
/// These never reach the presentation layer: the resolver and the enricher
/// log them and degrade to an empty result.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Parse(_) => None,
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let err = FetchError::status(StatusCode::BAD_GATEWAY, &body);

        let FetchError::Status { body, .. } = &err else {
            panic!("expected status error");
        };
        assert_eq!(body.len(), 203);
        assert!(body.ends_with("..."));
        assert_eq!(err.http_status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(300);
        let err = FetchError::status(StatusCode::NOT_FOUND, &body);
        assert!(err.to_string().contains("404"));
    }
}
