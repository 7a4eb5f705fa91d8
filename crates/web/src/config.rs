use http::StatusCode;

/// Status codes and defaults applied by [`Reply`](crate::Reply).
///
/// `success` is the status every reply starts with. The error, redirect and
/// die helpers only replace the status while it is still `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyConfig {
    success: StatusCode,
    client_error: StatusCode,
    server_error: StatusCode,
    redirect: StatusCode,
    default_accept: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            success: StatusCode::OK,
            client_error: StatusCode::BAD_REQUEST,
            server_error: StatusCode::INTERNAL_SERVER_ERROR,
            redirect: StatusCode::FOUND,
            default_accept: mime::TEXT_PLAIN.to_string(),
        }
    }
}

impl ReplyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_success(mut self, status: StatusCode) -> Self {
        self.success = status;
        self
    }

    #[must_use]
    pub fn with_client_error(mut self, status: StatusCode) -> Self {
        self.client_error = status;
        self
    }

    #[must_use]
    pub fn with_server_error(mut self, status: StatusCode) -> Self {
        self.server_error = status;
        self
    }

    #[must_use]
    pub fn with_redirect(mut self, status: StatusCode) -> Self {
        self.redirect = status;
        self
    }

    /// The preference used when a request carries no `Accept` header
    #[must_use]
    pub fn with_default_accept(mut self, accept: impl Into<String>) -> Self {
        self.default_accept = accept.into();
        self
    }

    pub fn success(&self) -> StatusCode {
        self.success
    }

    pub fn client_error(&self) -> StatusCode {
        self.client_error
    }

    pub fn server_error(&self) -> StatusCode {
        self.server_error
    }

    pub fn redirect(&self) -> StatusCode {
        self.redirect
    }

    pub fn default_accept(&self) -> &str {
        &self.default_accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReplyConfig::default();

        assert_eq!(config.success(), StatusCode::OK);
        assert_eq!(config.client_error(), StatusCode::BAD_REQUEST);
        assert_eq!(config.server_error(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(config.redirect(), StatusCode::FOUND);
        assert_eq!(config.default_accept(), "text/plain");
    }

    #[test]
    fn builders_override() {
        let config = ReplyConfig::new()
            .with_client_error(StatusCode::UNPROCESSABLE_ENTITY)
            .with_redirect(StatusCode::SEE_OTHER)
            .with_default_accept("application/json");

        assert_eq!(config.client_error(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(config.redirect(), StatusCode::SEE_OTHER);
        assert_eq!(config.default_accept(), "application/json");
        assert_eq!(config.success(), StatusCode::OK);
    }
}
