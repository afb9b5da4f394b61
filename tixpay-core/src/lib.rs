pub mod eligibility;
pub mod identity;
pub mod inventory;
pub mod mock;
pub mod payment;
pub mod publisher;
pub mod repository;

/// Failure reported by a collaborator (HTTP service, gateway, broker).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("{service} responded with status {status}: {body}")]
    UpstreamError {
        service: &'static str,
        status: u16,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_failures_render_their_context() {
        let err = CoreError::UpstreamError {
            service: "ticket-service",
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(
            err.to_string(),
            "ticket-service responded with status 503: maintenance"
        );

        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(CoreError::InternalError("user-service unavailable".into()));
        assert!(boxed.downcast_ref::<CoreError>().is_some());
        assert_eq!(boxed.to_string(), "Internal service error: user-service unavailable");
    }
}
