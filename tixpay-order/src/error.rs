/// Outcome of an orchestration call that did not succeed.
///
/// The first three variants are business rejections with a reason the caller
/// may show; `Collaborator` carries internal detail that must only be logged.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("not eligible to purchase tickets at this time")]
    NotEligible,

    #[error("insufficient stock for ticket {ticket_id}: requested {requested}, available {available}")]
    InsufficientStock {
        ticket_id: i64,
        requested: i32,
        available: i64,
    },

    #[error("unknown ticket: {0}")]
    UnknownTicket(i64),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("{service} call failed: {source}")]
    Collaborator {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl OrderError {
    pub fn collaborator(
        service: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        OrderError::Collaborator { service, source }
    }

    /// Business-rule rejection that should reach the caller with its reason.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrderError::NotEligible
                | OrderError::InsufficientStock { .. }
                | OrderError::UnknownTicket(_)
        )
    }
}
