use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload understood by the rules service: weekday name, month name, year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EligibilityQuery {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl EligibilityQuery {
    pub fn for_date(now: DateTime<Utc>) -> Self {
        Self {
            day: now.format("%A").to_string(),
            month: now.format("%B").to_string(),
            year: now.format("%Y").to_string(),
        }
    }
}

#[async_trait]
pub trait EligibilityClient: Send + Sync {
    async fn is_eligible(
        &self,
        query: &EligibilityQuery,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_uses_names_not_numbers() {
        let date = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        let query = EligibilityQuery::for_date(date);
        assert_eq!(query.day, "Wednesday");
        assert_eq!(query.month, "December");
        assert_eq!(query.year, "2024");
    }
}
