use serde::Deserialize;

/// Inbound purchase request.
///
/// `total_amount` is whatever the client claims; it is never used for pricing.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub payment_method: String,
    pub continent: String,
    #[serde(default)]
    pub total_amount: Option<i64>,
    pub total_ticket: i32,
    #[serde(rename = "detail_ticket")]
    pub lines: Vec<PurchaseLine>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PurchaseLine {
    pub ticket_id: i64,
    pub ticket_type: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub city: String,
    pub quantity: i32,
}

impl PurchaseRequest {
    pub fn requested_quantity(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_request_deserialization() {
        let json = r#"
            {
                "payment_method": "bank_transfer",
                "continent": "Asia",
                "total_amount": 1,
                "total_ticket": 3,
                "detail_ticket": [
                    {"ticket_id": 1, "ticket_type": "VIP", "country_name": "Japan", "city": "Tokyo", "quantity": 1},
                    {"ticket_id": 2, "ticket_type": "CAT1", "quantity": 2}
                ]
            }
        "#;
        let req: PurchaseRequest = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(req.lines.len(), 2);
        assert_eq!(req.lines[1].city, "");
        assert_eq!(req.requested_quantity(), 3);
    }
}
