//! Quote model for pluridesk-service.

use super::IllegalTransition;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Quote status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(QuoteStatus::Draft),
            "sent" => Some(QuoteStatus::Sent),
            "accepted" => Some(QuoteStatus::Accepted),
            "rejected" => Some(QuoteStatus::Rejected),
            _ => None,
        }
    }

    /// Advance the lifecycle. Skipping `sent` is permitted; leaving a
    /// terminal state is not.
    pub fn transition_to(self, target: QuoteStatus) -> Result<QuoteStatus, IllegalTransition> {
        use QuoteStatus::*;
        match (self, target) {
            (Draft, Sent) | (Draft, Accepted) | (Draft, Rejected) => Ok(target),
            (Sent, Accepted) | (Sent, Rejected) => Ok(target),
            (from, to) => Err(IllegalTransition {
                kind: "quote",
                from: from.as_str(),
                to: to.as_str(),
            }),
        }
    }
}

/// Quote document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub quote_id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub quote_number: String,
    pub currency: String,
    pub status: String,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Line item on a quote. `amount` is stamped at write time and never
/// recomputed on read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteItem {
    pub quote_item_id: Uuid,
    pub quote_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub sort_order: i32,
}

/// Input for one line item on a new quote.
#[derive(Debug, Clone)]
pub struct CreateQuoteItem {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// Input for updating a quote.
#[derive(Debug, Clone, Default)]
pub struct UpdateQuote {
    pub status: Option<QuoteStatus>,
    pub notes: Option<String>,
}

/// Filter parameters for listing quotes.
#[derive(Debug, Clone, Default)]
pub struct ListQuotesFilter {
    pub status: Option<QuoteStatus>,
    pub page: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_can_reach_every_other_state() {
        for target in [QuoteStatus::Sent, QuoteStatus::Accepted, QuoteStatus::Rejected] {
            assert_eq!(QuoteStatus::Draft.transition_to(target), Ok(target));
        }
    }

    #[test]
    fn sent_can_only_be_decided() {
        assert_eq!(
            QuoteStatus::Sent.transition_to(QuoteStatus::Accepted),
            Ok(QuoteStatus::Accepted)
        );
        assert_eq!(
            QuoteStatus::Sent.transition_to(QuoteStatus::Rejected),
            Ok(QuoteStatus::Rejected)
        );
        assert!(QuoteStatus::Sent.transition_to(QuoteStatus::Draft).is_err());
    }

    #[test]
    fn accepted_and_rejected_are_terminal() {
        for from in [QuoteStatus::Accepted, QuoteStatus::Rejected] {
            for to in [
                QuoteStatus::Draft,
                QuoteStatus::Sent,
                QuoteStatus::Accepted,
                QuoteStatus::Rejected,
            ] {
                assert!(from.transition_to(to).is_err());
            }
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(QuoteStatus::parse("sent"), Some(QuoteStatus::Sent));
        assert_eq!(QuoteStatus::parse("archived"), None);
    }

    #[test]
    fn illegal_transition_names_both_states() {
        let err = QuoteStatus::Rejected
            .transition_to(QuoteStatus::Accepted)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal quote status transition: rejected -> accepted"
        );
    }
}
