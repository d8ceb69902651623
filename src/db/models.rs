//! Database Models - structs representing database tables (used by sqlx/serde).
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Serde adapter for the `MM-DD-YYYY` calendar-date wire format used by
/// subscription start/end dates. Stored as SQL `DATE` internally.
pub mod mdy_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%m-%d-%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Recipe approval state. Inputs are accepted case-insensitively
/// ("approved" and "Approved" both parse); storage and serialization use
/// the canonical capitalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status: {}", other)),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "Pending"),
            ApprovalStatus::Approved => write!(f, "Approved"),
            ApprovalStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl<'de> Deserialize<'de> for ApprovalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Subscription lifecycle state. Derived lazily from the end date by the
/// expiry sweep rather than maintained continuously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "Active"),
            SubscriptionStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

impl<'de> Deserialize<'de> for SubscriptionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A quantity is either a number (2.5) or free text ("a pinch").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

/// One ingredient line within a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub ingredient: String,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
}

/// Recipe model. The set of compensated viewers lives in the separate
/// `recipe_viewers` table so membership can be claimed atomically.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: Json<Vec<Ingredient>>,
    pub steps: Vec<String>,
    pub writer_id: Uuid,
    pub is_premium: bool,
    pub category: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approval_date: Option<DateTime<Utc>>,
    pub creation_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub num_of_views: i64,
}

/// Recipe writer account. `status` gates publishing; the compensation
/// balance is mutated only by the view-credit transaction and by admin
/// moderation.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWriter {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: ApprovalStatus,
    pub compensation_balance: f64,
    pub dob: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub favorites: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Subscriber account. Carries a compensation balance of its own because
/// subscribers may author recipes.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub compensation_balance: f64,
    pub dob: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub favorites: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Admin account. One admin acts as the platform revenue ledger; `amount`
/// accumulates the per-view platform share.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Subscription model. Dates are calendar values; the end date means
/// "expires at the start of this date".
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "mdy_date")]
    pub start_date: NaiveDate,
    #[serde(with = "mdy_date")]
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
}

/// Payment record. The card number is stored masked (last four digits only)
/// and the security code is never persisted.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub amount: f64,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub payment_date: DateTime<Utc>,
    pub payment_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_status_parses_case_insensitively() {
        assert_eq!(
            "approved".parse::<ApprovalStatus>().unwrap(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            "Approved".parse::<ApprovalStatus>().unwrap(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            "  REJECTED ".parse::<ApprovalStatus>().unwrap(),
            ApprovalStatus::Rejected
        );
        assert!("published".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn test_approval_status_serializes_normalized() {
        let s = serde_json::to_string(&ApprovalStatus::Approved).unwrap();
        assert_eq!(s, "\"Approved\"");
        let parsed: ApprovalStatus = serde_json::from_str("\"aPpRoVeD\"").unwrap();
        assert_eq!(parsed, ApprovalStatus::Approved);
    }

    #[test]
    fn test_subscription_status_round_trip() {
        let parsed: SubscriptionStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, SubscriptionStatus::Active);
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Inactive).unwrap(),
            "\"Inactive\""
        );
    }

    #[test]
    fn test_mdy_date_round_trip() {
        let sub = Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            status: SubscriptionStatus::Active,
        };
        let json = serde_json::to_string(&sub).unwrap();
        assert!(json.contains("\"startDate\":\"03-15-2024\""));
        assert!(json.contains("\"endDate\":\"03-15-2025\""));

        let back: Subscription = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start_date, sub.start_date);
        assert_eq!(back.end_date, sub.end_date);
    }

    #[test]
    fn test_quantity_accepts_number_or_text() {
        let numeric: Ingredient =
            serde_json::from_str(r#"{"ingredient":"flour","quantity":2.5,"measurement":"cups"}"#)
                .unwrap();
        assert_eq!(numeric.quantity, Quantity::Number(2.5));

        let free_text: Ingredient =
            serde_json::from_str(r#"{"ingredient":"salt","quantity":"a pinch"}"#).unwrap();
        assert_eq!(free_text.quantity, Quantity::Text("a pinch".to_string()));
        assert!(free_text.measurement.is_none());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let admin = Admin {
            id: Uuid::new_v4(),
            first_name: "Plat".to_string(),
            last_name: "Form".to_string(),
            email: "platform@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            amount: 1.20,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"amount\":1.2"));
    }
}
