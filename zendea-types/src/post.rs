use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of listing Zendea carries. Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "post_type", rename_all = "lowercase"))]
pub enum PostType {
    Job,
    Deal,
}

impl PostType {
    pub fn label(&self) -> &'static str {
        match self {
            PostType::Job => "JOB",
            PostType::Deal => "DEAL",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostType::Job => write!(f, "job"),
            PostType::Deal => write!(f, "deal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "post_status", rename_all = "lowercase"))]
pub enum PostStatus {
    Active,
    Removed,
}

/// Cadence attached to a price or salary figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "price_unit", rename_all = "lowercase"))]
pub enum PriceUnit {
    Hourly,
    Daily,
    Monthly,
    Yearly,
    Fixed,
}

impl PriceUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            PriceUnit::Hourly => "per hour",
            PriceUnit::Daily => "per day",
            PriceUnit::Monthly => "per month",
            PriceUnit::Yearly => "per year",
            PriceUnit::Fixed => "",
        }
    }
}

/// One classifieds listing. `id`, `created_at` and `updated_at` are assigned
/// by the store; `post_type` and `posted_by` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    pub id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub price_unit: Option<PriceUnit>,
    pub posted_by: Uuid,
    pub posted_by_name: String,
    pub status: PostStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Dollar amount with the cadence suffix, e.g. `$85,000 per year`.
    pub fn price_label(&self) -> Option<String> {
        let price = self.price?;
        let formatted = format_dollars(price);
        let suffix = self.price_unit.map(|u| u.suffix()).unwrap_or("");
        if suffix.is_empty() {
            Some(formatted)
        } else {
            Some(format!("{formatted} {suffix}"))
        }
    }
}

/// Whole-dollar formatting with thousands separators.
fn format_dollars(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post_with_price(price: Option<f64>, unit: Option<PriceUnit>) -> Post {
        Post {
            id: Uuid::new_v4(),
            post_type: PostType::Job,
            title: "Backend engineer".into(),
            description: "Build services".into(),
            location: Some("Berlin".into()),
            price,
            price_unit: unit,
            posted_by: Uuid::new_v4(),
            posted_by_name: "ada".into(),
            status: PostStatus::Active,
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn price_label_formats_thousands_and_suffix() {
        let post = post_with_price(Some(85000.0), Some(PriceUnit::Yearly));
        assert_eq!(post.price_label().as_deref(), Some("$85,000 per year"));
    }

    #[test]
    fn price_label_omits_suffix_for_fixed() {
        let post = post_with_price(Some(49.0), Some(PriceUnit::Fixed));
        assert_eq!(post.price_label().as_deref(), Some("$49"));
    }

    #[test]
    fn price_label_is_none_without_price() {
        let post = post_with_price(None, None);
        assert_eq!(post.price_label(), None);
    }

    #[test]
    fn post_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PostType::Job).unwrap(), "\"job\"");
        assert_eq!(serde_json::to_string(&PostType::Deal).unwrap(), "\"deal\"");
    }
}
