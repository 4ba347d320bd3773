use serde::{Deserialize, Deserializer, Serialize};

/// Billing tier of a user. Anything other than FREE and STANDARD is unmetered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionType {
    Free,
    Standard,
    Other(String),
}

impl From<String> for SubscriptionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FREE" => SubscriptionType::Free,
            "STANDARD" => SubscriptionType::Standard,
            _ => SubscriptionType::Other(value),
        }
    }
}

impl From<SubscriptionType> for String {
    fn from(value: SubscriptionType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionType::Free => write!(f, "FREE"),
            SubscriptionType::Standard => write!(f, "STANDARD"),
            SubscriptionType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A document from the `users` collection, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(rename = "_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<SubscriptionType>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "integer_or_double"
    )]
    pub quota_remaining: Option<i64>,
}

/// Shell-edited documents store numbers as doubles; whole counts arrive as either.
fn integer_or_double<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Integer(i64),
        Double(f64),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        None => None,
        Some(Count::Integer(n)) => Some(n),
        Some(Count::Double(n)) => Some(n.floor() as i64),
    })
}

impl UserAccount {
    pub fn new(
        user_id: impl Into<String>,
        subscription_type: SubscriptionType,
        quota_remaining: Option<i64>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            subscription_type: Some(subscription_type),
            quota_remaining,
        }
    }

    /// True when a remaining quota is recorded and has run out.
    pub fn quota_exhausted(&self) -> bool {
        matches!(self.quota_remaining, Some(remaining) if remaining <= 0)
    }
}
