//! Wire models for the resources held by a cache session.
//!
//! Field names follow the node API's `PascalCase` JSON.

use serde::{Deserialize, Serialize};

/// Public profile attached to a user entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ProfileEntry {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, rename = "CoinPriceDeSoNanos")]
    pub coin_price_deso_nanos: u64,
}

/// A user as returned by `get-users-stateless`.
///
/// The followed-keys list is the field kept in sync locally by
/// follow/unfollow actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct UserEntry {
    pub public_key_base58_check: String,
    #[serde(default)]
    pub profile_entry_response: Option<ProfileEntry>,
    #[serde(default)]
    pub public_keys_base58_check_followed_by_user: Vec<String>,
    #[serde(default)]
    pub balance_nanos: u64,
    #[serde(default)]
    pub has_phone_number: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GetUsersResponse {
    #[serde(default)]
    pub user_list: Vec<UserEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ExchangeRateResponse {
    #[serde(default)]
    pub satoshis_per_de_so_exchange_rate: u64,
    #[serde(default)]
    pub nanos_sold: u64,
    #[serde(default, rename = "USDCentsPerBitcoinExchangeRate")]
    pub usd_cents_per_bitcoin_exchange_rate: u64,
    #[serde(default, rename = "USDCentsPerDeSoExchangeRate")]
    pub usd_cents_per_deso_exchange_rate: u64,
}

/// Exchange rate as consumed by price displays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    pub usd_cents_per_coin: u64,
    pub satoshis_per_coin: u64,
    pub usd_cents_per_bitcoin: u64,
}

impl ExchangeRate {
    pub fn usd_per_coin(&self) -> f64 {
        self.usd_cents_per_coin as f64 / 100.0
    }

    /// USD value of an amount expressed in nanos (1e-9 coin)
    pub fn nanos_to_usd(&self, nanos: u64) -> f64 {
        nanos as f64 / 1e9 * self.usd_per_coin()
    }
}

impl From<ExchangeRateResponse> for ExchangeRate {
    fn from(raw: ExchangeRateResponse) -> Self {
        Self {
            usd_cents_per_coin: raw.usd_cents_per_deso_exchange_rate,
            satoshis_per_coin: raw.satoshis_per_de_so_exchange_rate,
            usd_cents_per_bitcoin: raw.usd_cents_per_bitcoin_exchange_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PinnedPostResponse {
    #[serde(default)]
    pub post_hash_hex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SavedPostsResponse {
    #[serde(default)]
    pub saved_posts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_list_deserialization() {
        let json = r#"{
            "UserList": [{
                "PublicKeyBase58Check": "BC1YLabc",
                "ProfileEntryResponse": {"Username": "alice", "IsVerified": true},
                "PublicKeysBase58CheckFollowedByUser": ["BC1YLdef"],
                "BalanceNanos": 1500
            }]
        }"#;

        let response: GetUsersResponse = serde_json::from_str(json).unwrap();
        let user = &response.user_list[0];
        assert_eq!(user.public_key_base58_check, "BC1YLabc");
        assert_eq!(
            user.profile_entry_response.as_ref().unwrap().username,
            "alice"
        );
        assert_eq!(user.public_keys_base58_check_followed_by_user, vec!["BC1YLdef"]);
        assert_eq!(user.balance_nanos, 1500);
    }

    #[test]
    fn test_user_without_profile_or_follows() {
        let json = r#"{"PublicKeyBase58Check": "BC1YLabc"}"#;
        let user: UserEntry = serde_json::from_str(json).unwrap();
        assert!(user.profile_entry_response.is_none());
        assert!(user.public_keys_base58_check_followed_by_user.is_empty());
    }

    #[test]
    fn test_exchange_rate_conversion() {
        let json = r#"{
            "SatoshisPerDeSoExchangeRate": 31000,
            "NanosSold": 0,
            "USDCentsPerBitcoinExchangeRate": 6000000,
            "USDCentsPerDeSoExchangeRate": 1850
        }"#;

        let raw: ExchangeRateResponse = serde_json::from_str(json).unwrap();
        let rate = ExchangeRate::from(raw);
        assert_eq!(rate.usd_cents_per_coin, 1850);
        assert_eq!(rate.satoshis_per_coin, 31000);
        assert!((rate.usd_per_coin() - 18.5).abs() < f64::EPSILON);
        assert!((rate.nanos_to_usd(2_000_000_000) - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinned_post_missing_hash() {
        let raw: PinnedPostResponse = serde_json::from_str("{}").unwrap();
        assert!(raw.post_hash_hex.is_none());
    }
}
