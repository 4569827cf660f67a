use crate::error::DashError;
use serde::{Deserialize, Deserializer, Serialize};

/// Coin ids come back as strings from some endpoints and numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(n) => n.to_string(),
    })
}

/// One row of the cryptocurrency tables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CryptoSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub high_24h: f64,
    #[serde(default)]
    pub low_24h: f64,
    #[serde(default)]
    pub price_change_24h: f64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub market_cap_change_24h: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CoinImage {
    #[serde(default)]
    pub large: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CoinDescription {
    #[serde(default)]
    pub en: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinLink {
    pub link_type: String,
    pub link_value: String,
}

impl CoinLink {
    /// "official_site" -> "OFFICIAL SITE". Only the first underscore is replaced.
    pub fn label(&self) -> String {
        self.link_type.replacen('_', " ", 1).to_uppercase()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinDetail {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: CoinImage,
    #[serde(default)]
    pub description: CoinDescription,
    #[serde(default)]
    pub sentiment_votes_up_percentage: Option<f64>,
    #[serde(default)]
    pub sentiment_votes_down_percentage: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub developer_score: Option<f64>,
    #[serde(default)]
    pub community_score: Option<f64>,
    /// JSON document encoded as a string; see [`CoinDetail::market_data`].
    #[serde(default)]
    pub market_data: String,
    #[serde(default)]
    pub links: Vec<CoinLink>,
}

impl CoinDetail {
    pub fn market_data(&self) -> Result<MarketData, DashError> {
        if self.market_data.trim().is_empty() {
            return Err(DashError::InvalidData(format!(
                "coin '{}' has no market data",
                self.name
            )));
        }
        Ok(serde_json::from_str(&self.market_data)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UsdAmount {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: UsdAmount,
    #[serde(default)]
    pub market_cap: UsdAmount,
    #[serde(default)]
    pub high_24h: UsdAmount,
    #[serde(default)]
    pub low_24h: UsdAmount,
    #[serde(default)]
    pub total_volume: UsdAmount,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN_SUMMARY: &str = r#"{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "btc",
        "image": "https://assets.example/bitcoin.png",
        "current_price": 64123.5,
        "market_cap": 1262000000000.0,
        "high_24h": 65000.0,
        "low_24h": 63000.25,
        "price_change_24h": -512.75,
        "total_volume": 28000000000.0,
        "market_cap_change_24h": -9800000000.0
    }"#;

    #[test]
    fn test_summary_parsing() {
        let coin: CryptoSummary = serde_json::from_str(BITCOIN_SUMMARY).unwrap();
        assert_eq!(coin.id, "bitcoin");
        assert_eq!(coin.symbol, "btc");
        assert_eq!(coin.low_24h, 63000.25);
        assert_eq!(coin.price_change_24h, -512.75);
    }

    #[test]
    fn test_numeric_id_is_normalized() {
        let coin: CryptoSummary =
            serde_json::from_str(r#"{"id": 42, "name": "Tether", "symbol": "usdt"}"#).unwrap();
        assert_eq!(coin.id, "42");
        assert_eq!(coin.current_price, 0.0);
    }

    #[test]
    fn test_coin_detail_with_embedded_market_data() {
        let json = r#"{
            "id": "ethereum",
            "name": "Ethereum",
            "symbol": "eth",
            "image": {"large": "https://assets.example/eth-large.png"},
            "description": {"en": "<p>Smart contract platform</p>"},
            "sentimentVotesUpPercentage": 81.5,
            "sentimentVotesDownPercentage": 18.5,
            "categories": ["Smart Contract Platform", "Layer 1 (L1)"],
            "developerScore": 97.2,
            "communityScore": 68.1,
            "marketData": "{\"current_price\":{\"usd\":3120.4},\"market_cap\":{\"usd\":375000000000},\"high_24h\":{\"usd\":3200},\"low_24h\":{\"usd\":3050},\"total_volume\":{\"usd\":15000000000},\"market_cap_rank\":2}",
            "links": [{"linkType": "official_site", "linkValue": "https://ethereum.org"}]
        }"#;

        let coin: CoinDetail = serde_json::from_str(json).unwrap();
        assert_eq!(coin.image.large, "https://assets.example/eth-large.png");
        assert_eq!(coin.sentiment_votes_up_percentage, Some(81.5));
        assert_eq!(coin.categories.len(), 2);

        let market = coin.market_data().unwrap();
        assert_eq!(market.current_price.usd, Some(3120.4));
        assert_eq!(market.market_cap_rank, Some(2));
        assert_eq!(coin.links[0].label(), "OFFICIAL SITE");
    }

    #[test]
    fn test_missing_market_data_is_an_error() {
        let coin: CoinDetail =
            serde_json::from_str(r#"{"name": "Dogecoin", "symbol": "doge"}"#).unwrap();
        assert!(matches!(coin.market_data(), Err(DashError::InvalidData(_))));

        let broken = CoinDetail {
            market_data: "{not json".to_string(),
            ..coin
        };
        assert!(matches!(broken.market_data(), Err(DashError::Json(_))));
    }

    #[test]
    fn test_link_label_replaces_first_underscore_only() {
        let link = CoinLink {
            link_type: "subreddit_url_old".to_string(),
            link_value: "https://reddit.com/r/example".to_string(),
        };
        assert_eq!(link.label(), "SUBREDDIT URL_OLD");
    }
}
