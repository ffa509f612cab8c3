use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scalar::Scalar;

/// The offers/pricing catalog.
///
/// `offers` nests offer objects in arrays of arbitrary depth; they are kept
/// as raw JSON and flattened on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffersCatalog {
    pub offers: Vec<Value>,
    pub prices: Vec<Price>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offer {
    #[serde(rename = "@id")]
    pub id: Option<Scalar>,
    #[serde(rename = "actionId")]
    pub action_id: Option<Scalar>,
    pub packet_id: Option<Scalar>,
    #[serde(rename = "USD")]
    pub usd: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Price {
    #[serde(rename = "@id")]
    pub id: Option<Scalar>,
    #[serde(rename = "USD")]
    pub usd: Option<Scalar>,
}

impl OffersCatalog {
    /// Every object carrying an `@id`, in document order. Objects that do
    /// not fit the offer shape are skipped.
    pub fn flatten_offers(&self) -> Vec<Offer> {
        let mut found = Vec::new();
        for value in &self.offers {
            collect_offers(value, &mut found);
        }
        found
    }

    pub fn price(&self, id: i64) -> Option<&Price> {
        self.prices
            .iter()
            .find(|price| price.id.as_ref().and_then(Scalar::as_i64) == Some(id))
    }
}

fn collect_offers(value: &Value, found: &mut Vec<Offer>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_offers(item, found);
            }
        }
        Value::Object(map) if map.contains_key("@id") => {
            if let Ok(offer) = serde_json::from_value::<Offer>(value.clone()) {
                found.push(offer);
            }
        }
        _ => {}
    }
}
