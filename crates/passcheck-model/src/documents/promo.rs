use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::actions::Award;
use crate::scalar::Scalar;

/// A promo descriptor. The same shape covers the main promo, reminder
/// windows and RFM targeting documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoDocument {
    pub from: Option<String>,
    pub to: Option<String>,
    pub awards: Vec<Scalar>,
    pub filters: Vec<PromoFilter>,
    pub quests: Vec<Quest>,
    pub parameters: Option<PromoParameters>,
}

impl PromoDocument {
    /// Ids listed in `awards`, non-numeric entries skipped.
    pub fn award_ids(&self) -> Vec<i64> {
        self.awards.iter().filter_map(Scalar::as_i64).collect()
    }

    pub fn lists_award(&self, action: i64) -> bool {
        self.awards.iter().any(|award| award.as_i64() == Some(action))
    }

    /// The first `ActionContain` filter with the given compare mode.
    pub fn action_filter(&self, compare: &str) -> Option<&ActionCondition> {
        self.filters
            .iter()
            .filter(|filter| filter.kind.as_deref() == Some("ActionContain"))
            .filter_map(|filter| filter.conditions.actions.as_ref())
            .find(|actions| actions.compare.as_deref() == Some(compare))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromoParameters {
    pub season_pass_actions: Option<IdList>,
    pub battlepass_action: Option<Scalar>,
    pub promotion_award_multiplier: Option<Scalar>,
    pub promotion_award_multiplier_turn_on: Option<String>,
    pub items_to_cash_exchange: Option<Scalar>,
    pub buy_window_params: Option<BTreeMap<String, BuyWindowOffer>>,
    pub control_settings: Vec<ControlSetting>,
    pub settings_by_conditions: Vec<ConditionSetting>,
}

impl PromoParameters {
    /// Actions that belong to the season pass itself rather than to the track.
    pub fn service_actions(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .season_pass_actions
            .iter()
            .flat_map(|list| list.0.iter())
            .filter_map(Scalar::as_i64)
            .collect();
        ids.extend(self.battlepass_action.as_ref().and_then(Scalar::as_i64));
        ids
    }
}

/// A list of ids that may also be written as a single scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IdListRepr")]
pub struct IdList(pub Vec<Scalar>);

impl IdList {
    /// Comma-joined rendering used when comparing against requirement cells.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.iter().any(|value| value.as_i64() == Some(id))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdListRepr {
    Many(Vec<Scalar>),
    One(Scalar),
}

impl From<IdListRepr> for IdList {
    fn from(repr: IdListRepr) -> Self {
        match repr {
            IdListRepr::Many(values) => IdList(values),
            IdListRepr::One(value) => IdList(vec![value]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoFilter {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub conditions: FilterConditions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConditions {
    pub actions: Option<ActionCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCondition {
    pub compare: Option<String>,
    pub items: IdList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuyWindowOffer {
    #[serde(rename = "actionId")]
    pub action_id: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlSetting {
    pub display_object: Option<String>,
    pub text_key_fit: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionSetting {
    pub conditions: Conditions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    #[serde(rename = "isNotInOneOfRFM30Segments")]
    pub excluded_segments: Option<IdList>,
    #[serde(rename = "hasItems")]
    pub has_items: Vec<HeldItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeldItem {
    #[serde(rename = "itemID")]
    pub item_id: Option<Scalar>,
    pub count: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quest {
    pub id: Option<Scalar>,
    pub exercises: QuestExercises,
    pub awards: QuestAwards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestExercises {
    pub list: Vec<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestAwards {
    pub custom: Vec<Award>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMO: &str = r#"{
        "from": "2024-05-01 10:00:00",
        "to": "2024-05-31 23:59:59",
        "awards": [101, "102", "x"],
        "filters": [
            {"type": "ActionContain", "conditions": {"actions": {"compare": "any", "items": [1, 2]}}},
            {"type": "ActionContain", "conditions": {"actions": {"compare": "not", "items": "3"}}}
        ],
        "parameters": {
            "seasonPassActions": [500, 501],
            "battlepassAction": 502,
            "buyWindowParams": {"passOffer": {"actionId": 900}},
            "settingsByConditions": [
                {"conditions": {"isNotInOneOfRFM30Segments": "a,b", "hasItems": [{"itemID": 17908, "count": 3}]}}
            ]
        }
    }"#;

    #[test]
    fn promo_document_reads_loose_fields() {
        let promo: PromoDocument = serde_json::from_str(PROMO).expect("parse promo");
        assert_eq!(promo.award_ids(), vec![101, 102]);
        assert!(promo.lists_award(102));
        assert_eq!(
            promo.action_filter("any").map(|filter| filter.items.joined()),
            Some("1,2".to_string())
        );
        assert_eq!(
            promo.action_filter("not").map(|filter| filter.items.joined()),
            Some("3".to_string())
        );

        let parameters = promo.parameters.expect("parameters");
        assert_eq!(parameters.service_actions(), vec![500, 501, 502]);
        let conditions = &parameters.settings_by_conditions[0].conditions;
        assert_eq!(
            conditions.excluded_segments.as_ref().map(IdList::joined),
            Some("a,b".to_string())
        );
        assert_eq!(conditions.has_items[0].count, Some(Scalar::Int(3)));
    }

    #[test]
    fn empty_object_is_an_empty_promo() {
        let promo: PromoDocument = serde_json::from_str("{}").expect("parse promo");
        assert_eq!(promo, PromoDocument::default());
    }
}
