use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// The actions catalog, either flat or split into groups.
///
/// Groups come first so that an empty array or a list of arrays never gets
/// read as a flat list of positional structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionsCatalog {
    Grouped(Vec<Vec<Action>>),
    Flat(Vec<Action>),
}

impl Default for ActionsCatalog {
    fn default() -> Self {
        ActionsCatalog::Flat(Vec::new())
    }
}

impl ActionsCatalog {
    pub fn actions(&self) -> Box<dyn Iterator<Item = &Action> + '_> {
        match self {
            ActionsCatalog::Grouped(groups) => Box::new(groups.iter().flatten()),
            ActionsCatalog::Flat(actions) => Box::new(actions.iter()),
        }
    }

    pub fn len(&self) -> usize {
        self.actions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.actions().next().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    #[serde(rename = "@id")]
    pub id: Option<Scalar>,
    pub awards: Vec<Award>,
    #[serde(rename = "needResources")]
    pub need_resources: Vec<Award>,
    #[serde(rename = "needAction")]
    pub need_action: Option<Scalar>,
    #[serde(rename = "awardPackets")]
    pub award_packets: Option<Vec<AwardPacket>>,
    #[serde(rename = "#children")]
    pub children: Vec<ExerciseConfig>,
}

impl Action {
    /// `needAction` when it is configured with a non-blank value.
    pub fn need_action(&self) -> Option<&Scalar> {
        self.need_action.as_ref().filter(|value| !value.is_blank())
    }
}

/// An award or resource entry. Buffs are identified by `id`, everything
/// else by `itemId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "itemId")]
    pub item_id: Option<Scalar>,
    pub id: Option<Scalar>,
    pub count: Option<Scalar>,
}

impl Award {
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(kind))
    }

    /// The identifier relevant for this award's type.
    pub fn identity(&self) -> Option<&Scalar> {
        if self.is_kind("buff") {
            self.id.as_ref()
        } else {
            self.item_id.as_ref()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardPacket {
    pub probability: Option<Scalar>,
    pub alias: Option<String>,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExerciseConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub alias: Option<String>,
    pub min_level: Option<Scalar>,
    pub max_level: Option<Scalar>,
    pub min_value: Option<Scalar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_catalog_reads_action_fields() {
        let catalog: ActionsCatalog = serde_json::from_str(
            r##"[{"@id": 101, "awards": [{"type": "buff", "id": 7, "count": 1}],
                 "needAction": "", "#children": [{"type": "kill", "minLevel": 5}]}]"##,
        )
        .expect("parse catalog");
        assert!(matches!(catalog, ActionsCatalog::Flat(_)));
        let action = catalog.actions().next().expect("one action");
        assert_eq!(action.id, Some(Scalar::Int(101)));
        assert_eq!(action.awards[0].identity(), Some(&Scalar::Int(7)));
        assert!(action.need_action().is_none());
        assert!(action.award_packets.is_none());
        assert_eq!(action.children[0].min_level, Some(Scalar::Int(5)));
    }

    #[test]
    fn grouped_catalog_flattens_groups() {
        let catalog: ActionsCatalog =
            serde_json::from_str(r#"[[{"@id": 1}, {"@id": 2}], [{"@id": 3}]]"#)
                .expect("parse grouped catalog");
        assert!(matches!(catalog, ActionsCatalog::Grouped(_)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn award_kind_matches_case_insensitively() {
        let award = Award {
            kind: Some("Item".to_string()),
            item_id: Some(Scalar::Int(17909)),
            ..Award::default()
        };
        assert!(award.is_kind("item"));
        assert_eq!(award.identity(), Some(&Scalar::Int(17909)));
    }
}
