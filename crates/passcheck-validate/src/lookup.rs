//! First-match searches inside nested configuration lists.

use passcheck_model::{Award, ControlSetting, HeldItem, Scalar};

/// Discriminator for an entry of an award or resource list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `type == "item"` and `itemId == id`.
    Item(i64),
    /// `type == "buff"` and `id == id`.
    Buff(i64),
    /// Any entry of the given type, e.g. `cash`.
    Kind(String),
    /// `itemId == id` regardless of type.
    ItemId(i64),
}

impl Selector {
    /// Selector for a requirement's award type and id. Buffs are matched
    /// on `id`, items on `itemId`, other types by type alone.
    pub fn for_award(kind: &str, id: Option<i64>) -> Self {
        match (kind.to_lowercase().as_str(), id) {
            ("buff", Some(id)) => Selector::Buff(id),
            ("item", Some(id)) => Selector::Item(id),
            (other, _) => Selector::Kind(other.to_string()),
        }
    }

    pub fn matches(&self, award: &Award) -> bool {
        match self {
            Selector::Item(id) => award.is_kind("item") && same_id(award.item_id.as_ref(), *id),
            Selector::Buff(id) => award.is_kind("buff") && same_id(award.id.as_ref(), *id),
            Selector::Kind(kind) => award.is_kind(kind),
            Selector::ItemId(id) => same_id(award.item_id.as_ref(), *id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Selector::Item(id) => format!("item {id}"),
            Selector::Buff(id) => format!("buff {id}"),
            Selector::Kind(kind) => kind.clone(),
            Selector::ItemId(id) => format!("itemId {id}"),
        }
    }
}

fn same_id(value: Option<&Scalar>, id: i64) -> bool {
    value.and_then(Scalar::as_i64) == Some(id)
}

pub fn find_award<'a>(awards: &'a [Award], selector: &Selector) -> Option<&'a Award> {
    awards.iter().find(|award| selector.matches(award))
}

/// Control setting whose `displayObject` ends with `suffix`.
pub fn find_control_setting<'a>(
    settings: &'a [ControlSetting],
    suffix: &str,
) -> Option<&'a ControlSetting> {
    settings.iter().find(|setting| {
        setting
            .display_object
            .as_deref()
            .is_some_and(|object| object.ends_with(suffix))
    })
}

pub fn find_held_item(items: &[HeldItem], item_id: i64) -> Option<&HeldItem> {
    items
        .iter()
        .find(|item| same_id(item.item_id.as_ref(), item_id))
}

/// Render an optional leaf for reports.
pub fn show(value: Option<&Scalar>) -> Option<String> {
    value.map(ToString::to_string)
}
