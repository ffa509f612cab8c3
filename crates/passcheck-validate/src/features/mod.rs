//! The six audited feature areas.
//!
//! Every module follows the same shape: an `Inputs` struct of loaded
//! documents, a `Context` of indices built from them, a fixed `PHASES`
//! table, and `run(inputs, reporter) -> Ledger`.

mod common;
#[cfg(test)]
mod fixtures;
pub mod lottery;
pub mod reminders;
pub mod reward_track;
pub mod rfm_offers;
pub mod shop_offers;
pub mod weekly_quests;

/// A feature area together with what it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Reminders,
    Lottery,
    RewardTrack,
    WeeklyQuests,
    RfmOffers,
    ShopOffers,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Reminders,
        Feature::Lottery,
        Feature::RewardTrack,
        Feature::WeeklyQuests,
        Feature::RfmOffers,
        Feature::ShopOffers,
    ];

    /// Subcommand name.
    pub fn command(self) -> &'static str {
        match self {
            Feature::Reminders => "reminders",
            Feature::Lottery => "lottery",
            Feature::RewardTrack => "reward-track",
            Feature::WeeklyQuests => "weekly-quests",
            Feature::RfmOffers => "rfm-offers",
            Feature::ShopOffers => "shop-offers",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Feature::Reminders => "End news, double points and cash exchange",
            Feature::Lottery => "Lottery rewards",
            Feature::RewardTrack => "Main reward track",
            Feature::WeeklyQuests => "Weekly quests",
            Feature::RfmOffers => "RFM segment offers",
            Feature::ShopOffers => "Shop offers",
        }
    }

    /// What results are grouped under.
    pub fn subject(self) -> &'static str {
        match self {
            Feature::Reminders => "alias",
            Feature::Lottery | Feature::RewardTrack | Feature::ShopOffers => "action id",
            Feature::WeeklyQuests => "complexity id",
            Feature::RfmOffers => "offer name",
        }
    }

    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Feature::Reminders => &[
                "requirements",
                "end-news-promo",
                "double-points-promo",
                "promo",
            ],
            Feature::Lottery | Feature::RewardTrack | Feature::WeeklyQuests => {
                &["requirements", "promo", "actions"]
            }
            Feature::RfmOffers => &["requirements", "actions", "rfm-file NAME=PATH"],
            Feature::ShopOffers => &["requirements", "promo", "actions", "offers"],
        }
    }
}
