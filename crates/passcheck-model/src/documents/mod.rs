//! Typed schemas for the JSON configuration documents.
//!
//! Every field is optional or defaulted: authors leave out whatever a given
//! promo does not use, and the validators report absence explicitly.

mod actions;
mod offers;
mod promo;

pub use actions::{Action, ActionsCatalog, Award, AwardPacket, ExerciseConfig};
pub use offers::{Offer, OffersCatalog, Price};
pub use promo::{
    ActionCondition, BuyWindowOffer, ConditionSetting, Conditions, ControlSetting, FilterConditions,
    HeldItem, IdList, PromoDocument, PromoFilter, PromoParameters, Quest, QuestAwards,
    QuestExercises,
};
