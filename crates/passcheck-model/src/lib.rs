pub mod check;
pub mod documents;
pub mod error;
pub mod ledger;
pub mod reporter;
pub mod requirement;
pub mod scalar;
pub mod subject;

pub use check::{CheckOutcome, CheckResult, Notice, Severity};
pub use documents::{
    Action, ActionCondition, ActionsCatalog, Award, AwardPacket, BuyWindowOffer, ConditionSetting,
    Conditions, ControlSetting, ExerciseConfig, HeldItem, IdList, Offer, OffersCatalog, Price,
    PromoDocument, PromoFilter, PromoParameters, Quest,
};
pub use error::{ModelError, Result};
pub use ledger::{Ledger, LedgerEntry, Recorded, SubjectIssues, Summary};
pub use reporter::{NullReporter, Reporter};
pub use requirement::{RequirementRow, RequirementTable};
pub use scalar::{Scalar, parse_float, parse_int};
pub use subject::SubjectKey;
