pub mod found;
pub mod lost;
pub mod matching;
pub mod outcome;
pub mod result;

pub use found::{FoundCandidate, FoundItem};
pub use lost::{LostReport, LostSummary};
pub use matching::{MatchInput, MatchScore};
pub use outcome::{
    DisplayMatch, OwnerAlert, PotentialOwner, RefreshOutcome, SeedFoundOutcome,
    SeedLostOutcome, StrongMatch,
};
pub use result::{MatchRecord, OwnerRow, StoredMatchRow};
