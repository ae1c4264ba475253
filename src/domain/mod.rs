pub mod adjudication;
pub mod admin;
pub mod challenge;
pub mod clock;
pub mod commands;
pub mod error;
pub mod events;
pub mod models;
pub mod negotiate;
pub mod negotiation;
pub mod rematch;
pub mod reporting;
pub mod stats;

pub use adjudication::Adjudication;
pub use challenge::{Challenge, ChallengeContext, ChallengeStatus};
pub use clock::{ChallengeHistory, ClockPolicy};
pub use commands::ChallengeCommand;
pub use error::ChallengeError;
pub use events::ChallengeEvent;
pub use models::{
    Actor, ChallengeId, Field, GameType, MapKind, MapSelection, PlayerId, StatLine, Team, TeamId,
};
pub use negotiation::{NegotiationField, Suggestion};
