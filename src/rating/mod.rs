pub mod actual;
pub mod elo;
pub mod replay;
pub mod types;

pub use actual::actual_result;
pub use elo::{expected_result, rating_change};
pub use replay::replay_season;
pub use types::{MatchOutcome, MatchRating, RatingValue, SeasonReplay, TeamStanding};
