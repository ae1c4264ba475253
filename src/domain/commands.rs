use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adjudication::Adjudication;
use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, GameType, PlayerId, StatLine, TeamId};

/// A typed request against one challenge, as sent by a host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChallengeCommand {
    SuggestGameType { game_type: GameType },
    ConfirmGameType,
    SetGameType { game_type: GameType },
    SuggestTeamSize { team_size: u8 },
    ConfirmTeamSize,
    SetTeamSize { team_size: u8 },
    PickMap { letter: char },
    SuggestMap { map: String },
    ConfirmMap,
    SetMap { map: String },
    SuggestTime { time: DateTime<Utc> },
    ConfirmTime,
    SetTime { time: DateTime<Utc> },
    SetHomeMapTeam { team: TeamId },
    Clock,
    Unclock,
    Adjudicate { adjudication: Adjudication },
    Report { first_score: i32, second_score: i32 },
    ConfirmReport,
    ForceReport {
        challenging_team_score: i32,
        challenged_team_score: i32,
    },
    AddStat { stat: StatLine },
    AddStats { stats: Vec<StatLine> },
    RemoveStat { team: TeamId, player: PlayerId },
    ClearStats,
    RequestRematch,
    Void,
    Unvoid,
    Lock,
    Unlock,
    SetCaster { caster: String },
    UnsetCaster,
    SetVod { url: String },
    SwapColors,
    SetOvertimePeriods { periods: u32 },
    SetPostseason { postseason: bool },
    Close,
}

impl ChallengeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ChallengeCommand::SuggestGameType { .. } => "suggestGameType",
            ChallengeCommand::ConfirmGameType => "confirmGameType",
            ChallengeCommand::SetGameType { .. } => "setGameType",
            ChallengeCommand::SuggestTeamSize { .. } => "suggestTeamSize",
            ChallengeCommand::ConfirmTeamSize => "confirmTeamSize",
            ChallengeCommand::SetTeamSize { .. } => "setTeamSize",
            ChallengeCommand::PickMap { .. } => "pickMap",
            ChallengeCommand::SuggestMap { .. } => "suggestMap",
            ChallengeCommand::ConfirmMap => "confirmMap",
            ChallengeCommand::SetMap { .. } => "setMap",
            ChallengeCommand::SuggestTime { .. } => "suggestTime",
            ChallengeCommand::ConfirmTime => "confirmTime",
            ChallengeCommand::SetTime { .. } => "setTime",
            ChallengeCommand::SetHomeMapTeam { .. } => "setHomeMapTeam",
            ChallengeCommand::Clock => "clock",
            ChallengeCommand::Unclock => "unclock",
            ChallengeCommand::Adjudicate { .. } => "adjudicate",
            ChallengeCommand::Report { .. } => "report",
            ChallengeCommand::ConfirmReport => "confirmReport",
            ChallengeCommand::ForceReport { .. } => "forceReport",
            ChallengeCommand::AddStat { .. } => "addStat",
            ChallengeCommand::AddStats { .. } => "addStats",
            ChallengeCommand::RemoveStat { .. } => "removeStat",
            ChallengeCommand::ClearStats => "clearStats",
            ChallengeCommand::RequestRematch => "requestRematch",
            ChallengeCommand::Void => "void",
            ChallengeCommand::Unvoid => "unvoid",
            ChallengeCommand::Lock => "lock",
            ChallengeCommand::Unlock => "unlock",
            ChallengeCommand::SetCaster { .. } => "setCaster",
            ChallengeCommand::UnsetCaster => "unsetCaster",
            ChallengeCommand::SetVod { .. } => "setVod",
            ChallengeCommand::SwapColors => "swapColors",
            ChallengeCommand::SetOvertimePeriods { .. } => "setOvertimePeriods",
            ChallengeCommand::SetPostseason { .. } => "setPostseason",
            ChallengeCommand::Close => "close",
        }
    }
}

impl Challenge {
    /// Runs a command against a working copy and keeps the result only when
    /// the whole operation succeeds.
    pub fn apply(
        &mut self,
        actor: &Actor,
        command: ChallengeCommand,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let mut next = self.clone();
        let events = next.dispatch(actor, command, ctx)?;
        *self = next;
        Ok(events)
    }

    fn dispatch(
        &mut self,
        actor: &Actor,
        command: ChallengeCommand,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        match command {
            ChallengeCommand::SuggestGameType { game_type } => {
                self.suggest_game_type(actor, game_type, ctx)
            }
            ChallengeCommand::ConfirmGameType => self.confirm_game_type(actor, ctx),
            ChallengeCommand::SetGameType { game_type } => self.set_game_type(actor, game_type, ctx),
            ChallengeCommand::SuggestTeamSize { team_size } => {
                self.suggest_team_size(actor, team_size, ctx)
            }
            ChallengeCommand::ConfirmTeamSize => self.confirm_team_size(actor, ctx),
            ChallengeCommand::SetTeamSize { team_size } => self.set_team_size(actor, team_size, ctx),
            ChallengeCommand::PickMap { letter } => self.pick_map(actor, letter, ctx),
            ChallengeCommand::SuggestMap { map } => self.suggest_map(actor, &map, ctx),
            ChallengeCommand::ConfirmMap => self.confirm_map(actor, ctx),
            ChallengeCommand::SetMap { map } => self.set_map(actor, &map, ctx),
            ChallengeCommand::SuggestTime { time } => self.suggest_time(actor, time, ctx),
            ChallengeCommand::ConfirmTime => self.confirm_time(actor, ctx),
            ChallengeCommand::SetTime { time } => self.set_time(actor, time),
            ChallengeCommand::SetHomeMapTeam { team } => self.set_home_map_team(actor, team, ctx),
            ChallengeCommand::Clock => self.clock(actor, ctx),
            ChallengeCommand::Unclock => self.unclock(actor),
            ChallengeCommand::Adjudicate { adjudication } => {
                self.adjudicate(actor, &adjudication, ctx)
            }
            ChallengeCommand::Report {
                first_score,
                second_score,
            } => self.report(actor, first_score, second_score, ctx),
            ChallengeCommand::ConfirmReport => self.confirm_report(actor, ctx),
            ChallengeCommand::ForceReport {
                challenging_team_score,
                challenged_team_score,
            } => self.force_report(actor, challenging_team_score, challenged_team_score, ctx),
            ChallengeCommand::AddStat { stat } => self.add_stat(actor, stat),
            ChallengeCommand::AddStats { stats } => self.add_stats(actor, stats),
            ChallengeCommand::RemoveStat { team, player } => self.remove_stat(actor, team, player),
            ChallengeCommand::ClearStats => self.clear_stats(actor),
            ChallengeCommand::RequestRematch => self.request_rematch(actor, ctx),
            ChallengeCommand::Void => self.void(actor, ctx.now),
            ChallengeCommand::Unvoid => self.unvoid(actor),
            ChallengeCommand::Lock => self.lock(actor),
            ChallengeCommand::Unlock => self.unlock(actor),
            ChallengeCommand::SetCaster { caster } => self.set_caster(actor, Some(caster)),
            ChallengeCommand::UnsetCaster => self.unset_caster(actor),
            ChallengeCommand::SetVod { url } => self.set_vod(actor, &url),
            ChallengeCommand::SwapColors => self.swap_colors(actor),
            ChallengeCommand::SetOvertimePeriods { periods } => {
                self.set_overtime_periods(actor, periods)
            }
            ChallengeCommand::SetPostseason { postseason } => self.set_postseason(actor, postseason),
            ChallengeCommand::Close => self.close(actor, ctx.now),
        }
    }
}
