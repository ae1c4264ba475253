use super::challenge::Challenge;
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, GameType, PlayerId, StatLine, TeamId};

impl Challenge {
    pub(crate) fn stat_count(&self, team: TeamId) -> usize {
        self.stats.iter().filter(|s| s.team_id == team).count()
    }

    /// Records or replaces a player's stat line.
    pub fn add_stat(
        &mut self,
        actor: &Actor,
        line: StatLine,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_stats_editable()?;
        let team_size = *self.team_size.ensure_confirmed()?;

        let (team, player) = (line.team_id, line.player_id);
        let mut stats = self.stats.clone();
        insert_stat(&mut stats, line, self, team_size)?;
        self.stats = stats;

        Ok(vec![ChallengeEvent::StatAdded { team, player }])
    }

    /// Bulk import, usually from a match log.
    ///
    /// When the import leaves both teams with a full set of lines, the score
    /// is recomputed from the per-player totals and replaces whatever was
    /// reported by hand.
    pub fn add_stats(
        &mut self,
        actor: &Actor,
        lines: Vec<StatLine>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_stats_editable()?;
        let team_size = *self.team_size.ensure_confirmed()?;

        let mut stats = self.stats.clone();
        let mut events = Vec::with_capacity(lines.len() + 1);
        for line in lines {
            let (team, player) = (line.team_id, line.player_id);
            insert_stat(&mut stats, line, self, team_size)?;
            events.push(ChallengeEvent::StatAdded { team, player });
        }
        let count = |team: TeamId| stats.iter().filter(|s| s.team_id == team).count();
        let complete = count(self.challenging_team_id) == team_size as usize
            && count(self.challenged_team_id) == team_size as usize;
        if complete {
            let (challenging_team_score, challenged_team_score) =
                self.inferred_scores_from(&stats)?;
            let score_changed =
                self.scores() != Some((challenging_team_score, challenged_team_score));
            self.challenging_team_score = Some(challenging_team_score);
            self.challenged_team_score = Some(challenged_team_score);
            events.push(ChallengeEvent::StatsImported {
                score_changed,
                rated: self.is_confirmed(),
                challenging_team_score,
                challenged_team_score,
            });
        }
        self.stats = stats;
        Ok(events)
    }

    pub fn remove_stat(
        &mut self,
        actor: &Actor,
        team: TeamId,
        player: PlayerId,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_stats_editable()?;
        let index = self
            .stats
            .iter()
            .position(|s| s.team_id == team && s.player_id == player)
            .ok_or(ChallengeError::StatNotFound { team, player })?;
        self.stats.remove(index);
        Ok(vec![ChallengeEvent::StatRemoved { team, player }])
    }

    pub fn clear_stats(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_stats_editable()?;
        self.stats.clear();
        Ok(vec![ChallengeEvent::StatsCleared])
    }

    /// Team totals of the scoring stat for the confirmed game type.
    pub fn inferred_scores(&self) -> Result<(i32, i32), ChallengeError> {
        self.inferred_scores_from(&self.stats)
    }

    fn inferred_scores_from(&self, stats: &[StatLine]) -> Result<(i32, i32), ChallengeError> {
        let game_type = self
            .game_type
            .value()
            .copied()
            .unwrap_or(GameType::TeamAnarchy);
        let total = |team: TeamId| -> Result<i32, ChallengeError> {
            let total: i64 = stats
                .iter()
                .filter(|s| s.team_id == team)
                .map(|s| s.score_contribution(game_type))
                .sum();
            i32::try_from(total).map_err(|_| ChallengeError::ScoreOutOfRange { team, total })
        };
        Ok((total(self.challenging_team_id)?, total(self.challenged_team_id)?))
    }

    fn ensure_stats_editable(&self) -> Result<(), ChallengeError> {
        self.ensure_not_voided()?;
        if self.date_closed.is_some() {
            return Err(ChallengeError::MatchClosed);
        }
        Ok(())
    }
}

fn insert_stat(
    stats: &mut Vec<StatLine>,
    line: StatLine,
    challenge: &Challenge,
    team_size: u8,
) -> Result<(), ChallengeError> {
    if !challenge.involves(line.team_id) {
        return Err(ChallengeError::NotInChallenge(line.team_id));
    }
    if stats
        .iter()
        .any(|s| s.player_id == line.player_id && s.team_id != line.team_id)
    {
        return Err(ChallengeError::PlayerOnOtherTeam(line.player_id));
    }

    if let Some(existing) = stats
        .iter_mut()
        .find(|s| s.player_id == line.player_id && s.team_id == line.team_id)
    {
        *existing = line;
        return Ok(());
    }

    let on_team = stats.iter().filter(|s| s.team_id == line.team_id).count();
    if on_team >= team_size as usize {
        return Err(ChallengeError::TeamStatsFull(line.team_id));
    }
    stats.push(line);
    Ok(())
}
