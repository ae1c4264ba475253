use log::info;

use crate::domain::{ChallengeEvent, ChallengeId, TeamId};

/// Where a notification should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Everyone following the challenge, both teams and staff.
    Challenge(ChallengeId),
    Team(TeamId),
}

/// Message sink supplied by the host, e.g. a chat bot.
pub trait Notifier: Send + Sync {
    fn notify(&self, recipient: Recipient, text: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, recipient: Recipient, text: &str) {
        info!("[{:?}] {}", recipient, text);
    }
}

pub fn announce(notifier: &dyn Notifier, challenge_id: ChallengeId, events: &[ChallengeEvent]) {
    for event in events {
        let text = event.describe();
        notifier.notify(Recipient::Challenge(challenge_id), &text);
        if let ChallengeEvent::Penalized { team } = event {
            notifier.notify(Recipient::Team(*team), &text);
        }
    }
}
