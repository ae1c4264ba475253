use serde::{Deserialize, Serialize};

use super::error::ChallengeError;
use super::models::{Field, TeamId};

/// A value put forward by one team and awaiting the other team's confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion<T> {
    pub by: TeamId,
    pub value: T,
}

/// Suggest-by-one, confirm-by-the-other primitive.
///
/// The confirmed value and the pending suggestion are tracked separately; a
/// new suggestion replaces the pending one, and confirming commits it and
/// empties the pending slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationField<T> {
    field: Field,
    confirmed: Option<T>,
    pending: Option<Suggestion<T>>,
}

impl<T: Clone> NegotiationField<T> {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            confirmed: None,
            pending: None,
        }
    }

    pub fn with_value(field: Field, value: T) -> Self {
        Self {
            field,
            confirmed: Some(value),
            pending: None,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn value(&self) -> Option<&T> {
        self.confirmed.as_ref()
    }

    pub fn pending(&self) -> Option<&Suggestion<T>> {
        self.pending.as_ref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    pub fn ensure_confirmed(&self) -> Result<&T, ChallengeError> {
        self.confirmed
            .as_ref()
            .ok_or(ChallengeError::NotConfirmed(self.field))
    }

    pub fn ensure_unconfirmed(&self) -> Result<(), ChallengeError> {
        match self.confirmed {
            Some(_) => Err(ChallengeError::AlreadyConfirmed(self.field)),
            None => Ok(()),
        }
    }

    pub fn suggest(&mut self, by: TeamId, value: T) -> Result<(), ChallengeError> {
        self.ensure_unconfirmed()?;
        self.pending = Some(Suggestion { by, value });
        Ok(())
    }

    /// Pending suggestion `by` would be allowed to confirm.
    pub fn confirmable_by(&self, by: TeamId) -> Result<&Suggestion<T>, ChallengeError> {
        let suggestion = self
            .pending
            .as_ref()
            .ok_or(ChallengeError::NothingSuggested(self.field))?;
        if suggestion.by == by {
            return Err(ChallengeError::SelfConfirmation);
        }
        Ok(suggestion)
    }

    pub fn confirm(&mut self, by: TeamId) -> Result<T, ChallengeError> {
        self.confirmable_by(by)?;
        let Some(suggestion) = self.pending.take() else {
            return Err(ChallengeError::NothingSuggested(self.field));
        };
        self.confirmed = Some(suggestion.value.clone());
        Ok(suggestion.value)
    }

    /// Administrative override, bypassing suggest/confirm.
    pub fn set(&mut self, value: T) {
        self.confirmed = Some(value);
        self.pending = None;
    }

    pub fn clear(&mut self) {
        self.confirmed = None;
        self.pending = None;
    }

    pub fn clear_confirmed(&mut self) -> Option<T> {
        self.confirmed.take()
    }

    pub fn clear_pending(&mut self) -> Option<Suggestion<T>> {
        self.pending.take()
    }
}
