use std::collections::VecDeque;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAction {
    Choose(String),
    Close,
}

/// One scripted UI event, fired once the clock reaches `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedInput {
    pub at: Duration,
    pub action: ScriptedAction,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptParseError {
    #[error("expected <seconds>:<scene_id|close>, got {0:?}")]
    Shape(String),
    #[error("invalid time {0:?}")]
    Time(String),
}

impl FromStr for ScriptedInput {
    type Err = ScriptParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (time, action) = raw
            .trim()
            .split_once(':')
            .ok_or_else(|| ScriptParseError::Shape(raw.to_string()))?;
        let seconds: f64 = time
            .trim()
            .parse()
            .map_err(|_| ScriptParseError::Time(time.to_string()))?;
        let at = Duration::try_from_secs_f64(seconds)
            .map_err(|_| ScriptParseError::Time(time.to_string()))?;
        let action = action.trim();
        let action = if action.is_empty() {
            return Err(ScriptParseError::Shape(raw.to_string()));
        } else if action.eq_ignore_ascii_case("close") {
            ScriptedAction::Close
        } else {
            ScriptedAction::Choose(action.to_string())
        };
        Ok(ScriptedInput { at, action })
    }
}

/// Scripted input in firing order, keeping what has already been replayed.
#[derive(Debug, Clone, Default)]
pub struct ChoiceScript {
    pending: VecDeque<ScriptedInput>,
    history: Vec<ScriptedInput>,
}

impl ChoiceScript {
    pub fn new<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = ScriptedInput>,
    {
        let mut inputs: Vec<ScriptedInput> = inputs.into_iter().collect();
        inputs.sort_by_key(|input| input.at);
        ChoiceScript {
            pending: inputs.into(),
            history: Vec::new(),
        }
    }

    pub fn next_due(&mut self, now: Duration) -> Option<ScriptedAction> {
        if self.pending.front()?.at > now {
            return None;
        }
        let input = self.pending.pop_front()?;
        self.history.push(input.clone());
        Some(input.action)
    }

    pub fn next_at(&self) -> Option<Duration> {
        self.pending.front().map(|input| input.at)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[ScriptedInput] {
        &self.history
    }
}
