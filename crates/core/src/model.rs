//! Model trait: the abstraction over whatever decides the next step.
//!
//! The model receives the rendered thread and answers with exactly one
//! [`ProposedAction`]. Prompting, provider choice, and output parsing all live
//! behind this trait; implementations are expected to validate their output
//! against the action union (see [`ProposedAction::from_model_output`]).

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::action::ProposedAction;
use crate::error::ModelError;

#[async_trait]
pub trait NextStepModel: Send + Sync {
    /// A short name for logs (e.g. "baml", "scripted").
    fn name(&self) -> &str;

    /// Propose the next action given the rendered thread.
    async fn determine_next_step(&self, context: &str) -> Result<ProposedAction, ModelError>;
}

/// A model that replays a fixed sequence of outcomes.
///
/// Records every context it is handed so transcripts can be asserted on.
/// Once the script runs out, every call fails with [`ModelError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Result<ProposedAction, ModelError>>>,
    contexts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(steps: impl IntoIterator<Item = Result<ProposedAction, ModelError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// A script where every step succeeds.
    pub fn from_actions(actions: impl IntoIterator<Item = ProposedAction>) -> Self {
        Self::new(actions.into_iter().map(Ok))
    }

    /// A script of raw model outputs, one JSON object per line.
    ///
    /// Blank lines are skipped. Lines that are not a known action are kept as
    /// protocol errors and surface when their turn comes.
    pub fn from_jsonl(script: &str) -> Self {
        Self::new(
            script
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ProposedAction::from_model_output),
        )
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        lock(&self.contexts).len()
    }

    /// Every context passed in, in call order.
    pub fn contexts(&self) -> Vec<String> {
        lock(&self.contexts).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.steps).len()
    }
}

#[async_trait]
impl NextStepModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn determine_next_step(&self, context: &str) -> Result<ProposedAction, ModelError> {
        lock(&self.contexts).push(context.to_string());
        let step = lock(&self.steps).pop_front();
        step.unwrap_or_else(|| Err(ModelError::Unavailable("script exhausted".into())))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Number;

    #[tokio::test]
    async fn replays_steps_in_order_and_records_contexts() {
        let model = ScriptedModel::from_actions([
            ProposedAction::Add {
                a: Number::Int(2),
                b: Number::Int(3),
            },
            ProposedAction::DoneForNow {
                message: "5".into(),
            },
        ]);

        let first = model.determine_next_step("ctx-1").await.unwrap();
        let second = model.determine_next_step("ctx-2").await.unwrap();

        assert!(matches!(first, ProposedAction::Add { .. }));
        assert!(matches!(second, ProposedAction::DoneForNow { .. }));
        assert_eq!(model.contexts(), vec!["ctx-1", "ctx-2"]);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_is_unavailable() {
        let model = ScriptedModel::default();
        let err = model.determine_next_step("ctx").await.unwrap_err();
        assert!(matches!(err, ModelError::Unavailable(_)));
    }

    #[tokio::test]
    async fn jsonl_script_defers_protocol_errors() {
        let model = ScriptedModel::from_jsonl(
            r#"
            {"intent":"multiply","a":3,"b":4}

            {"intent":"summon_dragon"}
            "#,
        );
        assert_eq!(model.remaining(), 2);
        assert!(model.determine_next_step("a").await.is_ok());
        let err = model.determine_next_step("b").await.unwrap_err();
        assert!(matches!(err, ModelError::UnrecognizedAction { .. }));
    }
}
