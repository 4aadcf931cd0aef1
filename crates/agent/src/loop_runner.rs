//! The agent loop implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use steward_core::action::ProposedAction;
use steward_core::agent::{AgentConfig, LoopState};
use steward_core::effect::ToolOutput;
use steward_core::error::{Error, ModelError};
use steward_core::event::{DomainEvent, EventBus};
use steward_core::model::NextStepModel;
use steward_core::thread::{Event, Thread};
use steward_tools::Dispatcher;
use tracing::{debug, info, warn};

/// Drives one conversation's thread until it needs a human.
///
/// An `AgentLoop` holds no per-conversation state and can be shared across
/// threads; each [`run`](Self::run) borrows its thread exclusively.
pub struct AgentLoop {
    /// Proposes the next step
    model: Arc<dyn NextStepModel>,

    /// Executes auto-approved (and human-approved) actions
    dispatcher: Arc<Dispatcher>,

    /// Name of the working agent
    name: String,

    /// Maximum model calls per `run`
    max_iterations: u32,

    /// Timeout around each model call
    model_timeout: Option<Duration>,

    /// Optional event bus for domain events
    event_bus: Option<Arc<EventBus>>,
}

impl AgentLoop {
    /// Create a new agent loop with default settings.
    pub fn new(model: Arc<dyn NextStepModel>, dispatcher: Arc<Dispatcher>) -> Self {
        Self::from_config(&AgentConfig::default(), model, dispatcher)
    }

    /// Create an agent loop from configuration.
    pub fn from_config(
        config: &AgentConfig,
        model: Arc<dyn NextStepModel>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            model,
            dispatcher,
            name: config.name.clone(),
            max_iterations: config.max_iterations,
            model_timeout: config
                .model_timeout_secs
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            event_bus: None,
        }
    }

    /// Set the working agent's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the maximum number of model calls per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set (or clear) the timeout around each model call.
    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Publish domain events to the given bus.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the loop until the thread needs a human.
    ///
    /// Returns the suspension state; the thread holds everything that
    /// happened, including the proposal that caused the suspension. A thread
    /// that is already suspended is returned untouched, without a model call.
    ///
    /// Errors end the run and are never retried here:
    /// - an empty thread fails before the model is called
    /// - a model failure or unrecognized action records nothing
    /// - a tool fault is recorded as an error `tool_response`, then returned
    pub async fn run(&self, thread: &mut Thread) -> Result<LoopState, Error> {
        let result = self.drive(thread).await;
        if let Err(e) = &result {
            warn!(thread_id = %thread.id(), agent = %self.name, error = %e, "Agent loop stopped");
            self.publish(DomainEvent::ErrorOccurred {
                thread_id: thread.id().to_string(),
                error_message: e.to_string(),
                timestamp: Utc::now(),
            });
        }
        result
    }

    /// Execute the action awaiting approval and record its result.
    ///
    /// This is the caller's half of an approval suspension: once a human has
    /// signed off, call this and then [`run`](Self::run) again.
    pub async fn approve(&self, thread: &mut Thread) -> Result<ToolOutput, Error> {
        let action = self.pending_approval(thread)?;
        info!(
            thread_id = %thread.id(),
            agent = %self.name,
            intent = %action.intent(),
            "Pending action approved"
        );
        self.execute(thread, &action).await
    }

    /// Record that a human declined the action awaiting approval.
    ///
    /// The action is not executed; the next [`run`](Self::run) lets the model
    /// see the rejection and propose something else.
    pub fn reject(&self, thread: &mut Thread, reason: impl Into<String>) -> Result<(), Error> {
        let action = self.pending_approval(thread)?;
        info!(
            thread_id = %thread.id(),
            agent = %self.name,
            intent = %action.intent(),
            "Pending action rejected"
        );
        thread.append(Event::approval_rejected(reason));
        Ok(())
    }

    async fn drive(&self, thread: &mut Thread) -> Result<LoopState, Error> {
        let state = thread.state()?;
        if state.is_suspended() {
            debug!(thread_id = %thread.id(), %state, "Thread already suspended, nothing to do");
            return Ok(state);
        }

        info!(
            thread_id = %thread.id(),
            agent = %self.name,
            events = thread.len(),
            "Running agent loop"
        );

        let mut iteration = 0;
        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(Error::IterationLimit {
                    limit: self.max_iterations,
                });
            }

            debug!(thread_id = %thread.id(), iteration, "Agent loop iteration");

            let action = self.next_step(thread).await?;
            let intent = action.intent();
            debug!(thread_id = %thread.id(), iteration, %intent, "Model proposed next step");

            thread.append(Event::tool_call(action.clone()));
            self.publish(DomainEvent::ActionProposed {
                thread_id: thread.id().to_string(),
                agent: self.name.clone(),
                intent,
                timestamp: Utc::now(),
            });

            match thread.state()? {
                LoopState::Running => {
                    self.execute(thread, &action).await?;
                }
                suspended => {
                    info!(
                        thread_id = %thread.id(),
                        agent = %self.name,
                        %intent,
                        state = %suspended,
                        "Agent loop suspended"
                    );
                    self.publish(DomainEvent::LoopSuspended {
                        thread_id: thread.id().to_string(),
                        agent: self.name.clone(),
                        state: suspended,
                        timestamp: Utc::now(),
                    });
                    return Ok(suspended);
                }
            }
        }
    }

    async fn next_step(&self, thread: &Thread) -> Result<ProposedAction, ModelError> {
        let context = thread.render_context();
        let call = self.model.determine_next_step(&context);
        match self.model_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ModelError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => call.await,
        }
    }

    async fn execute(
        &self,
        thread: &mut Thread,
        action: &ProposedAction,
    ) -> Result<ToolOutput, Error> {
        let start = Instant::now();
        let result = self.dispatcher.apply(action).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.publish(DomainEvent::ToolExecuted {
            thread_id: thread.id().to_string(),
            intent: action.intent(),
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        match result {
            Ok(output) => {
                thread.append(Event::tool_response(&output));
                Ok(output)
            }
            Err(e) => {
                thread.append(Event::tool_error(&e));
                Err(e.into())
            }
        }
    }

    fn pending_approval(&self, thread: &Thread) -> Result<ProposedAction, Error> {
        let last = thread.last()?;
        thread
            .pending_approval()
            .cloned()
            .ok_or_else(|| Error::NotAwaitingApproval {
                last_event: last.tag().to_string(),
            })
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_core::action::{Intent, Number};
    use steward_core::error::{ThreadError, ToolError};
    use steward_core::model::ScriptedModel;
    use steward_core::thread::{Payload, kinds};

    fn add(a: i64, b: i64) -> ProposedAction {
        ProposedAction::Add {
            a: Number::Int(a),
            b: Number::Int(b),
        }
    }

    fn divide(a: i64, b: i64) -> ProposedAction {
        ProposedAction::Divide {
            a: Number::Int(a),
            b: Number::Int(b),
        }
    }

    fn done(message: &str) -> ProposedAction {
        ProposedAction::DoneForNow {
            message: message.into(),
        }
    }

    fn agent(model: Arc<ScriptedModel>) -> AgentLoop {
        AgentLoop::new(model, Arc::new(Dispatcher::default()))
    }

    /// A model that never answers in time.
    struct StalledModel;

    #[async_trait::async_trait]
    impl NextStepModel for StalledModel {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn determine_next_step(&self, _context: &str) -> Result<ProposedAction, ModelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(done("too late"))
        }
    }

    /// A model that decides purely from the transcript, so it can serve many
    /// threads at once.
    struct TranscriptModel;

    #[async_trait::async_trait]
    impl NextStepModel for TranscriptModel {
        fn name(&self) -> &str {
            "transcript"
        }

        async fn determine_next_step(&self, context: &str) -> Result<ProposedAction, ModelError> {
            tokio::task::yield_now().await;
            if context.contains("<tool_response>") {
                Ok(done("finished"))
            } else if context.contains("left") {
                Ok(add(1, 1))
            } else {
                Ok(add(40, 2))
            }
        }
    }

    #[tokio::test]
    async fn add_then_done_suspends_for_response() {
        let model = Arc::new(ScriptedModel::from_actions([add(2, 3), done("2 + 3 = 5")]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("can you add 2 and 3")]);

        let state = agent.run(&mut thread).await.unwrap();

        assert_eq!(state, LoopState::SuspendedForResponse);
        assert_eq!(model.calls(), 2);
        // user_input, add, tool_response(5), done_for_now
        assert_eq!(thread.len(), 4);
        assert_eq!(
            thread.events()[2].payload,
            Event::tool_response(&ToolOutput::Number(Number::Int(5))).payload
        );
        assert_eq!(
            thread.last().unwrap().payload.intent(),
            Some(Intent::DoneForNow)
        );
    }

    #[tokio::test]
    async fn model_sees_previous_results() {
        let model = Arc::new(ScriptedModel::from_actions([add(2, 3), done("5")]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("add 2 and 3")]);

        agent.run(&mut thread).await.unwrap();

        let contexts = model.contexts();
        assert_eq!(contexts[0], "<user_input>\nadd 2 and 3\n</user_input>");
        assert_eq!(
            contexts[1],
            "<user_input>\nadd 2 and 3\n</user_input>\n\n\
             <add>\na: 2\nb: 3\n</add>\n\n\
             <tool_response>\n5\n</tool_response>"
        );
    }

    #[tokio::test]
    async fn divide_suspends_for_approval_without_dispatching() {
        let model = Arc::new(ScriptedModel::from_actions([divide(10, 2)]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("divide 10 by 2")]);
        let before = thread.len();

        let state = agent.run(&mut thread).await.unwrap();

        assert_eq!(state, LoopState::SuspendedForApproval);
        assert_eq!(thread.len(), before + 1);
        assert_eq!(thread.last().unwrap().kind, kinds::TOOL_CALL);
        assert!(thread.is_awaiting_human_approval());
    }

    #[tokio::test]
    async fn approval_resumes_and_asks_model_again() {
        let model = Arc::new(ScriptedModel::from_actions([divide(10, 2), done("5.0")]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("divide 10 by 2")]);

        agent.run(&mut thread).await.unwrap();
        let output = agent.approve(&mut thread).await.unwrap();
        assert_eq!(output, ToolOutput::Number(Number::Float(5.0)));
        assert_eq!(thread.last().unwrap().render(), "<tool_response>\n5.0\n</tool_response>");

        let state = agent.run(&mut thread).await.unwrap();
        assert_eq!(model.calls(), 2);
        assert_eq!(state, LoopState::SuspendedForResponse);
    }

    #[tokio::test]
    async fn rejection_records_reason_and_skips_execution() {
        let model = Arc::new(ScriptedModel::from_actions([
            ProposedAction::ProcessRefund,
            ProposedAction::RequestMoreInformation {
                message: "Why was the refund declined?".into(),
            },
        ]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("refund my order")]);

        assert_eq!(
            agent.run(&mut thread).await.unwrap(),
            LoopState::SuspendedForApproval
        );
        agent.reject(&mut thread, "order already shipped").unwrap();
        assert_eq!(thread.last().unwrap().kind, kinds::APPROVAL_REJECTED);
        assert_eq!(thread.state().unwrap(), LoopState::Running);

        let state = agent.run(&mut thread).await.unwrap();
        assert_eq!(state, LoopState::SuspendedForResponse);
        assert!(model.contexts()[1].contains("reason: order already shipped"));
    }

    #[tokio::test]
    async fn approve_without_pending_action_fails() {
        let agent = agent(Arc::new(ScriptedModel::default()));
        let mut thread = Thread::new([Event::user_input("hello")]);

        let err = agent.approve(&mut thread).await.unwrap_err();
        assert!(matches!(err, Error::NotAwaitingApproval { ref last_event } if last_event == "user_input"));
        assert_eq!(thread.len(), 1);

        let mut empty = Thread::new([]);
        let err = agent.approve(&mut empty).await.unwrap_err();
        assert!(matches!(err, Error::Thread(ThreadError::Empty)));
    }

    #[tokio::test]
    async fn empty_thread_fails_before_model_call() {
        let model = Arc::new(ScriptedModel::from_actions([add(1, 1)]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([]);

        let err = agent.run(&mut thread).await.unwrap_err();

        assert!(matches!(err, Error::Thread(ThreadError::Empty)));
        assert_eq!(model.calls(), 0);
        assert!(thread.is_empty());
    }

    #[tokio::test]
    async fn suspended_thread_is_not_advanced() {
        let model = Arc::new(ScriptedModel::from_actions([add(1, 1)]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([
            Event::user_input("divide"),
            Event::tool_call(divide(1, 2)),
        ]);

        let state = agent.run(&mut thread).await.unwrap();

        assert_eq!(state, LoopState::SuspendedForApproval);
        assert_eq!(model.calls(), 0);
        assert_eq!(thread.len(), 2);
    }

    #[tokio::test]
    async fn unrecognized_action_is_surfaced_not_recorded() {
        let model = Arc::new(ScriptedModel::from_jsonl(r#"{"intent":"wire_money","to":"x"}"#));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("pay them")]);

        let err = agent.run(&mut thread).await.unwrap_err();

        match err {
            Error::Model(ModelError::UnrecognizedAction { payload, .. }) => {
                assert!(payload.contains("wire_money"));
            }
            other => panic!("Expected UnrecognizedAction, got {other:?}"),
        }
        assert_eq!(thread.len(), 1);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn tool_fault_is_recorded_then_returned() {
        let model = Arc::new(ScriptedModel::from_actions([add(i64::MAX, 1)]));
        let agent = agent(model.clone());
        let mut thread = Thread::new([Event::user_input("overflow please")]);

        let err = agent.run(&mut thread).await.unwrap_err();

        assert!(matches!(err, Error::Tool(ToolError::Overflow { .. })));
        assert_eq!(thread.len(), 3);
        let last = thread.last().unwrap();
        assert_eq!(last.kind, kinds::TOOL_RESPONSE);
        assert!(last.render().contains("error: Arithmetic overflow"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn iteration_limit_stops_runaway_loop() {
        let model = Arc::new(ScriptedModel::from_actions(
            std::iter::repeat_n(add(1, 1), 10),
        ));
        let agent = agent(model.clone()).with_max_iterations(3);
        let mut thread = Thread::new([Event::user_input("keep adding")]);

        let err = agent.run(&mut thread).await.unwrap_err();

        assert!(matches!(err, Error::IterationLimit { limit: 3 }));
        assert_eq!(model.calls(), 3);
        // seed + 3 × (call, response)
        assert_eq!(thread.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn model_timeout_is_reported() {
        let agent = AgentLoop::new(Arc::new(StalledModel), Arc::new(Dispatcher::default()))
            .with_model_timeout(Some(Duration::from_secs(5)));
        let mut thread = Thread::new([Event::user_input("hello?")]);

        let err = agent.run(&mut thread).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Model(ModelError::Timeout { timeout_ms: 5000 })
        ));
        assert_eq!(thread.len(), 1);
    }

    #[tokio::test]
    async fn events_are_published_in_order() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let model = Arc::new(ScriptedModel::from_actions([add(2, 3), done("5")]));
        let agent = agent(model)
            .with_name("math-agent")
            .with_event_bus(bus.clone());
        let mut thread = Thread::new([Event::user_input("add")]);

        agent.run(&mut thread).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.len(), 4);
        assert!(matches!(
            seen[0].as_ref(),
            DomainEvent::ActionProposed { intent: Intent::Add, agent, .. } if agent == "math-agent"
        ));
        assert!(matches!(
            seen[1].as_ref(),
            DomainEvent::ToolExecuted { success: true, .. }
        ));
        assert!(matches!(
            seen[2].as_ref(),
            DomainEvent::ActionProposed {
                intent: Intent::DoneForNow,
                ..
            }
        ));
        assert!(matches!(
            seen[3].as_ref(),
            DomainEvent::LoopSuspended {
                state: LoopState::SuspendedForResponse,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn independent_threads_run_concurrently() {
        let agent = AgentLoop::new(Arc::new(TranscriptModel), Arc::new(Dispatcher::default()));
        let mut left = Thread::new([Event::user_input("left")]);
        let mut right = Thread::new([Event::user_input("right")]);

        let (l, r) = tokio::join!(agent.run(&mut left), agent.run(&mut right));

        assert_eq!(l.unwrap(), LoopState::SuspendedForResponse);
        assert_eq!(r.unwrap(), LoopState::SuspendedForResponse);
        assert_eq!(left.events()[2].payload, Payload::Data(serde_json::json!(2)));
        assert_eq!(right.events()[2].payload, Payload::Data(serde_json::json!(42)));
    }

    #[test]
    fn from_config_applies_settings() {
        let config = AgentConfig {
            name: "refund-desk".into(),
            max_iterations: 4,
            model_timeout_secs: None,
        };
        let agent = AgentLoop::from_config(
            &config,
            Arc::new(ScriptedModel::default()),
            Arc::new(Dispatcher::default()),
        );
        assert_eq!(agent.name(), "refund-desk");
        assert_eq!(agent.max_iterations, 4);
        assert!(agent.model_timeout.is_none());
    }

    #[test]
    fn zero_timeout_in_config_disables_it() {
        let config = AgentConfig {
            model_timeout_secs: Some(0),
            ..AgentConfig::default()
        };
        let agent = AgentLoop::from_config(
            &config,
            Arc::new(ScriptedModel::default()),
            Arc::new(Dispatcher::default()),
        );
        assert!(agent.model_timeout.is_none());
    }
}
