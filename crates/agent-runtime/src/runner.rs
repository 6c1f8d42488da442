//! Runner that drives a root agent against a stored session
//!
//! Each call to [`Runner::run`] is one invocation: the session history is
//! loaded into a fresh [`Context`], the user turn is recorded, and the root
//! agent runs on the tokio runtime while every event it records is persisted
//! and streamed to the caller. Dropping the [`EventStream`] aborts the run.

use agent_core::{Agent, Context, Event, Result};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Poll, Context as TaskContext};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::session::SessionService;

/// Stream of events produced by one invocation
///
/// Events arrive in the order they were recorded. An agent failure is
/// delivered as a single `Err` item, after which the stream ends.
///
/// The invocation task is aborted when the stream is dropped, so an
/// abandoned run stops calling the model and appending to its session.
pub struct EventStream {
    rx: UnboundedReceiver<Result<Event>>,
    task: JoinHandle<()>,
}

impl EventStream {
    /// Receive the next event, or `None` once the invocation has finished
    pub async fn recv(&mut self) -> Option<Result<Event>> {
        self.rx.recv().await
    }
}

impl Stream for EventStream {
    type Item = Result<Event>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("Event stream dropped, aborting invocation");
            self.task.abort();
        }
    }
}

/// Binds a root agent to an application name and a session store
pub struct Runner {
    app_name: String,
    agent: Arc<dyn Agent>,
    sessions: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<dyn Agent>,
        sessions: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            sessions,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    pub fn sessions(&self) -> &Arc<dyn SessionService> {
        &self.sessions
    }

    /// Submit one user turn to the root agent
    ///
    /// When the root agent returns non-empty text, the stream closes with an
    /// event that has `turn_complete` set.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session does not exist.
    pub fn run(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: impl Into<String>,
    ) -> Result<EventStream> {
        let session = self
            .sessions
            .get_session(&self.app_name, user_id, session_id)?;
        let new_message = new_message.into();
        let invocation_id = Uuid::new_v4().to_string();

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<Result<Event>>();

        let mut context = Context::new()
            .with_invocation_id(&invocation_id)
            .with_history(session.events)
            .with_event_sink(event_tx)
            .with_app_name(&self.app_name)
            .with_user_id(user_id)
            .with_session_id(session_id);
        context.record(Event::user(&invocation_id, new_message.as_str()));

        let agent = Arc::clone(&self.agent);
        let sessions = Arc::clone(&self.sessions);
        let app_name = self.app_name.clone();
        let user_id = user_id.to_string();
        let session_id = session_id.to_string();
        let span = info_span!(
            "invocation",
            invocation_id = %invocation_id,
            session_id = %session_id,
            agent = agent.name()
        );

        let task = tokio::spawn(
            async move {
                let persist = |event: &Event| {
                    if let Err(e) =
                        sessions.append_event(&app_name, &user_id, &session_id, event.clone())
                    {
                        warn!("Failed to persist event {}: {}", event.id, e);
                    }
                };

                let process = async {
                    let result = agent.process(new_message, &mut context).await;
                    // Closes the event channel once every forked sink is gone too
                    drop(context);
                    result
                };
                let forward = async {
                    while let Some(event) = event_rx.recv().await {
                        persist(&event);
                        if out_tx.send(Ok(event)).is_err() {
                            debug!("Event stream dropped by caller");
                        }
                    }
                };
                let (result, ()) = tokio::join!(process, forward);

                match result {
                    Ok(text) if !text.trim().is_empty() => {
                        let event = Event::final_response(&invocation_id, agent.name(), text);
                        persist(&event);
                        let _ = out_tx.send(Ok(event));
                    }
                    Ok(_) => debug!("Root agent returned no text"),
                    Err(e) => {
                        warn!("Invocation failed: {}", e);
                        let _ = out_tx.send(Err(e));
                    }
                }
            }
            .instrument(span),
        );

        Ok(EventStream { rx: out_rx, task })
    }
}
