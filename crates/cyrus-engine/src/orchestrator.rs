// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Orchestrator` (spec §4.9): the Edge-Worker. Owns the session
//! registry, dispatches routed webhooks to a `SessionCoordinator` per
//! session, runs the single persistence-writer task, and answers
//! `/status`.

use crate::coordinator::{CompletionOutcome, CoordinatorError, SessionCoordinator};
use crate::router::{Router, RouterError};
use cyrus_adapters::{IssueTracker, Runner};
use cyrus_core::{
    ActiveSessionSummary, ActiveWorkStatus, Clock, RepositoryConfig, RunnerSelection, RunnerType,
    Session, SessionId, WebhookEvent,
};
use cyrus_storage::{ActiveWorkStore, PersistedState, PersistenceStore, StateBody};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("routing: {0}")]
    Routing(#[from] RouterError),
    #[error("repository {0:?} has no tracker client configured")]
    UnknownRepository(String),
    #[error("coordinator: {0}")]
    Coordinator(#[from] CoordinatorError),
}

/// What `handle_webhook` decided for one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No repository matched; the event was dropped (spec §4.1 step 3 —
    /// zero catch-alls is not an error, just a no-op).
    Dropped,
    /// A new session task was started for this event.
    Started(SessionId),
    /// The event was routed to an already-running session as a
    /// follow-up.
    FollowUp(SessionId),
}

enum WriterMsg {
    Upsert { key: String, session: Box<Session>, pending_posts: Vec<String> },
    Remove { key: String },
}

/// Live handle to one registered session: the coordinator plus enough
/// to route a follow-up to it without re-deriving the route.
struct Registered {
    coordinator: Arc<Mutex<SessionCoordinator>>,
    issue_id: String,
}

/// Composition root for the orchestration core (spec §4.9). Constructed
/// once per process; the concrete HTTP server and vendor runner/tracker
/// wiring live in the daemon binary.
///
/// Generic over the clock rather than holding `Arc<dyn Clock>`: `Clock`
/// carries `Clone` as a supertrait (so `FakeClock`/`SystemClock` are
/// cheap to pass around by value in tests), which makes it impossible to
/// turn into a trait object. Everywhere else in this crate sidesteps the
/// same issue by threading `now_epoch_ms` through as a plain argument
/// instead of storing a `Clock`; `Orchestrator` is long-lived enough
/// that a stored, monomorphized clock reads more naturally.
pub struct Orchestrator<C: Clock + 'static> {
    cyrus_home: PathBuf,
    trackers: HashMap<String, Arc<dyn IssueTracker>>,
    runner_factory: Arc<dyn Fn(&RunnerSelection) -> Arc<dyn Runner> + Send + Sync>,
    clock: C,
    sessions: Mutex<HashMap<SessionId, Registered>>,
    issue_index: Mutex<HashMap<String, SessionId>>,
    state_store: PersistenceStore,
    active_work_store: ActiveWorkStore,
    writer_tx: mpsc::Sender<WriterMsg>,
}

impl<C: Clock + 'static> Orchestrator<C> {
    /// `trackers` is keyed by `RepositoryConfig::id`, one client per
    /// repository, created at config load (spec §5: "safe for
    /// concurrent use"). `runner_factory` builds the `Runner` a new
    /// session's `RunnerSelection` should use; concrete vendor wiring is
    /// the daemon's job.
    pub fn new(
        cyrus_home: PathBuf,
        trackers: HashMap<String, Arc<dyn IssueTracker>>,
        runner_factory: Arc<dyn Fn(&RunnerSelection) -> Arc<dyn Runner> + Send + Sync>,
        clock: C,
    ) -> Self {
        let state_store = PersistenceStore::new(cyrus_home.join("state").join("edge-worker-state.json"));
        let active_work_store = ActiveWorkStore::new(&cyrus_home);
        let (writer_tx, writer_rx) = mpsc::channel(256);
        spawn_persistence_writer(PersistenceStore::new(state_store.path().to_path_buf()), writer_rx, clock.clone());
        Self { cyrus_home, trackers, runner_factory, clock, sessions: Mutex::new(HashMap::new()), issue_index: Mutex::new(HashMap::new()), state_store, active_work_store, writer_tx }
    }

    /// Crash recovery (spec §4.9): load `PersistedState`; every session
    /// still recorded as non-terminal is reconstructed dormant
    /// (`Stopped`, regardless of its recorded status) and left that way
    /// — no auto-resume. A subsequent tracker prompt drives it through
    /// `Resume` via `handle_webhook`'s follow-up path.
    pub async fn recover(self: &Arc<Self>) -> usize {
        let Some(persisted) = PersistedState::load_from(&self.state_store) else { return 0 };
        let mut recovered = 0;
        let mut sessions = self.sessions.lock().await;
        let mut issue_index = self.issue_index.lock().await;
        for (key, mut session) in persisted.state.agent_sessions {
            if session.is_terminal() {
                continue;
            }
            let snapshot = session.state_machine.to_snapshot();
            session.state_machine = cyrus_core::SessionStateMachine::from_snapshot_dormant(snapshot);
            let Some(tracker) = self.trackers.get(&session.repository_id).cloned() else {
                warn!(repository_id = %session.repository_id, "dropping recovered session for unknown repository");
                continue;
            };
            let runner = (self.runner_factory)(&session.runner_selection);
            let pending_posts = persisted
                .state
                .agent_session_entries
                .get(&key)
                .map(|entries| deserialize_pending_posts(entries))
                .unwrap_or_default();
            let issue_id = session.issue_id.clone();
            let session_id = session.id;
            let coordinator = SessionCoordinator::resume(session, tracker, runner, pending_posts);
            sessions.insert(session_id, Registered { coordinator: Arc::new(Mutex::new(coordinator)), issue_id: issue_id.clone() });
            issue_index.insert(issue_id, session_id);
            recovered += 1;
        }
        info!(recovered, "crash recovery reconstructed dormant sessions");
        recovered
    }

    /// Webhook intake (spec §4.9): route, find-or-start a session, and
    /// spawn its single-consumer event loop.
    pub async fn handle_webhook(self: &Arc<Self>, event: WebhookEvent, repos: &[RepositoryConfig]) -> Result<Dispatch, OrchestratorError> {
        if !event.starts_new_session() {
            if let Some(session_id) = self.issue_index.lock().await.get(event.issue_id()).copied() {
                self.route_follow_up(session_id, &event).await?;
                return Ok(Dispatch::FollowUp(session_id));
            }
        }

        let org_id = event.organization_id();
        let candidates: Vec<RepositoryConfig> =
            repos.iter().filter(|r| r.is_active && r.tracker_workspace_id == org_id).cloned().collect();
        let Some(probe_tracker) = candidates.iter().find_map(|r| self.trackers.get(&r.id)).cloned() else {
            return Ok(Dispatch::Dropped);
        };
        let Some(repo) = Router::route(&event, &candidates, probe_tracker.as_ref()).await? else {
            return Ok(Dispatch::Dropped);
        };
        let tracker = self.trackers.get(&repo.id).cloned().ok_or_else(|| OrchestratorError::UnknownRepository(repo.id.clone()))?;

        let now_ms = self.clock.epoch_ms();
        let workspace_path = repo.workspace_base_dir.join(event.issue_id());
        let selection = RunnerSelection::new(event.issue_id(), RunnerType::Claude);
        let runner = (self.runner_factory)(&selection);
        let prompt = initial_prompt(&event);
        let mut session = Session::new(repo.id.clone(), event.issue_id().to_string(), workspace_path, selection, now_ms);
        // A `ralph-wiggum`/`ralph-wiggum-N` label on the triggering event
        // (spec §4.4) enables the iterative loop from session creation.
        session.ralph_state = event.labels().and_then(|labels| cyrus_core::RalphState::from_labels(labels, prompt.clone()));
        let session_id = session.id;
        let issue_id = session.issue_id.clone();

        let coordinator = Arc::new(Mutex::new(SessionCoordinator::new(session, tracker, runner)));
        self.sessions.lock().await.insert(session_id, Registered { coordinator: coordinator.clone(), issue_id: issue_id.clone() });
        self.issue_index.lock().await.insert(issue_id, session_id);

        let this = self.clone();
        tokio::spawn(async move { this.run_session(session_id, coordinator, prompt).await });

        Ok(Dispatch::Started(session_id))
    }

    async fn route_follow_up(self: &Arc<Self>, session_id: SessionId, event: &WebhookEvent) -> Result<(), OrchestratorError> {
        let Some(registered) = self.sessions.lock().await.get(&session_id).map(|r| r.coordinator.clone()) else {
            return Ok(());
        };
        let prompt = initial_prompt(event);
        let mut coordinator = registered.lock().await;
        if coordinator.session().can_resume() {
            drop(coordinator);
            let this_coordinator = registered.clone();
            let this = self.clone();
            tokio::spawn(async move { this.run_session(session_id, this_coordinator, prompt).await });
            return Ok(());
        }
        coordinator.send_follow_up(prompt).await?;
        Ok(())
    }

    /// The single-consumer loop spec §5 describes: drains one session's
    /// runner events in order, posting and persisting as it goes, and
    /// restarts in place on a Ralph-loop continuation.
    async fn run_session(self: Arc<Self>, session_id: SessionId, handle: Arc<Mutex<SessionCoordinator>>, mut prompt: String) {
        loop {
            let start_result = {
                let mut coordinator = handle.lock().await;
                let now = self.clock.epoch_ms();
                coordinator.start(prompt.clone(), now).await
            };
            let mut rx = match start_result {
                Ok(rx) => rx,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "session failed to start");
                    self.persist_and_finalize(session_id, &handle).await;
                    return;
                }
            };

            // Spec §4.7: re-attempt any buffered tracker posts before
            // accepting new work for this session.
            handle.lock().await.flush_pending_posts().await;

            let mut terminal = false;
            while let Some(event) = rx.recv().await {
                let now_ms = self.clock.epoch_ms();
                let now_s = now_ms / 1000;
                let mut coordinator = handle.lock().await;
                match coordinator.on_runner_event(event, now_ms, now_s).await {
                    Ok(is_terminal) => terminal = is_terminal,
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "failed processing runner event");
                        terminal = true;
                    }
                }
                drop(coordinator);
                self.persist(session_id, &handle).await;
                if terminal {
                    break;
                }
            }

            let outcome = {
                let mut coordinator = handle.lock().await;
                let now = self.clock.epoch_ms();
                coordinator.complete_and_persist(now)
            };
            self.persist(session_id, &handle).await;
            match outcome {
                CompletionOutcome::Restart { prompt: next } => {
                    prompt = next;
                    continue;
                }
                CompletionOutcome::Released => {
                    self.finalize(session_id).await;
                    return;
                }
            }
        }
    }

    async fn persist(&self, session_id: SessionId, handle: &Arc<Mutex<SessionCoordinator>>) {
        let coordinator = handle.lock().await;
        let session = Box::new(coordinator.session().clone());
        let pending_posts = serialize_pending_posts(coordinator.pending_posts());
        drop(coordinator);
        let _ = self.writer_tx.send(WriterMsg::Upsert { key: session_id.to_string(), session, pending_posts }).await;
        self.refresh_active_work().await;
    }

    async fn persist_and_finalize(&self, session_id: SessionId, handle: &Arc<Mutex<SessionCoordinator>>) {
        self.persist(session_id, handle).await;
        self.finalize(session_id).await;
    }

    async fn finalize(&self, session_id: SessionId) {
        let registered = self.sessions.lock().await.remove(&session_id);
        if let Some(registered) = registered {
            self.issue_index.lock().await.remove(&registered.issue_id);
        }
        self.refresh_active_work().await;
    }

    async fn refresh_active_work(&self) {
        let now = self.clock.epoch_ms();
        let sessions = self.sessions.lock().await;
        let mut summaries = Vec::with_capacity(sessions.len());
        for (id, registered) in sessions.iter() {
            let coordinator = registered.coordinator.lock().await;
            let session = coordinator.session();
            summaries.push((
                id.to_string(),
                ActiveSessionSummary {
                    issue_id: session.issue_id.clone(),
                    issue_identifier: session.issue_id.clone(),
                    repository_id: session.repository_id.clone(),
                    started_at: session.started_at,
                },
            ));
        }
        drop(sessions);
        let status = ActiveWorkStatus::from_sessions(summaries, now);
        if let Err(e) = self.active_work_store.save(&status) {
            warn!(error = %e, "failed writing active-work.json");
        }
    }

    /// `GET /status` (spec §6).
    pub async fn status(&self) -> ActiveWorkStatus {
        self.active_work_store.load(self.clock.epoch_ms())
    }

    /// Graceful shutdown (spec §5, §4.9): stop every active coordinator,
    /// wait up to `drain`, then force-persist whatever is left.
    pub async fn shutdown(&self, drain: Duration) {
        let session_ids: Vec<SessionId> = self.sessions.lock().await.keys().copied().collect();
        for session_id in &session_ids {
            if let Some(registered) = self.sessions.lock().await.get(session_id).map(|r| r.coordinator.clone()) {
                let now = self.clock.epoch_ms();
                let mut coordinator = registered.lock().await;
                let _ = coordinator.stop("shutdown", now).await;
            }
        }
        tokio::time::sleep(drain).await;
        for session_id in &session_ids {
            if let Some(registered) = self.sessions.lock().await.get(session_id).map(|r| r.coordinator.clone()) {
                {
                    let mut coordinator = registered.lock().await;
                    let now = self.clock.epoch_ms();
                    // A coordinator that didn't reach `Stopped` within
                    // the drain window is force-failed, per spec §5's
                    // "sessions that don't finish ... are persisted as
                    // Failed with reason shutdown".
                    let _ = coordinator.stop("shutdown", now).await;
                }
                self.persist(*session_id, &registered).await;
            }
        }
        info!(session_count = session_ids.len(), "shutdown drain complete");
        let _ = &self.cyrus_home;
    }
}

fn initial_prompt(event: &WebhookEvent) -> String {
    match event {
        WebhookEvent::AgentSessionCreated { prompt: Some(prompt), .. } => prompt.clone(),
        WebhookEvent::AgentSessionPrompted { prompt, .. } => prompt.clone(),
        WebhookEvent::IssueCommentMention { prompt, .. } => prompt.clone(),
        WebhookEvent::IssueAssigned { issue_identifier, .. } => format!("Work on {issue_identifier}."),
        _ => String::new(),
    }
}

fn serialize_pending_posts(posts: &[(cyrus_wire::ActivityContent, bool)]) -> Vec<String> {
    posts.iter().filter_map(|entry| serde_json::to_string(entry).ok()).collect()
}

fn deserialize_pending_posts(entries: &[String]) -> Vec<(cyrus_wire::ActivityContent, bool)> {
    entries.iter().filter_map(|raw| serde_json::from_str(raw).ok()).collect()
}

/// The single persistence-writer task (spec §5): serialized snapshots
/// are submitted here and coalesced — a burst of updates to the same
/// session key between flushes only costs one write.
fn spawn_persistence_writer<C: Clock + 'static>(store: PersistenceStore, mut rx: mpsc::Receiver<WriterMsg>, clock: C) {
    tokio::spawn(async move {
        let mut body = PersistedState::load_from(&store).map(|p| p.state).unwrap_or_default();
        while let Some(first) = rx.recv().await {
            let mut batch = vec![first];
            while let Ok(msg) = rx.try_recv() {
                batch.push(msg);
            }
            for msg in batch {
                match msg {
                    WriterMsg::Upsert { key, session, pending_posts } => {
                        body.agent_sessions.insert(key.clone(), *session);
                        body.agent_session_entries.insert(key, pending_posts);
                    }
                    WriterMsg::Remove { key } => {
                        body.agent_sessions.remove(&key);
                        body.agent_session_entries.remove(&key);
                    }
                }
            }
            let doc = PersistedState::new(clock.epoch_ms(), body.clone());
            if let Err(e) = store.save(&doc) {
                warn!(error = %e, "failed writing edge-worker-state.json");
            }
        }
    });
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
