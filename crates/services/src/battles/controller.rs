use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use quiz_core::Clock;
use quiz_core::battle::{AdvanceOutcome, BattlePhase, BattleState, SubmitOutcome, TickOutcome};
use quiz_core::model::{OutcomeVector, ParticipantId, ParticipantRecord};
use storage::hub::{SnapshotListener, Subscription};
use storage::repository::SessionStore;
use tokio::sync::watch;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::config::BattleConfig;
use super::snapshot::BattleSnapshot;
use super::sync::SyncTracker;
use super::verdict::compute_verdict;

//
// ─── SHARED STATE ─────────────────────────────────────────────────────────────
//

/// Progress of the final-score read for the current game.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VerdictRead {
    NotStarted,
    InFlight,
    Failed(String),
    Done,
}

impl VerdictRead {
    fn can_start(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Failed(_))
    }
}

struct ControllerState {
    battle: BattleState,
    opponents: BTreeMap<ParticipantId, OutcomeVector>,
    verdict: Option<super::verdict::VerdictReport>,
    verdict_read: VerdictRead,
    // Bumped on restart so late completions from the previous game are dropped.
    game: u64,
    sync: SyncTracker,
}

/// State reachable from the ticker task and the snapshot listener.
///
/// Both hold only a `Weak` to this, so dropping the controller ends them.
struct Shared {
    config: BattleConfig,
    store: Arc<dyn SessionStore>,
    clock: Clock,
    state: Mutex<ControllerState>,
    disposed: AtomicBool,
    updates: watch::Sender<BattleSnapshot>,
    // Captured at construction so UI threads outside the runtime can still arm the ticker.
    runtime: Option<Handle>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    subscription: Mutex<Option<Subscription>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn snapshot_of(&self, state: &ControllerState) -> BattleSnapshot {
        let question_count = self.config.questions().len();
        let opponents = self
            .config
            .roster()
            .opponents()
            .map(|id| {
                let outcomes = state
                    .opponents
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| OutcomeVector::unanswered(question_count));
                (id.clone(), outcomes)
            })
            .collect();

        BattleSnapshot {
            phase: state.battle.phase(),
            question_count,
            local: state.battle.outcomes().clone(),
            opponents,
            countdown_remaining: state.battle.countdown().remaining(),
            selected: state.battle.selected().map(str::to_owned),
            score: state.battle.score(),
            verdict: state.verdict.clone(),
            verdict_error: match &state.verdict_read {
                VerdictRead::Failed(reason) => Some(reason.clone()),
                _ => None,
            },
            sync: state.sync.status(),
            last_synced_at: state.sync.last_synced_at(),
            disposed: self.is_disposed(),
        }
    }

    fn publish(&self, state: &ControllerState) {
        self.updates.send_replace(self.snapshot_of(state));
    }

    /// Replace the opponent mirror with the delivered collection.
    fn mirror(&self, records: Vec<ParticipantRecord>) {
        if self.is_disposed() {
            return;
        }
        let question_count = self.config.questions().len();
        let roster = self.config.roster();

        let mut mirrored = BTreeMap::new();
        for record in records {
            if roster.is_local(&record.participant_id) {
                continue;
            }
            if !roster.participants().contains(&record.participant_id) {
                log::debug!(
                    "ignoring record from {} outside the roster",
                    record.participant_id
                );
                continue;
            }
            mirrored.insert(
                record.participant_id,
                record.outcomes.normalized(question_count),
            );
        }

        let mut state = lock(&self.state);
        if self.is_disposed() {
            return;
        }
        state.opponents = mirrored;
        self.publish(&state);
    }

    fn tick(&self) -> TickOutcome {
        if self.is_disposed() {
            return TickOutcome::Ignored;
        }
        let mut state = lock(&self.state);
        if self.is_disposed() {
            return TickOutcome::Ignored;
        }
        let outcome = state.battle.tick();
        match outcome {
            TickOutcome::Ignored => {}
            TickOutcome::Expired { index } => {
                log::debug!("{}: time ran out on question {index}", self.config.local());
                self.publish(&state);
            }
            TickOutcome::Running { .. } => self.publish(&state),
        }
        outcome
    }

    /// Replace any running ticker with a fresh one, if this battle ticks on its own.
    fn arm_ticker(self: &Arc<Self>) {
        let Some(period) = self.config.tick_period() else {
            return;
        };
        if self.is_disposed() {
            return;
        }

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            log::warn!("{}: no async runtime, countdown will not tick", self.config.local());
            return;
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                match shared.tick() {
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Expired { .. } | TickOutcome::Ignored => break,
                }
            }
        });

        if let Some(previous) = lock(&self.ticker).replace(handle) {
            previous.abort();
        }
    }

    fn disarm_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }

    /// Write `record` and settle the sync slot the caller opened with
    /// `sync.begin()` under the state lock.
    ///
    /// Local state is never rolled back on failure.
    async fn persist(&self, record: ParticipantRecord) {
        let result = self
            .store
            .write(self.config.session_id(), &record)
            .await;

        let mut state = lock(&self.state);
        if self.is_disposed() {
            return;
        }
        match result {
            Ok(()) => state.sync.succeed(self.clock.now()),
            Err(err) => {
                log::warn!(
                    "session {}: failed to save record for {}: {err}",
                    self.config.session_id(),
                    record.participant_id
                );
                state.sync.fail(err.to_string());
            }
        }
        self.publish(&state);
    }
}

//
// ─── CONTROLLER ───────────────────────────────────────────────────────────────
//

/// Drives one participant through a battle and keeps the session store in step.
///
/// Store failures are logged and reported through `SyncStatus`; they never
/// block or roll back local play. Dropping the controller has the same effect
/// as `dispose`.
pub struct BattleController {
    shared: Arc<Shared>,
}

impl BattleController {
    #[must_use]
    pub fn new(config: BattleConfig, store: Arc<dyn SessionStore>, clock: Clock) -> Self {
        let battle = BattleState::new(config.questions().clone(), config.countdown_units());
        let state = ControllerState {
            battle,
            opponents: BTreeMap::new(),
            verdict: None,
            verdict_read: VerdictRead::NotStarted,
            game: 0,
            sync: SyncTracker::default(),
        };

        // Seed the channel with a placeholder; the real snapshot is published below.
        let (updates, _rx) = watch::channel(BattleSnapshot {
            phase: state.battle.phase(),
            question_count: config.questions().len(),
            local: state.battle.outcomes().clone(),
            opponents: Vec::new(),
            countdown_remaining: state.battle.countdown().remaining(),
            selected: None,
            score: 0,
            verdict: None,
            verdict_error: None,
            sync: state.sync.status(),
            last_synced_at: None,
            disposed: false,
        });

        let shared = Arc::new(Shared {
            config,
            store,
            clock,
            state: Mutex::new(state),
            disposed: AtomicBool::new(false),
            updates,
            runtime: Handle::try_current().ok(),
            ticker: Mutex::new(None),
            subscription: Mutex::new(None),
        });
        shared.publish(&lock(&shared.state));

        Self { shared }
    }

    /// Subscribe to the session and start the countdown.
    ///
    /// A failed subscription is logged and reported; play continues locally
    /// with the opponent shown at its default.
    pub async fn start(&self) {
        if self.shared.is_disposed() {
            return;
        }
        let config = &self.shared.config;
        log::info!(
            "{} joining session {} ({} questions)",
            config.local(),
            config.session_id(),
            config.questions().len()
        );

        let weak = Arc::downgrade(&self.shared);
        let listener: SnapshotListener = Arc::new(move |records: Vec<ParticipantRecord>| {
            if let Some(shared) = weak.upgrade() {
                shared.mirror(records);
            }
        });

        match self
            .shared
            .store
            .subscribe(config.session_id(), listener)
            .await
        {
            Ok(subscription) => {
                if self.shared.is_disposed() {
                    subscription.cancel();
                } else if let Some(previous) =
                    lock(&self.shared.subscription).replace(subscription)
                {
                    previous.cancel();
                }
            }
            Err(err) => {
                log::warn!(
                    "session {}: cannot follow opponents: {err}",
                    config.session_id()
                );
                let mut state = lock(&self.shared.state);
                state.sync.note_failure(err.to_string());
                self.shared.publish(&state);
            }
        }

        if lock(&self.shared.state).battle.phase().is_answering() {
            self.shared.arm_ticker();
        }
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// Receiver that sees a new snapshot after every change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<BattleSnapshot> {
        self.shared.updates.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        lock(&self.shared.state).battle.phase()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Answer the open question and persist the full local record.
    ///
    /// Ignored unless the controller is answering; a second submit for the
    /// same question changes nothing.
    pub async fn submit_answer(&self, choice: &str) -> SubmitOutcome {
        if self.shared.is_disposed() {
            return SubmitOutcome::Ignored;
        }

        let (outcome, record) = {
            let mut state = lock(&self.shared.state);
            let outcome = state.battle.submit(choice);
            if outcome == SubmitOutcome::Ignored {
                log::debug!(
                    "{}: answer ignored in phase {:?}",
                    self.shared.config.local(),
                    state.battle.phase()
                );
                return outcome;
            }
            // Opened here so a verdict started right after this sees the write pending.
            state.sync.begin();
            self.shared.publish(&state);
            let record = state
                .battle
                .to_record(self.shared.config.local().clone());
            (outcome, record)
        };

        self.shared.disarm_ticker();
        self.shared.persist(record).await;
        outcome
    }

    /// One countdown unit elapsed.
    ///
    /// Called by the ticker task; exposed for callers that drive time themselves.
    pub fn tick(&self) -> TickOutcome {
        self.shared.tick()
    }

    /// Leave the question under review. After the last question this finishes
    /// the battle and computes the verdict, once.
    pub async fn advance(&self) -> AdvanceOutcome {
        if self.shared.is_disposed() {
            return AdvanceOutcome::Ignored;
        }

        let (outcome, game) = {
            let mut state = lock(&self.shared.state);
            let outcome = state.battle.advance();
            if outcome != AdvanceOutcome::Ignored {
                self.shared.publish(&state);
            }
            (outcome, state.game)
        };

        match outcome {
            AdvanceOutcome::Next { index } => {
                log::debug!("{}: question {index}", self.shared.config.local());
                self.shared.arm_ticker();
            }
            AdvanceOutcome::Finished => {
                self.shared.disarm_ticker();
                self.run_verdict(game).await;
            }
            AdvanceOutcome::Ignored => {}
        }
        outcome
    }

    /// Read the final scores again after a failed read.
    ///
    /// No-op unless the last read for this game failed; a read still in
    /// flight is never doubled.
    pub async fn retry_verdict(&self) {
        let game = {
            let state = lock(&self.shared.state);
            if !state.battle.phase().is_finished()
                || !matches!(state.verdict_read, VerdictRead::Failed(_))
            {
                return;
            }
            state.game
        };
        self.run_verdict(game).await;
    }

    async fn run_verdict(&self, game: u64) {
        {
            let mut state = lock(&self.shared.state);
            if state.game != game || !state.verdict_read.can_start() {
                return;
            }
            state.verdict_read = VerdictRead::InFlight;
            self.shared.publish(&state);
        }

        // Local answers still on their way to the store would read as missing.
        let mut updates = self.shared.updates.subscribe();
        let settled = updates
            .wait_for(|snapshot| snapshot.disposed || !snapshot.sync.is_pending())
            .await
            .is_ok();
        if !settled || self.shared.is_disposed() {
            return;
        }

        let config = &self.shared.config;
        let result =
            compute_verdict(self.shared.store.as_ref(), config.session_id(), config.roster()).await;

        let mut state = lock(&self.shared.state);
        if self.shared.is_disposed() || state.game != game {
            return;
        }
        match result {
            Ok(report) => {
                state.verdict = Some(report);
                state.verdict_read = VerdictRead::Done;
            }
            Err(err) => {
                log::error!(
                    "session {}: cannot read final records: {err}",
                    config.session_id()
                );
                state.verdict_read = VerdictRead::Failed(err.to_string());
            }
        }
        self.shared.publish(&state);
    }

    /// Start over and reset every roster slot in the store.
    pub async fn restart(&self) {
        if self.shared.is_disposed() {
            return;
        }
        let config = &self.shared.config;
        {
            let mut state = lock(&self.shared.state);
            state.battle.restart();
            state.opponents.clear();
            state.verdict = None;
            state.verdict_read = VerdictRead::NotStarted;
            state.game += 1;
            for _ in config.roster().participants() {
                state.sync.begin();
            }
            self.shared.publish(&state);
        }
        self.shared.arm_ticker();

        log::info!("{} restarting session {}", config.local(), config.session_id());
        for participant in config.roster().participants() {
            let record = ParticipantRecord::reset(participant.clone(), config.questions().len());
            self.shared.persist(record).await;
        }
    }

    /// Stop the countdown and the subscription together.
    ///
    /// Afterwards no tick, snapshot delivery, or call changes observable state.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.disarm_ticker();
        if let Some(subscription) = lock(&self.shared.subscription).take() {
            subscription.cancel();
        }
        self.shared.publish(&lock(&self.shared.state));
        log::info!(
            "{} left session {}",
            self.shared.config.local(),
            self.shared.config.session_id()
        );
    }
}

impl Drop for BattleController {
    fn drop(&mut self) {
        self.dispose();
    }
}
