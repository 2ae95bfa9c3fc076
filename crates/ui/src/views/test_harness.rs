use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::model::{ParticipantId, QuestionSet, Roster, SessionId};
use quiz_core::time::fixed_now;
use services::{BattleConfig, BattleController, Clock};
use storage::repository::InMemorySessionStore;

use crate::context::{UiApp, build_app_context};
use crate::views::QuizBattleView;

#[derive(Clone)]
struct TestApp {
    battle: Arc<BattleController>,
}

impl UiApp for TestApp {
    fn battle(&self) -> Arc<BattleController> {
        Arc::clone(&self.battle)
    }
}

#[derive(Props, Clone)]
struct BattleHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for BattleHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn BattleHarness(props: BattleHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { QuizBattleView {} }
}

pub struct ViewHarness {
    pub store: InMemorySessionStore,
    pub battle: Arc<BattleController>,
}

impl ViewHarness {
    /// Mount the battle view over the controller's current state and render it.
    pub fn render(&self) -> String {
        let app = Arc::new(TestApp {
            battle: Arc::clone(&self.battle),
        });
        let mut dom = VirtualDom::new_with_props(BattleHarness, BattleHarnessProps { app });
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    pub fn session(&self) -> SessionId {
        self.battle.config().session_id().clone()
    }
}

pub fn participant(value: &str) -> ParticipantId {
    ParticipantId::new(value).expect("participant id")
}

pub async fn setup_view_harness(local: &str) -> ViewHarness {
    let store = InMemorySessionStore::new();
    let roster = Roster::new(
        participant(local),
        vec![participant("user1"), participant("user2")],
    )
    .expect("roster");
    let config = BattleConfig::new(
        SessionId::new("view-smoke").expect("session id"),
        roster,
        QuestionSet::financial_basics(),
    )
    .with_manual_ticks();

    let battle = Arc::new(BattleController::new(
        config,
        Arc::new(store.clone()),
        Clock::fixed(fixed_now()),
    ));
    battle.start().await;

    ViewHarness { store, battle }
}

/// Answer the open question, correctly or not.
pub async fn answer(battle: &BattleController, correct: bool) {
    let index = battle.phase().question_index().expect("open question");
    let question = battle.config().questions().get(index).expect("question");
    let choice = if correct {
        question.correct_option().to_owned()
    } else {
        question
            .options()
            .iter()
            .find(|o| !question.is_correct(o))
            .expect("wrong option")
            .clone()
    };
    battle.submit_answer(&choice).await;
}
