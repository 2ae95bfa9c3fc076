use std::sync::Arc;

use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{BattleIndicator, QuestionCard, ResultsView};
use crate::vm::{map_battle, map_results};

/// The whole battle screen: question, timer, progress, indicator, then results.
#[component]
pub fn QuizBattleView() -> Element {
    let ctx = use_context::<AppContext>();
    let battle = ctx.battle();
    let mut snapshot = use_signal(|| battle.snapshot());

    let follow = Arc::clone(&battle);
    use_future(move || {
        let battle = Arc::clone(&follow);
        async move {
            let mut updates = battle.watch();
            while updates.changed().await.is_ok() {
                let next = updates.borrow_and_update().clone();
                snapshot.set(next);
            }
        }
    });

    let on_leave = Arc::clone(&battle);
    use_drop(move || on_leave.dispose());

    let current = snapshot.read().clone();
    let config = battle.config();

    if current.phase.is_finished() {
        let vm = map_results(&current, config.local());
        let restart = Arc::clone(&battle);
        let retry = Arc::clone(&battle);
        return rsx! {
            div { class: "battle",
                BattleIndicator { vm: map_battle(config.questions(), &current).indicator }
                ResultsView {
                    vm,
                    on_play_again: move |()| {
                        log::info!("play again requested");
                        let battle = Arc::clone(&restart);
                        spawn(async move { battle.restart().await; });
                    },
                    on_retry: move |()| {
                        let battle = Arc::clone(&retry);
                        spawn(async move { battle.retry_verdict().await; });
                    },
                }
            }
        };
    }

    let vm = map_battle(config.questions(), &current);
    let submit = Arc::clone(&battle);
    let advance = Arc::clone(&battle);

    rsx! {
        div { class: "battle",
            header { class: "battle-header",
                span { class: "battle-progress-label", "{vm.progress_label}" }
                span { class: "battle-timer", id: "battle-timer", "{vm.timer_label}" }
            }
            div { class: "battle-progress",
                div { class: "battle-progress-bar", style: "width: {vm.progress_percent}%" }
            }
            BattleIndicator { vm: vm.indicator }
            if let Some(question) = vm.question {
                QuestionCard {
                    vm: question,
                    on_select: move |choice: String| {
                        log::debug!("selected {choice:?}");
                        let battle = Arc::clone(&submit);
                        spawn(async move { battle.submit_answer(&choice).await; });
                    },
                }
            }
            if let Some(label) = vm.next_label {
                button {
                    class: "battle-next",
                    id: "battle-next",
                    r#type: "button",
                    onclick: move |_| {
                        let battle = Arc::clone(&advance);
                        spawn(async move { battle.advance().await; });
                    },
                    "{label}"
                }
            }
            if let Some(sync) = vm.sync_label {
                p { class: "battle-sync", "{sync}" }
            }
        }
    }
}
