use dioxus::prelude::*;

use crate::vm::ResultsVm;

#[component]
pub fn ResultsView(
    vm: ResultsVm,
    on_play_again: EventHandler<()>,
    on_retry: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "results",
            h1 { class: "results-headline {vm.headline_class}", "{vm.headline}" }
            p { class: "results-score", "{vm.score_line}" }
            for line in vm.opponent_lines {
                p { class: "results-opponent", key: "{line}", "{line}" }
            }
            if let Some(error) = vm.error {
                p { class: "results-error", "{error}" }
                button {
                    class: "results-cta results-cta--secondary",
                    id: "results-retry",
                    r#type: "button",
                    onclick: move |_| on_retry.call(()),
                    "Try Again"
                }
            }
            button {
                class: "results-cta",
                id: "results-play-again",
                r#type: "button",
                onclick: move |_| on_play_again.call(()),
                "Play Again"
            }
        }
    }
}
