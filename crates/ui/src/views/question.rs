use dioxus::prelude::*;

use crate::vm::QuestionVm;

#[component]
pub fn QuestionCard(vm: QuestionVm, on_select: EventHandler<String>) -> Element {
    rsx! {
        div { class: "question-card",
            h2 { class: "question-prompt", "{vm.prompt}" }
            div { class: "question-options",
                for option in vm.options {
                    button {
                        key: "{option.label}",
                        class: "{option.class}",
                        r#type: "button",
                        disabled: option.disabled,
                        onclick: {
                            let choice = option.label.clone();
                            move |_| on_select.call(choice.clone())
                        },
                        "{option.label}"
                    }
                }
            }
            if let Some(feedback) = vm.feedback {
                p { class: "{feedback.class()}", "{feedback.message()}" }
            }
        }
    }
}
