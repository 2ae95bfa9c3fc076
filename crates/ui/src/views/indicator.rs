use dioxus::prelude::*;

use crate::vm::IndicatorVm;

/// One row of outcome cells per participant.
#[component]
pub fn BattleIndicator(vm: IndicatorVm) -> Element {
    rsx! {
        div { class: "battle-indicator",
            for row in vm.rows {
                div { class: "indicator-row", key: "{row.label}",
                    span { class: "indicator-label", "{row.label}" }
                    div { class: "indicator-cells",
                        for (index, cell) in row.cells.into_iter().enumerate() {
                            span {
                                key: "{index}",
                                class: "cell {cell.class}",
                                title: "{cell.title}",
                            }
                        }
                    }
                }
            }
        }
    }
}
