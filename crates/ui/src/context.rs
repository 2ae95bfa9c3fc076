use std::sync::Arc;

use services::BattleController;

pub trait UiApp: Send + Sync {
    fn battle(&self) -> Arc<BattleController>;
}

#[derive(Clone)]
pub struct AppContext {
    battle: Arc<BattleController>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            battle: app.battle(),
        }
    }

    #[must_use]
    pub fn battle(&self) -> Arc<BattleController> {
        Arc::clone(&self.battle)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
