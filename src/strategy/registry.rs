//! Mode-to-strategy dispatch table.
//!
//! Constructed explicitly at startup and handed to the orchestrator; there is
//! no global singleton. `register` is the designed extension point: a mode's
//! constructor can be replaced without touching the resolution call site.

use std::collections::HashMap;

use super::{default_mode, frame, spa, StrategyBehavior};
use crate::types::Mode;

pub type StrategyCtor = Box<dyn Fn() -> StrategyBehavior + Send + Sync>;

pub struct StrategyRegistry {
    table: HashMap<Mode, StrategyCtor>,
}

impl StrategyRegistry {
    /// An empty registry. `resolve` falls back to the default strategy for
    /// anything unregistered.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A registry seeded with the three built-in strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Mode::Default, Box::new(default_mode::behavior));
        registry.register(Mode::ThirdPartyFrame, Box::new(frame::behavior));
        registry.register(Mode::DynamicSpa, Box::new(spa::behavior));
        registry
    }

    pub fn register(&mut self, mode: Mode, ctor: StrategyCtor) {
        self.table.insert(mode, ctor);
    }

    /// Builds the behavior for `mode`, or the default strategy when the mode
    /// has no registered constructor.
    pub fn resolve(&self, mode: Mode) -> StrategyBehavior {
        match self.table.get(&mode) {
            Some(ctor) => ctor(),
            None => default_mode::behavior(),
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
