//! Read-only collaborators the rules consult.
//!
//! [`BattleEnv`] bundles the item catalog, the translator, and the tuning
//! constants so handlers never couple to concrete implementations.
mod items;
mod rng;

pub use items::{ItemDefinition, ItemEffect, ItemOracle};
pub use rng::{PcgRng, RngOracle, SequenceRng, compute_seed};

use crate::config::BattleConfig;
use crate::event::Translator;

#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    items: &'a dyn ItemOracle,
    translator: &'a dyn Translator,
    config: &'a BattleConfig,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        items: &'a dyn ItemOracle,
        translator: &'a dyn Translator,
        config: &'a BattleConfig,
    ) -> Self {
        Self {
            items,
            translator,
            config,
        }
    }

    pub fn items(&self) -> &'a dyn ItemOracle {
        self.items
    }

    pub fn translator(&self) -> &'a dyn Translator {
        self.translator
    }

    pub fn config(&self) -> &'a BattleConfig {
        self.config
    }
}
