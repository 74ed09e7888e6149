//! Data-driven battle content and loaders.
//!
//! This crate houses the static catalogs the runtime consults and provides
//! loaders for the RON/TOML files they are authored in:
//! - Item catalog (RON)
//! - Species, the unit templates parties are built from (RON)
//! - Bot profiles: party composition and strategy id (RON)
//! - Locale message tables (RON)
//! - Battle tuning (TOML)
//!
//! Content is consumed by runtime oracles and never appears in battle state
//! except as the units and inventories it instantiates.

pub mod species;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use species::{PartyMember, SpeciesDefinition, level_multiplier};

#[cfg(feature = "loaders")]
pub use loaders::{
    BotLoader, BotProfile, ConfigLoader, ContentBundle, ItemLoader, LocaleLoader, SpeciesLoader,
};
