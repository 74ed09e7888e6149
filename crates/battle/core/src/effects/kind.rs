use bitflags::bitflags;

bitflags! {
    /// Behavioural categories an effect belongs to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EffectCategories: u8 {
        /// Prevents the holder from acting.
        const BLOCKING  = 1 << 0;
        /// Ticks at turn end (damage over time).
        const OVER_TIME = 1 << 1;
        /// Adjusts modifiers while present.
        const MODIFIER  = 1 << 2;
    }
}

/// Named status effect types.
///
/// `Lifesteal` is a move-effect type only: it is resolved by the attack
/// handler and never stored on a unit.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EffectType {
    Burn,
    Poison,
    Sleep,
    Freeze,
    AttackUp,
    DefenseUp,
    Lifesteal,
}

impl EffectType {
    /// Wire name, e.g. `attackUp`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn categories(self) -> EffectCategories {
        super::definition(self)
            .map(|def| def.categories)
            .unwrap_or_default()
    }

    /// True for types that can live on a unit.
    pub fn is_status(self) -> bool {
        super::definition(self).is_some()
    }
}
