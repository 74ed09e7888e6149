//! Wire decoding of inbound actions.

use super::ActionKind;
use crate::error::{BattleError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionDecodeError {
    #[error("unknown action kind `{0}`")]
    UnknownKind(String),

    #[error("invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: ActionKind, reason: String },
}

impl BattleError for ActionDecodeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "ACTION_UNKNOWN_KIND",
            Self::InvalidPayload { .. } => "ACTION_INVALID_PAYLOAD",
        }
    }
}

#[cfg(feature = "serde")]
mod wire {
    use serde::Deserialize;
    use serde::de::DeserializeOwned;

    use super::ActionDecodeError;
    use crate::action::{Action, ActionKind};

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct StarterPayload {
        unit_index: usize,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct AttackPayload {
        move_id: String,
        #[serde(default)]
        target_unit_index: Option<usize>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SwitchPayload {
        target_unit_index: usize,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ItemPayload {
        item_id: String,
        #[serde(default)]
        target_unit_index: Option<usize>,
    }

    fn parse<T: DeserializeOwned>(
        kind: ActionKind,
        payload: &serde_json::Value,
    ) -> Result<T, ActionDecodeError> {
        T::deserialize(payload).map_err(|err| ActionDecodeError::InvalidPayload {
            kind,
            reason: err.to_string(),
        })
    }

    impl Action {
        /// Decodes an inbound `(kind, payload)` pair.
        ///
        /// Kinds are `select_starter`, `attack`, `switch`, and `use_item`;
        /// payload fields are camelCase. An unknown kind is a hard error.
        pub fn decode(kind: &str, payload: &serde_json::Value) -> Result<Self, ActionDecodeError> {
            let kind: ActionKind = kind
                .parse()
                .map_err(|_| ActionDecodeError::UnknownKind(kind.to_owned()))?;

            let action = match kind {
                ActionKind::SelectStarter => {
                    let p: StarterPayload = parse(kind, payload)?;
                    Action::SelectStarter {
                        unit_index: p.unit_index,
                    }
                }
                ActionKind::Attack => {
                    let p: AttackPayload = parse(kind, payload)?;
                    Action::Attack {
                        move_id: p.move_id,
                        target_unit_index: p.target_unit_index,
                    }
                }
                ActionKind::Switch => {
                    let p: SwitchPayload = parse(kind, payload)?;
                    Action::Switch {
                        target_unit_index: p.target_unit_index,
                    }
                }
                ActionKind::UseItem => {
                    let p: ItemPayload = parse(kind, payload)?;
                    Action::UseItem {
                        item_id: p.item_id,
                        target_unit_index: p.target_unit_index,
                    }
                }
            };
            Ok(action)
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::action::Action;

    #[test]
    fn decodes_each_kind() {
        assert_eq!(
            Action::decode("select_starter", &json!({ "unitIndex": 1 })),
            Ok(Action::SelectStarter { unit_index: 1 })
        );
        assert_eq!(
            Action::decode("attack", &json!({ "moveId": "tackle" })),
            Ok(Action::attack("tackle"))
        );
        assert_eq!(
            Action::decode("switch", &json!({ "targetUnitIndex": 2 })),
            Ok(Action::switch(2))
        );
        assert_eq!(
            Action::decode("use_item", &json!({ "itemId": "potion", "targetUnitIndex": 0 })),
            Ok(Action::use_item("potion", Some(0)))
        );
    }

    #[test]
    fn unknown_kind_is_a_hard_error() {
        let err = Action::decode("flee", &json!({})).unwrap_err();
        assert_eq!(err, ActionDecodeError::UnknownKind("flee".into()));
        assert_eq!(err.error_code(), "ACTION_UNKNOWN_KIND");
    }

    #[test]
    fn malformed_payload_names_the_kind() {
        let err = Action::decode("switch", &json!({ "targetUnitIndex": "two" })).unwrap_err();
        assert!(matches!(
            err,
            ActionDecodeError::InvalidPayload {
                kind: ActionKind::Switch,
                ..
            }
        ));
    }
}
