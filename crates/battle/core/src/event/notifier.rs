use super::{BattleEvent, Notification, Translator};
use crate::state::BattleSession;

/// Localizes notifications and appends them to a session's event log.
#[derive(Clone, Copy)]
pub struct EventNotifier<'a> {
    translator: &'a dyn Translator,
}

impl<'a> EventNotifier<'a> {
    pub fn new(translator: &'a dyn Translator) -> Self {
        Self { translator }
    }

    pub fn localize(&self, notification: Notification, turn: u32) -> BattleEvent {
        let message = self
            .translator
            .translate(notification.key, &notification.payload);
        BattleEvent {
            key: notification.key,
            payload: notification.payload,
            message,
            target: notification.target,
            turn,
        }
    }

    /// Appends `notifications` to the session log in order.
    pub fn notify(
        &self,
        session: &mut BattleSession,
        notifications: impl IntoIterator<Item = Notification>,
    ) {
        let turn = session.turn;
        session.event_log.extend(
            notifications
                .into_iter()
                .map(|notification| self.localize(notification, turn)),
        );
    }
}
