use std::time::Duration;

use crate::anim::{command_sync, Animation, CommandError};
use crate::config::ActionTable;

use super::EntitySlot;

/// Why a triggered action had nothing to do. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    ActiveUnloaded,
    UnknownAction,
    PeerUnloaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Solo,
    Synchronized { delay: Duration },
    Ignored(IgnoreReason),
    /// The animation refused the commands; nothing was queued on either side.
    Rejected(CommandError),
}

/// Routes triggered actions to the active slot, or to both slots when the
/// action carries peer commands.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    actions: ActionTable,
}

impl Dispatcher {
    pub fn new(actions: ActionTable) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn on_action_triggered(
        &self,
        action_id: &str,
        active: &mut EntitySlot,
        peer: &mut EntitySlot,
    ) -> DispatchOutcome {
        let Some(active_animation) = active.animation_mut() else {
            return DispatchOutcome::Ignored(IgnoreReason::ActiveUnloaded);
        };
        let Some(descriptor) = self.actions.resolve(action_id) else {
            return DispatchOutcome::Ignored(IgnoreReason::UnknownAction);
        };

        if !descriptor.requires_peer() {
            return match active_animation.command_n(&descriptor.self_commands) {
                Ok(()) => DispatchOutcome::Solo,
                Err(error) => DispatchOutcome::Rejected(error),
            };
        }

        let Some(peer_animation) = peer.animation_mut() else {
            return DispatchOutcome::Ignored(IgnoreReason::PeerUnloaded);
        };
        let mut participants: [(&mut dyn Animation, &[String]); 2] = [
            (active_animation, &descriptor.self_commands),
            (peer_animation, &descriptor.peer_commands),
        ];
        match command_sync(&mut participants, &descriptor.sync_mode) {
            Ok(delay) => DispatchOutcome::Synchronized { delay },
            Err(error) => DispatchOutcome::Rejected(error),
        }
    }
}
