//! Serve handshake gating ball physics after a point.
//!
//! After a miss the ball is parked until the conceding side serves. The
//! master serves with its local button, bypassing the network; the client
//! serves by setting the click flag on its next Input packet, which moves
//! the master through a one-tick `ClientServing` state before the ball is
//! released.

use shared::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeState {
    /// Physics runs.
    InPlay,
    /// Frozen until the master's local serve input.
    WaitingServeLeft,
    /// Frozen until a click arrives from the client.
    WaitingServeRight,
    /// Transitional: the click arrived, the ball is released next tick.
    ClientServing,
}

#[derive(Debug)]
pub struct ServeCoordinator {
    state: ServeState,
}

impl ServeCoordinator {
    pub fn new() -> Self {
        Self {
            state: ServeState::InPlay,
        }
    }

    pub fn state(&self) -> ServeState {
        self.state
    }

    pub fn physics_enabled(&self) -> bool {
        self.state == ServeState::InPlay
    }

    /// Parks the ball until the given side serves.
    pub fn wait_for(&mut self, side: Side) {
        self.state = match side {
            Side::Left => ServeState::WaitingServeLeft,
            Side::Right => ServeState::WaitingServeRight,
        };
    }

    /// A click received from the client. Only acts while waiting on the
    /// right side; repeats past that point are no-ops.
    pub fn on_client_click(&mut self) -> bool {
        if self.state == ServeState::WaitingServeRight {
            self.state = ServeState::ClientServing;
            true
        } else {
            false
        }
    }

    /// The master's local serve input, driven directly, not via packets.
    pub fn on_master_serve(&mut self) -> bool {
        if self.state == ServeState::WaitingServeLeft {
            self.state = ServeState::InPlay;
            true
        } else {
            false
        }
    }

    /// Advances the one-tick transitional state. Returns true exactly when
    /// a client serve is released into play.
    pub fn tick(&mut self) -> bool {
        if self.state == ServeState::ClientServing {
            self.state = ServeState::InPlay;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.state = ServeState::InPlay;
    }
}

impl Default for ServeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
