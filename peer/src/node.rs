//! The symmetric peer: packet dispatch, periodic sends, and replication.
//!
//! One `Node` owns the whole session aggregate (session, serve coordinator,
//! world) and is driven from exactly one task: the transport's receive path
//! hands decoded datagrams over a channel, and the main loop alternates
//! between [`Node::handle_packet`] and [`Node::tick`]. That single-consumer
//! arrangement is what makes the lock-free shared state safe; nothing else
//! may touch a `Node`.
//!
//! Every send is fire-and-forget. A lost State packet silently drops that
//! tick's one-shot sound trigger; a lost ForceReady can stall a round until
//! the liveness timeout resets the session. Neither is retried.

use crate::game::World;
use crate::serve::{ServeCoordinator, ServeState};
use crate::session::{Phase, Role, Session, DISCOVERY_INTERVAL, INPUT_INTERVAL};
use log::{debug, error, info, warn};
use shared::{Packet, Side, SoundTrigger};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A datagram queued for the transport's sender task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Unicast { dest: SocketAddr, packet: Packet },
    Broadcast { packet: Packet },
}

pub struct Node {
    session: Session,
    serve: ServeCoordinator,
    world: World,
    outgoing: mpsc::UnboundedSender<Outgoing>,

    // Collaborator inputs, sampled into outgoing Input packets.
    paddle_y: i8,
    click: bool,

    /// One-shot trigger bound for the partner; cleared the moment it is
    /// put on the wire, delivered or not.
    wire_sound: SoundTrigger,
    /// One-shot trigger for the local audio collaborator.
    local_sound: SoundTrigger,

    last_discovery_send: Option<Instant>,
    last_input_send: Option<Instant>,
}

impl Node {
    pub fn new(nonce: u8, outgoing: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self {
            session: Session::new(nonce),
            serve: ServeCoordinator::new(),
            world: World::new(),
            outgoing,
            paddle_y: 26,
            click: false,
            wire_sound: SoundTrigger::None,
            local_sound: SoundTrigger::None,
            last_discovery_send: None,
            last_input_send: None,
        }
    }

    // --- read interface for simulation/rendering/audio collaborators ---

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn serve_state(&self) -> ServeState {
        self.serve.state()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for the simulation collaborator (and tests).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Consumes the pending local sound trigger, at most once per tick.
    pub fn take_local_sound(&mut self) -> SoundTrigger {
        std::mem::take(&mut self.local_sound)
    }

    // --- write interface for input collaborators ---

    pub fn set_paddle(&mut self, y: i8) {
        self.paddle_y = y;
        // The master's own paddle is the left one and is authoritative.
        if self.session.role == Role::Master {
            self.world.set_paddle(Side::Left, y as i16);
        }
    }

    pub fn set_click(&mut self, pressed: bool) {
        self.click = pressed;
    }

    /// Casts the local readiness vote and tells the partner. Idempotent;
    /// the vote is only cleared by ForceReady or a session reset.
    pub fn set_ready(&mut self) {
        if self.session.local_ready {
            return;
        }
        self.session.local_ready = true;
        if let Some(partner) = self.session.partner() {
            self.send(Outgoing::Unicast {
                dest: partner,
                packet: Packet::Ready,
            });
        }
    }

    // --- receive path ---

    /// Applies one raw datagram to the session aggregate. Malformed input
    /// is dropped silently; no packet ever provokes a response other than
    /// the discovery-race YouAreClient.
    pub fn handle_packet(&mut self, sender: SocketAddr, data: &[u8], now: Instant) {
        let packet = match Packet::decode(data) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Dropping malformed datagram from {}: {}", sender, e);
                return;
            }
        };

        // Any partner traffic counts as liveness, whatever the type.
        self.session.note_contact(sender, now);

        match packet {
            Packet::Discovery { nonce } => {
                if self.session.partner_found() {
                    debug!("Ignoring stale discovery from {}", sender);
                    return;
                }
                debug!("Discovery beacon from {} (nonce {})", sender, nonce);
                if self.session.on_discovery(sender, now) {
                    self.send(Outgoing::Unicast {
                        dest: sender,
                        packet: Packet::YouAreClient,
                    });
                }
            }

            Packet::YouAreClient => {
                self.session.on_you_are_client(sender, now);
            }

            Packet::Ready => {
                debug!("Partner voted ready");
                self.session.remote_ready = true;
            }

            Packet::Input {
                paddle_y,
                claims_master,
                click,
            } => {
                if !self.session.partner_found() {
                    return;
                }
                if self.session.check_role_claim(claims_master) {
                    // Both sides believe they hold the same role. Mutate
                    // nothing from this packet; tick() takes the reset path.
                    warn!(
                        "Role conflict: partner also claims {:?}",
                        self.session.role
                    );
                    return;
                }
                match self.session.role {
                    Role::Master => {
                        self.world.set_paddle(Side::Right, paddle_y as i16);
                        if click && self.serve.on_client_click() {
                            info!("Client serve click received");
                        }
                    }
                    Role::Client => {
                        self.world.set_paddle(Side::Left, paddle_y as i16);
                    }
                    Role::Unknown => {}
                }
            }

            Packet::State(snap) => {
                if self.session.role == Role::Master {
                    // Defensive: should not happen under correct roles.
                    error!("Received State packet while master, ignoring");
                    return;
                }
                self.world.apply_snapshot(&snap);
                if snap.sound != SoundTrigger::None {
                    self.local_sound = snap.sound;
                }
            }

            Packet::ForceReady {
                score_left,
                score_right,
                sound,
            } => {
                info!(
                    "ForceReady from partner: {} - {}",
                    score_left, score_right
                );
                self.session.phase = Phase::Ready;
                self.world.set_scores(score_left, score_right);
                self.session.clear_ready_votes();
                if sound != SoundTrigger::None {
                    self.local_sound = sound;
                }
            }
        }
    }

    // --- periodic path ---

    /// One cooperative scheduling tick: recovery checks, periodic sends,
    /// and (on the master) one step of simulation plus replication.
    pub fn tick(&mut self, now: Instant) {
        if self.session.conflict {
            warn!("Resetting session after role conflict");
            self.reset(now);
        } else if self.session.partner_found() && !self.session.is_partner_alive(now) {
            warn!("Partner silent past timeout, resetting session");
            self.reset(now);
        }

        match self.session.phase {
            Phase::Searching => {
                if self.session.role == Role::Unknown
                    && due(self.last_discovery_send, DISCOVERY_INTERVAL, now)
                {
                    self.send(Outgoing::Broadcast {
                        packet: Packet::Discovery {
                            nonce: self.session.nonce,
                        },
                    });
                    self.last_discovery_send = Some(now);
                }
            }

            Phase::Ready => {
                self.send_input_if_due(now);
                if self.session.both_ready() {
                    info!("Both sides ready, entering play");
                    self.session.phase = Phase::Playing;
                    self.session.clear_ready_votes();
                    if self.session.role == Role::Master && self.world.game_over() {
                        // Fresh match after a won game.
                        self.world = World::new();
                        self.serve.reset();
                    }
                }
            }

            Phase::Playing => {
                self.send_input_if_due(now);
                if self.session.role == Role::Master {
                    self.master_tick();
                }
            }
        }
    }

    fn master_tick(&mut self) {
        if self.serve.tick() {
            info!("Client serve released");
            self.world.reset_ball(Side::Right);
        }
        if self.click && self.serve.on_master_serve() {
            info!("Master serve");
            self.world.reset_ball(Side::Left);
        }

        if self.serve.physics_enabled() {
            let outcome = self.world.step();
            if outcome.bounced {
                self.wire_sound = SoundTrigger::Bounce;
                self.local_sound = SoundTrigger::Bounce;
            }
            if let Some(scorer) = outcome.scorer {
                self.finish_point(scorer);
                return;
            }
        }

        // Replicate every tick; the embedded trigger is one-shot and is
        // cleared locally whether or not the datagram arrives.
        if let Some(partner) = self.session.partner() {
            let mut snap = self.world.snapshot();
            snap.sound = self.wire_sound;
            self.send(Outgoing::Unicast {
                dest: partner,
                packet: Packet::State(snap),
            });
            self.wire_sound = SoundTrigger::None;
        }
    }

    /// Post-point flow: score, park the ball on the conceding side, drop
    /// both votes, fall back to Ready, and push the authoritative result.
    fn finish_point(&mut self, scorer: Side) {
        let winner = self.world.award_point(scorer);
        match winner {
            None => {
                self.wire_sound = SoundTrigger::Miss;
                self.local_sound = SoundTrigger::Miss;
            }
            Some(side) => {
                // The master sits on the left; triggers are from the
                // receiver's perspective.
                let master_won = side == Side::Left;
                self.local_sound = if master_won {
                    SoundTrigger::Win
                } else {
                    SoundTrigger::Lose
                };
                self.wire_sound = if master_won {
                    SoundTrigger::Lose
                } else {
                    SoundTrigger::Win
                };
                info!("Game over: {:?} side wins", side);
            }
        }

        self.serve.wait_for(scorer.opposite());
        self.session.phase = Phase::Ready;
        self.session.clear_ready_votes();

        if let Some(partner) = self.session.partner() {
            self.send(Outgoing::Unicast {
                dest: partner,
                packet: Packet::ForceReady {
                    score_left: self.world.score_left,
                    score_right: self.world.score_right,
                    sound: self.wire_sound,
                },
            });
            self.wire_sound = SoundTrigger::None;
        }
    }

    fn send_input_if_due(&mut self, now: Instant) {
        let Some(partner) = self.session.partner() else {
            return;
        };
        if !due(self.last_input_send, INPUT_INTERVAL, now) {
            return;
        }
        self.send(Outgoing::Unicast {
            dest: partner,
            packet: Packet::Input {
                paddle_y: self.paddle_y,
                claims_master: self.session.role == Role::Master,
                click: self.click,
            },
        });
        self.last_input_send = Some(now);
    }

    fn reset(&mut self, now: Instant) {
        self.session.reset(now);
        self.serve.reset();
        self.world = World::new();
        self.wire_sound = SoundTrigger::None;
        self.local_sound = SoundTrigger::None;
        self.last_discovery_send = None;
        self.last_input_send = None;
    }

    fn send(&self, outgoing: Outgoing) {
        if let Err(e) = self.outgoing.send(outgoing) {
            error!("Failed to queue outgoing packet: {}", e);
        }
    }
}

fn due(last: Option<Instant>, every: Duration, now: Instant) -> bool {
    match last {
        None => true,
        Some(last) => now.duration_since(last) >= every,
    }
}
