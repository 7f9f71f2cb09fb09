//! # Symmetric Peer Library
//!
//! This library implements one node of a two-node, serverless multiplayer
//! pong session running over an unreliable broadcast-capable datagram link.
//! Both devices run the same binary; there is no central coordinator and no
//! consensus protocol to fall back on.
//!
//! ## Core Responsibilities
//!
//! ### Discovery & Role Arbitration
//! Freshly booted nodes broadcast Discovery beacons. The first node to hear
//! the other's beacon binds it as partner, becomes Master, and unicasts a
//! YouAreClient override that always wins on the receiving side. Symmetry
//! is broken purely by arrival order; if delivery timing makes both nodes
//! believe they won, the claimed-role byte carried on every Input packet
//! exposes the conflict and both sides take a full reset back to discovery.
//!
//! ### Liveness
//! No keepalives are sent. Any packet from the bound partner refreshes a
//! contact clock; five seconds of silence triggers the same full reset as a
//! role conflict.
//!
//! ### Serve Handshake
//! After a point the ball is parked until the conceding side serves. The
//! master serves from local input; the client serves via the click flag on
//! its next Input packet, which passes through a one-tick transitional
//! state on the master before physics resumes.
//!
//! ### Master-Authoritative Replication
//! The master owns ball, paddles, and scores, and unicasts a fixed-layout
//! State snapshot every simulation tick. The client overwrites its mirror
//! verbatim. Snapshots carry an at-most-once sound trigger that is cleared
//! locally the moment it is sent — a lost datagram silently drops it.
//!
//! ## Concurrency Model
//!
//! All session state lives in a single [`node::Node`] driven from one task.
//! The transport's receive path never touches it: received datagrams are
//! queued over an mpsc channel and applied between simulation ticks, making
//! the single-writer assumption explicit rather than relying on scheduler
//! behavior. Every send is fire-and-forget; the only cancellation-like
//! mechanism anywhere is the liveness timeout.
//!
//! ## Module Organization
//!
//! - [`session`] — role arbitration, partner binding, liveness, votes
//! - [`serve`] — the serve-gating state machine
//! - [`game`] — integer pong simulation (master side) and snapshot mirror
//! - [`node`] — packet dispatch, periodic sends, replication
//! - [`transport`] — UDP adapter: receiver/sender tasks around one socket

pub mod game;
pub mod node;
pub mod serve;
pub mod session;
pub mod transport;
