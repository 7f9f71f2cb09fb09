//! Shared protocol and world-state definitions for the two-node pong link.
//!
//! Both peers run the same binary and speak the same six-packet wire
//! protocol over an unreliable broadcast-capable datagram link. This crate
//! holds everything both sides must agree on:
//!
//! - The fixed-layout packet codec ([`packet`]): one discriminant byte
//!   followed by a handful of single-byte fields. Packets are never
//!   fragmented, retried, or acknowledged.
//! - The replicated world state ([`world`]): ball, paddles, scores, and the
//!   one-shot sound trigger, plus the playfield constants the simulation is
//!   tuned for.
//!
//! Role arbitration, liveness, serving, and replication live in the `peer`
//! crate; nothing here performs I/O.

pub mod packet;
pub mod world;

pub use packet::{DecodeError, Packet};
pub use world::{Side, SoundTrigger, WorldSnapshot};
pub use world::{
    BALL_SIZE, BALL_SPEED_X, LEFT_PADDLE_X, MAX_BALL_SPEED_Y, PADDLE_HEIGHT,
    PADDLE_MOTION_INFLUENCE, PADDLE_WIDTH, RIGHT_PADDLE_X, SCORE_TO_WIN, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
