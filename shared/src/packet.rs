//! Fixed-layout wire codec for the link protocol.
//!
//! Every datagram carries exactly one packet: an unsigned discriminant byte
//! followed by a fixed payload. All payload fields are one byte wide (`i8`
//! fields are two's-complement), so the layout has no endianness to pin
//! down and the largest packet is eight bytes.
//!
//! Decoding validates the length a packet's discriminant requires before
//! touching the payload; trailing bytes beyond the declared layout are
//! tolerated and ignored. Malformed datagrams are reported to the caller,
//! which drops them silently on the receive path.

use crate::world::{SoundTrigger, WorldSnapshot};
use thiserror::Error;

pub const PKT_DISCOVERY: u8 = 0x01;
pub const PKT_INPUT: u8 = 0x02;
pub const PKT_READY: u8 = 0x03;
pub const PKT_STATE: u8 = 0x04;
pub const PKT_FORCE_READY: u8 = 0x05;
pub const PKT_YOU_ARE_CLIENT: u8 = 0x06;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown packet type 0x{0:02x}")]
    UnknownType(u8),
    #[error("packet type 0x{kind:02x} truncated: need {need} bytes, got {got}")]
    Truncated { kind: u8, need: usize, got: usize },
    #[error("invalid sound trigger byte 0x{0:02x}")]
    BadSoundTrigger(u8),
}

/// One link-level packet, in decoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// Broadcast beacon sent while no partner is bound. The nonce is
    /// generated at boot and carried on the wire, but receivers never
    /// compare it; role arbitration is purely first-contact.
    Discovery { nonce: u8 },
    /// Periodic input report, also the carrier for role-conflict detection
    /// (`claims_master`) and the client's serve signal (`click`).
    Input {
        paddle_y: i8,
        claims_master: bool,
        click: bool,
    },
    /// Readiness vote for resuming play.
    Ready,
    /// Master-authoritative world snapshot, sent every simulation tick.
    State(WorldSnapshot),
    /// Privileged post-point reset: authoritative scores plus a one-shot
    /// trigger, returning both sides to the Ready phase.
    ForceReady {
        score_left: u8,
        score_right: u8,
        sound: SoundTrigger,
    },
    /// Unicast role override sent by the side that won the discovery race.
    YouAreClient,
}

impl Packet {
    /// Serializes the packet into its fixed wire layout.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Packet::Discovery { nonce } => vec![PKT_DISCOVERY, nonce],
            Packet::Input {
                paddle_y,
                claims_master,
                click,
            } => vec![
                PKT_INPUT,
                paddle_y as u8,
                claims_master as u8,
                click as u8,
            ],
            Packet::Ready => vec![PKT_READY],
            Packet::State(snap) => vec![
                PKT_STATE,
                snap.ball_x as u8,
                snap.ball_y as u8,
                snap.paddle_left_y as u8,
                snap.paddle_right_y as u8,
                snap.score_left,
                snap.score_right,
                snap.sound.to_wire(),
            ],
            Packet::ForceReady {
                score_left,
                score_right,
                sound,
            } => vec![PKT_FORCE_READY, score_left, score_right, sound.to_wire()],
            Packet::YouAreClient => vec![PKT_YOU_ARE_CLIENT],
        }
    }

    /// Parses one datagram, validating the length its discriminant demands.
    pub fn decode(data: &[u8]) -> Result<Packet, DecodeError> {
        let kind = *data.first().ok_or(DecodeError::Empty)?;
        let need = match kind {
            PKT_DISCOVERY => 2,
            PKT_INPUT => 4,
            PKT_READY => 1,
            PKT_STATE => 8,
            PKT_FORCE_READY => 4,
            PKT_YOU_ARE_CLIENT => 1,
            other => return Err(DecodeError::UnknownType(other)),
        };
        if data.len() < need {
            return Err(DecodeError::Truncated {
                kind,
                need,
                got: data.len(),
            });
        }

        let packet = match kind {
            PKT_DISCOVERY => Packet::Discovery { nonce: data[1] },
            PKT_INPUT => Packet::Input {
                paddle_y: data[1] as i8,
                claims_master: data[2] != 0,
                click: data[3] != 0,
            },
            PKT_READY => Packet::Ready,
            PKT_STATE => Packet::State(WorldSnapshot {
                ball_x: data[1] as i8,
                ball_y: data[2] as i8,
                paddle_left_y: data[3] as i8,
                paddle_right_y: data[4] as i8,
                score_left: data[5],
                score_right: data[6],
                sound: SoundTrigger::from_wire(data[7])
                    .ok_or(DecodeError::BadSoundTrigger(data[7]))?,
            }),
            PKT_FORCE_READY => Packet::ForceReady {
                score_left: data[1],
                score_right: data[2],
                sound: SoundTrigger::from_wire(data[3])
                    .ok_or(DecodeError::BadSoundTrigger(data[3]))?,
            },
            PKT_YOU_ARE_CLIENT => Packet::YouAreClient,
            _ => unreachable!(),
        };
        Ok(packet)
    }
}
