//! Replicated world state and playfield constants.

/// Playfield dimensions, sized for a 128x64 monochrome display.
pub const SCREEN_WIDTH: i16 = 128;
pub const SCREEN_HEIGHT: i16 = 64;

pub const PADDLE_HEIGHT: i16 = 12;
pub const PADDLE_WIDTH: i16 = 2;
pub const LEFT_PADDLE_X: i16 = 2;
pub const RIGHT_PADDLE_X: i16 = SCREEN_WIDTH - 4;

pub const BALL_SIZE: i16 = 2;
/// Horizontal ball speed in pixels per simulation tick.
pub const BALL_SPEED_X: i16 = 2;
/// Vertical ball velocity is clamped to this magnitude.
pub const MAX_BALL_SPEED_Y: i16 = 4;
/// How strongly paddle motion at the moment of contact deflects the ball.
pub const PADDLE_MOTION_INFLUENCE: f32 = 0.6;

pub const SCORE_TO_WIN: u8 = 11;

/// One side of the playfield. The master owns the left paddle, the client
/// the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One-shot sound effect request, delivered at most once.
///
/// `Win` and `Lose` are from the receiver's perspective: the side that took
/// the match hears `Win` locally and puts `Lose` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundTrigger {
    #[default]
    None,
    Bounce,
    Miss,
    Lose,
    Win,
}

impl SoundTrigger {
    pub fn to_wire(self) -> u8 {
        match self {
            SoundTrigger::None => 0x00,
            SoundTrigger::Bounce => 0x01,
            SoundTrigger::Miss => 0x02,
            SoundTrigger::Lose => 0x03,
            SoundTrigger::Win => 0x04,
        }
    }

    pub fn from_wire(byte: u8) -> Option<SoundTrigger> {
        match byte {
            0x00 => Some(SoundTrigger::None),
            0x01 => Some(SoundTrigger::Bounce),
            0x02 => Some(SoundTrigger::Miss),
            0x03 => Some(SoundTrigger::Lose),
            0x04 => Some(SoundTrigger::Win),
            _ => None,
        }
    }
}

/// The master-authoritative view of the world, exactly as it crosses the
/// wire in a State packet.
///
/// Positions fit in an `i8` because the playfield is 128x64; the client
/// overwrites its local copy verbatim, with no interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub ball_x: i8,
    pub ball_y: i8,
    pub paddle_left_y: i8,
    pub paddle_right_y: i8,
    pub score_left: u8,
    pub score_right: u8,
    pub sound: SoundTrigger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_trigger_wire_values() {
        assert_eq!(SoundTrigger::None.to_wire(), 0x00);
        assert_eq!(SoundTrigger::Bounce.to_wire(), 0x01);
        assert_eq!(SoundTrigger::Miss.to_wire(), 0x02);
        assert_eq!(SoundTrigger::Lose.to_wire(), 0x03);
        assert_eq!(SoundTrigger::Win.to_wire(), 0x04);

        for byte in 0x00..=0x04u8 {
            let trigger = SoundTrigger::from_wire(byte).unwrap();
            assert_eq!(trigger.to_wire(), byte);
        }
    }

    #[test]
    fn test_sound_trigger_rejects_unknown_bytes() {
        assert_eq!(SoundTrigger::from_wire(0x05), None);
        assert_eq!(SoundTrigger::from_wire(0xff), None);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_paddle_positions_fit_signed_bytes() {
        // Everything the snapshot carries must survive the i8 wire fields.
        assert!(RIGHT_PADDLE_X <= i8::MAX as i16);
        assert!(SCREEN_HEIGHT - PADDLE_HEIGHT <= i8::MAX as i16);
        assert!(SCREEN_WIDTH - BALL_SIZE <= i8::MAX as i16);
    }
}
