//! Master-side world simulation.
//!
//! Integer pong on a 128x64 field. Only the master integrates the ball;
//! the client's `World` is just a mirror overwritten by snapshots. Paddle
//! motion at the moment of contact deflects the ball vertically, scaled by
//! [`PADDLE_MOTION_INFLUENCE`] and clamped to [`MAX_BALL_SPEED_Y`].

use log::info;
use shared::{
    Side, WorldSnapshot, BALL_SIZE, BALL_SPEED_X, LEFT_PADDLE_X, MAX_BALL_SPEED_Y, PADDLE_HEIGHT,
    PADDLE_MOTION_INFLUENCE, PADDLE_WIDTH, RIGHT_PADDLE_X, SCORE_TO_WIN, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

const PADDLE_START_Y: i16 = 26;

/// What a single simulation step observed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepOutcome {
    /// The ball hit a wall or a paddle this step.
    pub bounced: bool,
    /// The ball left the field; this side takes the point.
    pub scorer: Option<Side>,
}

#[derive(Debug, Clone)]
pub struct World {
    pub ball_x: i16,
    pub ball_y: i16,
    pub ball_vx: i16,
    pub ball_vy: i16,
    pub paddle_left_y: i16,
    pub paddle_right_y: i16,
    pub score_left: u8,
    pub score_right: u8,
    // Previous-tick paddle positions, for motion-influenced deflection.
    last_paddle_left_y: i16,
    last_paddle_right_y: i16,
}

impl World {
    pub fn new() -> Self {
        Self {
            ball_x: SCREEN_WIDTH / 2,
            ball_y: SCREEN_HEIGHT / 2,
            ball_vx: BALL_SPEED_X,
            ball_vy: 1,
            paddle_left_y: PADDLE_START_Y,
            paddle_right_y: PADDLE_START_Y,
            score_left: 0,
            score_right: 0,
            last_paddle_left_y: PADDLE_START_Y,
            last_paddle_right_y: PADDLE_START_Y,
        }
    }

    /// Recenters the ball for a serve moving away from the serving side.
    pub fn reset_ball(&mut self, server: Side) {
        self.ball_x = SCREEN_WIDTH / 2;
        self.ball_y = SCREEN_HEIGHT / 2;
        self.ball_vx = match server {
            Side::Left => BALL_SPEED_X,
            Side::Right => -BALL_SPEED_X,
        };
        self.ball_vy = 1;
    }

    /// Advances the ball by one tick. Walls and paddles reflect it; leaving
    /// the field on either edge awards the point to the opposite side.
    pub fn step(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        self.ball_x += self.ball_vx;
        self.ball_y += self.ball_vy;

        if self.ball_y <= 0 {
            self.ball_y = 0;
            self.ball_vy = -self.ball_vy;
            outcome.bounced = true;
        } else if self.ball_y + BALL_SIZE >= SCREEN_HEIGHT {
            self.ball_y = SCREEN_HEIGHT - BALL_SIZE;
            self.ball_vy = -self.ball_vy;
            outcome.bounced = true;
        }

        if self.ball_vx < 0
            && self.ball_x <= LEFT_PADDLE_X + PADDLE_WIDTH
            && self.ball_x + BALL_SIZE >= LEFT_PADDLE_X
            && overlaps_paddle(self.ball_y, self.paddle_left_y)
        {
            self.ball_x = LEFT_PADDLE_X + PADDLE_WIDTH;
            self.ball_vx = BALL_SPEED_X;
            let motion = self.paddle_left_y - self.last_paddle_left_y;
            self.ball_vy = vlimit(self.ball_vy + influence(motion));
            outcome.bounced = true;
        } else if self.ball_vx > 0
            && self.ball_x + BALL_SIZE >= RIGHT_PADDLE_X
            && self.ball_x <= RIGHT_PADDLE_X + PADDLE_WIDTH
            && overlaps_paddle(self.ball_y, self.paddle_right_y)
        {
            self.ball_x = RIGHT_PADDLE_X - BALL_SIZE;
            self.ball_vx = -BALL_SPEED_X;
            let motion = self.paddle_right_y - self.last_paddle_right_y;
            self.ball_vy = vlimit(self.ball_vy + influence(motion));
            outcome.bounced = true;
        }

        if self.ball_x + BALL_SIZE < 0 {
            outcome.scorer = Some(Side::Right);
        } else if self.ball_x > SCREEN_WIDTH {
            outcome.scorer = Some(Side::Left);
        }

        self.last_paddle_left_y = self.paddle_left_y;
        self.last_paddle_right_y = self.paddle_right_y;
        outcome
    }

    /// Increments the scorer's count; returns the winner once a side
    /// reaches [`SCORE_TO_WIN`].
    pub fn award_point(&mut self, scorer: Side) -> Option<Side> {
        match scorer {
            Side::Left => self.score_left += 1,
            Side::Right => self.score_right += 1,
        }
        info!("Point to {:?}: {} - {}", scorer, self.score_left, self.score_right);
        let won = match scorer {
            Side::Left => self.score_left >= SCORE_TO_WIN,
            Side::Right => self.score_right >= SCORE_TO_WIN,
        };
        won.then_some(scorer)
    }

    pub fn set_paddle(&mut self, side: Side, y: i16) {
        let y = y.clamp(0, SCREEN_HEIGHT - PADDLE_HEIGHT);
        match side {
            Side::Left => self.paddle_left_y = y,
            Side::Right => self.paddle_right_y = y,
        }
    }

    pub fn set_scores(&mut self, left: u8, right: u8) {
        self.score_left = left;
        self.score_right = right;
    }

    pub fn game_over(&self) -> bool {
        self.score_left >= SCORE_TO_WIN || self.score_right >= SCORE_TO_WIN
    }

    /// Copies the world into its wire form. The sound slot is left empty;
    /// the replicator fills it with the pending one-shot trigger.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            ball_x: to_wire_coord(self.ball_x),
            ball_y: to_wire_coord(self.ball_y),
            paddle_left_y: to_wire_coord(self.paddle_left_y),
            paddle_right_y: to_wire_coord(self.paddle_right_y),
            score_left: self.score_left,
            score_right: self.score_right,
            sound: shared::SoundTrigger::None,
        }
    }

    /// Client-side apply: overwrite the replicated fields verbatim. Ball
    /// velocity stays untouched; the client never integrates.
    pub fn apply_snapshot(&mut self, snap: &WorldSnapshot) {
        self.ball_x = snap.ball_x as i16;
        self.ball_y = snap.ball_y as i16;
        self.paddle_left_y = snap.paddle_left_y as i16;
        self.paddle_right_y = snap.paddle_right_y as i16;
        self.score_left = snap.score_left;
        self.score_right = snap.score_right;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn overlaps_paddle(ball_y: i16, paddle_y: i16) -> bool {
    ball_y + BALL_SIZE >= paddle_y && ball_y <= paddle_y + PADDLE_HEIGHT
}

fn influence(paddle_motion: i16) -> i16 {
    (paddle_motion as f32 * PADDLE_MOTION_INFLUENCE) as i16
}

fn vlimit(vy: i16) -> i16 {
    vy.clamp(-MAX_BALL_SPEED_Y, MAX_BALL_SPEED_Y)
}

fn to_wire_coord(value: i16) -> i8 {
    value.clamp(i8::MIN as i16, i8::MAX as i16) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_advances_by_velocity() {
        let mut world = World::new();
        let (x, y) = (world.ball_x, world.ball_y);
        let outcome = world.step();
        assert!(!outcome.bounced);
        assert_eq!(outcome.scorer, None);
        assert_eq!(world.ball_x, x + BALL_SPEED_X);
        assert_eq!(world.ball_y, y + 1);
    }

    #[test]
    fn test_wall_bounce_reflects_vertical_velocity() {
        let mut world = World::new();
        world.ball_y = 1;
        world.ball_vy = -2;
        let outcome = world.step();
        assert!(outcome.bounced);
        assert_eq!(world.ball_y, 0);
        assert_eq!(world.ball_vy, 2);

        world.ball_y = SCREEN_HEIGHT - BALL_SIZE - 1;
        world.ball_vy = 3;
        let outcome = world.step();
        assert!(outcome.bounced);
        assert_eq!(world.ball_y, SCREEN_HEIGHT - BALL_SIZE);
        assert_eq!(world.ball_vy, -3);
    }

    #[test]
    fn test_left_paddle_returns_ball() {
        let mut world = World::new();
        world.paddle_left_y = 20;
        world.last_paddle_left_y = 20;
        world.ball_x = LEFT_PADDLE_X + PADDLE_WIDTH + 1;
        world.ball_y = 24;
        world.ball_vx = -BALL_SPEED_X;
        world.ball_vy = 0;

        let outcome = world.step();
        assert!(outcome.bounced);
        assert_eq!(outcome.scorer, None);
        assert_eq!(world.ball_vx, BALL_SPEED_X);
        assert_eq!(world.ball_x, LEFT_PADDLE_X + PADDLE_WIDTH);
    }

    #[test]
    fn test_moving_paddle_deflects_ball() {
        let mut world = World::new();
        world.last_paddle_right_y = 20;
        world.paddle_right_y = 25; // moved down 5px since last tick
        world.ball_x = RIGHT_PADDLE_X - BALL_SIZE - 1;
        world.ball_y = 28;
        world.ball_vx = BALL_SPEED_X;
        world.ball_vy = 0;

        let outcome = world.step();
        assert!(outcome.bounced);
        assert_eq!(world.ball_vx, -BALL_SPEED_X);
        // 5 * 0.6 = 3 pixels of added downward velocity.
        assert_eq!(world.ball_vy, 3);
    }

    #[test]
    fn test_vertical_velocity_is_clamped() {
        let mut world = World::new();
        world.last_paddle_left_y = 0;
        world.paddle_left_y = 40;
        world.set_paddle(Side::Left, 40);
        world.ball_x = LEFT_PADDLE_X + PADDLE_WIDTH + 1;
        world.ball_y = 45;
        world.ball_vx = -BALL_SPEED_X;
        world.ball_vy = 2;

        world.step();
        assert_eq!(world.ball_vy, MAX_BALL_SPEED_Y);
    }

    #[test]
    fn test_miss_awards_point_to_other_side() {
        let mut world = World::new();
        world.paddle_right_y = 0; // parked away from the ball
        world.ball_x = SCREEN_WIDTH - 1;
        world.ball_y = 40;
        world.ball_vx = BALL_SPEED_X;
        world.ball_vy = 0;

        let outcome = world.step();
        assert_eq!(outcome.scorer, Some(Side::Left));
    }

    #[test]
    fn test_award_point_and_win_threshold() {
        let mut world = World::new();
        for _ in 0..(SCORE_TO_WIN - 1) {
            assert_eq!(world.award_point(Side::Right), None);
        }
        assert_eq!(world.score_right, SCORE_TO_WIN - 1);
        assert!(!world.game_over());

        assert_eq!(world.award_point(Side::Right), Some(Side::Right));
        assert!(world.game_over());
    }

    #[test]
    fn test_serve_direction() {
        let mut world = World::new();
        world.reset_ball(Side::Right);
        assert_eq!(world.ball_vx, -BALL_SPEED_X);
        assert_eq!(world.ball_x, SCREEN_WIDTH / 2);

        world.reset_ball(Side::Left);
        assert_eq!(world.ball_vx, BALL_SPEED_X);
    }

    #[test]
    fn test_paddle_clamped_to_screen() {
        let mut world = World::new();
        world.set_paddle(Side::Left, -10);
        assert_eq!(world.paddle_left_y, 0);
        world.set_paddle(Side::Right, 300);
        assert_eq!(world.paddle_right_y, SCREEN_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_snapshot_apply_roundtrip() {
        let mut master = World::new();
        master.ball_x = 100;
        master.ball_y = 12;
        master.paddle_left_y = 5;
        master.paddle_right_y = 50;
        master.set_scores(4, 9);

        let mut client = World::new();
        client.apply_snapshot(&master.snapshot());
        assert_eq!(client.ball_x, 100);
        assert_eq!(client.ball_y, 12);
        assert_eq!(client.paddle_left_y, 5);
        assert_eq!(client.paddle_right_y, 50);
        assert_eq!(client.score_left, 4);
        assert_eq!(client.score_right, 9);
    }

    #[test]
    fn test_snapshot_clamps_out_of_range_coords() {
        let mut world = World::new();
        world.ball_x = SCREEN_WIDTH + 2; // just past the right edge
        let snap = world.snapshot();
        assert_eq!(snap.ball_x, i8::MAX);
    }
}
