//! Drives the avatar through a queue of way-points with held direction keys.
//!
//! The server moves the avatar while a key is held and confirms every tile
//! with a `MovePlayer` event, so the controller never predicts positions: it
//! reads the confirmed position, holds at most one key toward the current
//! target (vertical axis first), and lets go just before arriving.
use std::collections::{HashSet, VecDeque};

use dbot_core::{Axis, Direction, Point};

use crate::events::Outbox;

/// Axes on which the server rejected motion since the current target was set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bonked {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Bonked {
    fn mark(&mut self, axis: Axis) {
        match axis {
            Axis::Horizontal => self.horizontal = true,
            Axis::Vertical => self.vertical = true,
        }
    }
}

/// What a call to [`LocomotionController::step`] achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Idle,
    Moving,
    /// Reached a way-point and moved on to the next one.
    ReachedWaypoint,
    /// Reached the last way-point.
    Arrived,
    /// Gave up: the remaining distance lies along bonked axes.
    Abandoned,
}

#[derive(Debug)]
pub struct LocomotionController {
    held: HashSet<Direction>,
    queue: VecDeque<Point>,
    target: Option<Point>,
    bonked: Bonked,
    near_threshold: u32,
}

impl LocomotionController {
    pub fn new(near_threshold: u32) -> Self {
        Self {
            held: HashSet::new(),
            queue: VecDeque::new(),
            target: None,
            bonked: Bonked::default(),
            near_threshold,
        }
    }

    pub fn target(&self) -> Option<Point> {
        self.target
    }

    pub fn queue(&self) -> impl Iterator<Item = &Point> {
        self.queue.iter()
    }

    pub fn bonked(&self) -> Bonked {
        self.bonked
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held.contains(&direction)
    }

    /// No target and nothing queued.
    pub fn is_still(&self) -> bool {
        self.target.is_none() && self.queue.is_empty()
    }

    /// Replaces the queued way-points. Motion starts on the next step.
    pub fn goto(&mut self, points: impl IntoIterator<Item = Point>) {
        self.queue = points.into_iter().collect();
    }

    /// Cancels the target and the queue. Returns whether anything was pending.
    pub fn clear_goto(&mut self, outbox: &mut Outbox) -> bool {
        self.stop_moving(outbox);
        self.bonked = Bonked::default();
        let pending = !self.is_still();
        self.target = None;
        self.queue.clear();
        pending
    }

    /// Releases every held key.
    pub fn stop_moving(&mut self, outbox: &mut Outbox) {
        for direction in Direction::ALL {
            self.release(direction, outbox);
        }
    }

    fn press(&mut self, direction: Direction, outbox: &mut Outbox) {
        if self.held.contains(&direction) {
            return;
        }
        if !self.held.is_empty() {
            tracing::error!("({direction}) - already moving: {:?}", self.held);
            self.stop_moving(outbox);
        }
        outbox.key_down(direction);
        self.held.insert(direction);
    }

    fn release(&mut self, direction: Direction, outbox: &mut Outbox) {
        if self.held.remove(&direction) {
            outbox.key_up(direction);
        }
    }

    fn next_target(&mut self) -> bool {
        self.bonked = Bonked::default();
        self.target = self.queue.pop_front();
        self.target.is_some()
    }

    /// True when no further motion can close the gap to the target.
    pub fn bonked_out(&self, position: Point) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        (self.bonked.horizontal && self.bonked.vertical)
            || (target.x == position.x && self.bonked.vertical)
            || (target.y == position.y && self.bonked.horizontal)
    }

    /// Advances toward the current target by at most one key press.
    pub fn step(&mut self, position: Option<Point>, outbox: &mut Outbox) -> StepOutcome {
        if self.target.is_none() && !self.next_target() {
            return StepOutcome::Idle;
        }
        let Some(position) = position else {
            tracing::warn!("cannot move without a known position");
            return StepOutcome::Idle;
        };

        let mut outcome = StepOutcome::Moving;
        if self.target == Some(position) {
            self.stop_moving(outbox);
            if self.next_target() {
                tracing::info!("reached waypoint {position}");
                outcome = StepOutcome::ReachedWaypoint;
            } else {
                tracing::info!("reached destination {position}");
                return StepOutcome::Arrived;
            }
        } else if self.bonked_out(position) {
            tracing::info!("cannot reach destination {:?}", self.target);
            self.clear_goto(outbox);
            return StepOutcome::Abandoned;
        }

        let Some(target) = self.target else {
            return outcome;
        };
        if position.y != target.y && !self.bonked.vertical {
            let direction = if position.y > target.y {
                Direction::Up
            } else {
                Direction::Down
            };
            self.press(direction, outbox);
        } else if position.x != target.x && !self.bonked.horizontal {
            let direction = if position.x > target.x {
                Direction::Left
            } else {
                Direction::Right
            };
            self.press(direction, outbox);
        }
        outcome
    }

    /// Reacts to a confirmed move of this bot to `position`.
    ///
    /// Releases the key once the avatar is within the near threshold of the
    /// target on the axis of travel, so the server's final tile lands on it.
    pub fn on_move_player(&mut self, direction: Direction, position: Point, outbox: &mut Outbox) {
        let Some(target) = self.target else {
            tracing::warn!("move for self without a target");
            self.stop_moving(outbox);
            return;
        };

        let diff = match direction.axis() {
            Axis::Vertical => position.y.abs_diff(target.y),
            Axis::Horizontal => position.x.abs_diff(target.x),
        };
        if diff < self.near_threshold {
            self.release(direction, outbox);
        }
    }

    /// Marks the axis of the held key as blocked and stops.
    pub fn on_bonk(&mut self, outbox: &mut Outbox) {
        if self.is_held(Direction::Up) || self.is_held(Direction::Down) {
            self.bonked.mark(Axis::Vertical);
        } else {
            self.bonked.mark(Axis::Horizontal);
        }
        self.stop_moving(outbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::OutboundCommand;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn goto_does_not_move_until_stepped() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(3, 3)]);
        assert!(!locomotion.is_still());
        assert!(outbox.is_empty());

        assert_eq!(locomotion.step(Some(p(1, 1)), &mut outbox), StepOutcome::Moving);
        assert_eq!(outbox.drain(), vec![OutboundCommand::KeyDown(Direction::Down)]);
    }

    #[test]
    fn horizontal_follows_vertical() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(1, 3)]);
        locomotion.step(Some(p(3, 3)), &mut outbox);
        assert_eq!(outbox.drain(), vec![OutboundCommand::KeyDown(Direction::Left)]);
    }

    #[test]
    fn arriving_releases_keys_and_pops_the_queue() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(1, 3), p(4, 3)]);
        locomotion.step(Some(p(1, 1)), &mut outbox);
        outbox.drain();

        let outcome = locomotion.step(Some(p(1, 3)), &mut outbox);
        assert_eq!(outcome, StepOutcome::ReachedWaypoint);
        assert_eq!(
            outbox.drain(),
            vec![
                OutboundCommand::KeyUp(Direction::Down),
                OutboundCommand::KeyDown(Direction::Right)
            ]
        );
        assert_eq!(locomotion.target(), Some(p(4, 3)));

        assert_eq!(locomotion.step(Some(p(4, 3)), &mut outbox), StepOutcome::Arrived);
        assert!(locomotion.is_still());
    }

    #[test]
    fn near_threshold_releases_early() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(0, 5)]);
        locomotion.step(Some(p(0, 0)), &mut outbox);
        outbox.drain();

        locomotion.on_move_player(Direction::Down, p(0, 3), &mut outbox);
        assert!(outbox.is_empty());
        locomotion.on_move_player(Direction::Down, p(0, 4), &mut outbox);
        assert_eq!(outbox.drain(), vec![OutboundCommand::KeyUp(Direction::Down)]);
    }

    #[test]
    fn bonk_on_the_only_remaining_axis_abandons() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(3, 8)]);
        locomotion.step(Some(p(3, 7)), &mut outbox);
        locomotion.on_bonk(&mut outbox);
        assert_eq!(
            locomotion.bonked(),
            Bonked {
                horizontal: false,
                vertical: true
            }
        );
        assert!(locomotion.bonked_out(p(3, 7)));

        assert_eq!(
            locomotion.step(Some(p(3, 7)), &mut outbox),
            StepOutcome::Abandoned
        );
        assert!(locomotion.is_still());
    }

    #[test]
    fn bonk_on_one_axis_tries_the_other() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(5, 5)]);
        locomotion.step(Some(p(2, 2)), &mut outbox);
        locomotion.on_bonk(&mut outbox);
        outbox.drain();

        assert_eq!(locomotion.step(Some(p(2, 2)), &mut outbox), StepOutcome::Moving);
        assert_eq!(outbox.drain(), vec![OutboundCommand::KeyDown(Direction::Right)]);

        locomotion.on_bonk(&mut outbox);
        assert!(locomotion.bonked_out(p(2, 2)));
    }

    #[test]
    fn clear_goto_reports_whether_anything_was_cancelled() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        assert!(!locomotion.clear_goto(&mut outbox));
        locomotion.goto([p(1, 1)]);
        assert!(locomotion.clear_goto(&mut outbox));
        assert!(locomotion.is_still());
    }

    #[test]
    fn next_waypoint_resets_bonks() {
        let mut outbox = Outbox::new();
        let mut locomotion = LocomotionController::new(2);
        locomotion.goto([p(2, 1), p(2, 4)]);
        locomotion.step(Some(p(2, 0)), &mut outbox);
        locomotion.on_bonk(&mut outbox);
        assert!(locomotion.bonked().vertical);

        // A peer nudged us onto the way-point anyway.
        assert_eq!(
            locomotion.step(Some(p(2, 1)), &mut outbox),
            StepOutcome::ReachedWaypoint
        );
        assert_eq!(locomotion.bonked(), Bonked::default());
    }
}
