//! Per-frame input accumulation.
//!
//! The host input layer pushes axis values and action edges in whenever they
//! arrive; the simulation drains the buffer exactly once per frame. Substeps
//! within that frame all see the same drained snapshot.

use nalgebra::Vector2;

/// One frame's worth of drained input. Edge flags fire once; held flags
/// reflect the state at drain time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Forward/strafe axes, each in [-1, 1]
    pub axes: Vector2<f32>,
    /// Accumulated mouse delta since the last drain
    pub mouse: Vector2<f32>,
    pub sprint_pressed: bool,
    pub sprint_released: bool,
    /// Crouch key state at drain time; the movement core mirrors this
    pub crouch_held: bool,
    pub crouch_pressed: bool,
    pub crouch_released: bool,
    pub jump_pressed: bool,
}

/// Accumulates movement/look/action intents between drains.
#[derive(Debug, Default)]
pub struct InputAggregator {
    axes: Vector2<f32>,
    mouse: Vector2<f32>,
    sprint_held: bool,
    crouch_held: bool,
    sprint_pressed: bool,
    sprint_released: bool,
    crouch_pressed: bool,
    crouch_released: bool,
    jump_pressed: bool,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the movement axes for this frame, clamped to [-1, 1]
    pub fn set_axes(&mut self, forward: f32, strafe: f32) {
        self.axes = Vector2::new(forward.clamp(-1.0, 1.0), strafe.clamp(-1.0, 1.0));
    }

    /// Accumulates a raw mouse delta
    pub fn push_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse += Vector2::new(dx, dy);
    }

    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    pub fn press_crouch(&mut self) {
        if !self.crouch_held {
            self.crouch_pressed = true;
        }
        self.crouch_held = true;
    }

    pub fn release_crouch(&mut self) {
        if self.crouch_held {
            self.crouch_released = true;
        }
        self.crouch_held = false;
    }

    pub fn press_sprint(&mut self) {
        if !self.sprint_held {
            self.sprint_pressed = true;
        }
        self.sprint_held = true;
    }

    pub fn release_sprint(&mut self) {
        if self.sprint_held {
            self.sprint_released = true;
        }
        self.sprint_held = false;
    }

    /// Drains the buffer: axes, edges, and accumulated deltas reset; held
    /// state persists until the host releases it. The host re-pushes axes
    /// every frame the keys stay down.
    pub fn consume(&mut self) -> FrameInput {
        let frame = FrameInput {
            axes: self.axes,
            mouse: self.mouse,
            sprint_pressed: self.sprint_pressed,
            sprint_released: self.sprint_released,
            crouch_held: self.crouch_held,
            crouch_pressed: self.crouch_pressed,
            crouch_released: self.crouch_released,
            jump_pressed: self.jump_pressed,
        };
        self.axes = Vector2::zeros();
        self.mouse = Vector2::zeros();
        self.sprint_pressed = false;
        self.sprint_released = false;
        self.crouch_pressed = false;
        self.crouch_released = false;
        self.jump_pressed = false;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_fire_once() {
        let mut input = InputAggregator::new();
        input.press_crouch();
        input.press_jump();

        let first = input.consume();
        assert!(first.crouch_pressed);
        assert!(first.crouch_held);
        assert!(first.jump_pressed);

        let second = input.consume();
        assert!(!second.crouch_pressed, "edge must not repeat");
        assert!(second.crouch_held, "held state persists");
        assert!(!second.jump_pressed);
    }

    #[test]
    fn test_repeated_press_is_not_an_edge() {
        let mut input = InputAggregator::new();
        input.press_sprint();
        input.consume();
        input.press_sprint();
        assert!(!input.consume().sprint_pressed);
        input.release_sprint();
        input.press_sprint();
        let frame = input.consume();
        assert!(frame.sprint_released);
        assert!(frame.sprint_pressed);
    }

    #[test]
    fn test_axes_clamped_and_drained_once() {
        let mut input = InputAggregator::new();
        input.set_axes(2.0, -3.0);
        input.push_mouse_delta(1.5, 0.0);
        input.push_mouse_delta(0.5, -1.0);

        let frame = input.consume();
        assert_eq!(frame.axes, Vector2::new(1.0, -1.0));
        assert_eq!(frame.mouse, Vector2::new(2.0, -1.0));
        // Both reset after the drain.
        let next = input.consume();
        assert_eq!(next.mouse, Vector2::zeros());
        assert_eq!(next.axes, Vector2::zeros());
    }
}
