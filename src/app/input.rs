use crate::render::OrbitInput;
use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Radians of orbit per pixel of drag.
const DRAG_SENSITIVITY: f32 = 0.005;
/// Radians per second while an arrow key is held.
const KEY_ORBIT_SPEED: f32 = 1.5;
/// Distance multiplier per wheel line.
const WHEEL_ZOOM_STEP: f32 = 0.9;
const PIXELS_PER_LINE: f32 = 50.0;
/// A press and release closer than this many pixels counts as a click.
const CLICK_SLOP: f32 = 4.0;

/// Orbit input and pick requests gathered for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameControls {
    pub orbit: OrbitInput,
    pub pick_request: Option<[f32; 2]>,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    cursor: Option<Vec2>,
    press_origin: Option<Vec2>,
    dragging: bool,
    drag: Vec2,
    zoom: Option<f32>,
    pick_request: Option<[f32; 2]>,
}

impl InputState {
    /// Returns true when the event was consumed as camera input.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event.physical_key, event.state == ElementState::Pressed)
            }
            WindowEvent::MouseInput { state, button, .. } => self.handle_mouse_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(*position);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.press_origin = None;
                self.dragging = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_scroll(*delta);
                true
            }
            WindowEvent::PinchGesture { delta, .. } => {
                self.handle_pinch(*delta);
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> bool {
        match key {
            PhysicalKey::Code(KeyCode::ArrowLeft) => self.aim_left = pressed,
            PhysicalKey::Code(KeyCode::ArrowRight) => self.aim_right = pressed,
            PhysicalKey::Code(KeyCode::ArrowUp) => self.aim_up = pressed,
            PhysicalKey::Code(KeyCode::ArrowDown) => self.aim_down = pressed,
            _ => return false,
        }
        true
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        match state {
            ElementState::Pressed => {
                self.press_origin = self.cursor;
                self.dragging = self.cursor.is_some();
            }
            ElementState::Released => {
                if let (Some(origin), Some(cursor)) = (self.press_origin, self.cursor) {
                    if origin.distance(cursor) < CLICK_SLOP {
                        self.pick_request = Some([cursor.x, cursor.y]);
                    }
                }
                self.press_origin = None;
                self.dragging = false;
            }
        }
        true
    }

    pub fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let next = Vec2::new(position.x as f32, position.y as f32);
        if self.dragging {
            if let Some(previous) = self.cursor {
                self.drag += next - previous;
            }
        }
        self.cursor = Some(next);
    }

    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
        };
        if lines.is_finite() && lines != 0.0 {
            self.scale_zoom(WHEEL_ZOOM_STEP.powf(lines));
        }
    }

    /// Positive pinch deltas magnify, which brings the camera closer.
    pub fn handle_pinch(&mut self, delta: f64) {
        let factor = 1.0 - delta as f32;
        if factor.is_finite() && factor > 0.0 {
            self.scale_zoom(factor);
        }
    }

    fn scale_zoom(&mut self, factor: f32) {
        self.zoom = Some(self.zoom.unwrap_or(1.0) * factor);
    }

    /// Drains the accumulated deltas; held arrow keys contribute `dt` worth of rotation.
    pub fn take_frame(&mut self, dt: f32) -> FrameControls {
        let mut rotate = self.drag * DRAG_SENSITIVITY;
        let step = KEY_ORBIT_SPEED * dt.max(0.0);
        if self.aim_left {
            rotate.x -= step;
        }
        if self.aim_right {
            rotate.x += step;
        }
        if self.aim_up {
            rotate.y += step;
        }
        if self.aim_down {
            rotate.y -= step;
        }
        self.drag = Vec2::ZERO;

        FrameControls {
            orbit: OrbitInput {
                rotate,
                zoom: self.zoom.take().unwrap_or(1.0),
            },
            pick_request: self.pick_request.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    #[test]
    fn idle_frame_is_neutral() {
        let mut input = InputState::default();
        let controls = input.take_frame(0.016);
        assert!(controls.orbit.is_idle());
        assert_eq!(controls.pick_request, None);
    }

    #[test]
    fn drag_rotates_without_picking() {
        let mut input = InputState::default();
        input.handle_cursor(at(100.0, 100.0));
        input.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.handle_cursor(at(140.0, 90.0));
        input.handle_mouse_button(MouseButton::Left, ElementState::Released);

        let controls = input.take_frame(0.016);
        assert!((controls.orbit.rotate.x - 40.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        assert!((controls.orbit.rotate.y + 10.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        assert_eq!(controls.pick_request, None);
        assert!(input.take_frame(0.016).orbit.is_idle());
    }

    #[test]
    fn click_requests_a_pick_once() {
        let mut input = InputState::default();
        input.handle_cursor(at(320.0, 240.0));
        input.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.handle_cursor(at(321.0, 240.0));
        input.handle_mouse_button(MouseButton::Left, ElementState::Released);

        assert_eq!(input.take_frame(0.016).pick_request, Some([321.0, 240.0]));
        assert_eq!(input.take_frame(0.016).pick_request, None);
    }

    #[test]
    fn cursor_motion_without_press_does_nothing() {
        let mut input = InputState::default();
        input.handle_cursor(at(0.0, 0.0));
        input.handle_cursor(at(50.0, 50.0));
        assert!(input.take_frame(0.016).orbit.is_idle());
    }

    #[test]
    fn arrow_keys_orbit_by_elapsed_time() {
        let mut input = InputState::default();
        assert!(input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), true));
        assert!(!input.handle_key(PhysicalKey::Code(KeyCode::KeyA), true));
        let controls = input.take_frame(0.5);
        assert!((controls.orbit.rotate.x + KEY_ORBIT_SPEED * 0.5).abs() < 1e-6);

        input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), false);
        assert!(input.take_frame(0.5).orbit.is_idle());
    }

    #[test]
    fn wheel_and_pinch_accumulate_zoom() {
        let mut input = InputState::default();
        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_pinch(0.5);
        let zoom = input.take_frame(0.016).orbit.zoom;
        assert!((zoom - WHEEL_ZOOM_STEP * 0.5).abs() < 1e-6);
        assert_eq!(input.take_frame(0.016).orbit.zoom, 1.0);
    }

    #[test]
    fn degenerate_pinch_is_ignored() {
        let mut input = InputState::default();
        input.handle_pinch(1.0);
        input.handle_pinch(f64::NAN);
        assert_eq!(input.take_frame(0.016).orbit.zoom, 1.0);
    }
}
