//! Keyboard and mouse state for the viewer.
//!
//! `Input` folds raw window events into per-frame edges (pressed this frame)
//! and continuous state (held). The window drains the edges once per redraw.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

/// Keys the viewer responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Quit.
    Q,
    Escape,
    /// Toggle fullscreen.
    F,
    /// Toggle point markers.
    M,
    /// Pause and resume.
    Space,
    /// Reset the cloth.
    R,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyR => KeyCode::R,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// A mouse change the interaction layer has to react to immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEvent {
    Pressed(MouseButton, Vec2),
    Released(MouseButton),
    /// Cursor moved while at least one button is held.
    Dragged(Vec2),
    /// Vertical wheel motion in lines, positive away from the user.
    Scrolled(f32),
}

#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    cursor: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down since the last [`begin_frame`](Self::begin_frame).
    /// Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn any_mouse_held(&self) -> bool {
        !self.mouse_held.is_empty()
    }

    /// Cursor position in physical pixels, origin top-left.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Clear per-frame edges.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Fold a window event into the tracked state. Mouse changes are also
    /// returned so the caller can drive picking and dragging without waiting
    /// for the next frame.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) -> Option<MouseEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    self.key(KeyCode::from(keycode), event.state);
                }
                None
            }
            WindowEvent::MouseInput { state, button, .. } => {
                Some(self.button(MouseButton::from(*button), *state))
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                (!self.mouse_held.is_empty()).then_some(MouseEvent::Dragged(self.cursor))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                Some(MouseEvent::Scrolled(lines))
            }
            _ => None,
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    fn button(&mut self, button: MouseButton, state: ElementState) -> MouseEvent {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
                MouseEvent::Pressed(button, self.cursor)
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
                MouseEvent::Released(button)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_repeat_is_not_a_press() {
        let mut input = Input::new();
        input.key(KeyCode::M, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::M));

        input.begin_frame();
        input.key(KeyCode::M, ElementState::Pressed);
        assert!(input.key_held(KeyCode::M));
        assert!(!input.key_pressed(KeyCode::M));

        input.key(KeyCode::M, ElementState::Released);
        input.key(KeyCode::M, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::M));
    }

    #[test]
    fn test_button_events_carry_cursor() {
        let mut input = Input::new();
        input.cursor = Vec2::new(12.0, 34.0);
        let ev = input.button(MouseButton::Middle, ElementState::Pressed);
        assert_eq!(ev, MouseEvent::Pressed(MouseButton::Middle, Vec2::new(12.0, 34.0)));
        assert!(input.mouse_held(MouseButton::Middle));

        let ev = input.button(MouseButton::Middle, ElementState::Released);
        assert_eq!(ev, MouseEvent::Released(MouseButton::Middle));
        assert!(!input.mouse_held(MouseButton::Middle));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyQ), KeyCode::Q);
        assert_eq!(KeyCode::from(WinitKeyCode::Escape), KeyCode::Escape);
        assert!(matches!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::Other(_)));
    }
}
