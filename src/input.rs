use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::orbit::PointerEvent;

/// Turns winit window events into [`PointerEvent`]s for the orbit controller.
///
/// Button events carry no coordinates, so the last cursor position is tracked
/// here and attached to presses. Only the left button drives the orbit.
#[derive(Clone, Debug)]
pub struct PointerInput {
    button: MouseButton,
    cursor: Vec2,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            cursor: Vec2::ZERO,
        }
    }
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event, returning the pointer event it maps to, if any.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(PointerEvent::Moved {
                    x: self.cursor.x,
                    y: self.cursor.y,
                })
            }
            WindowEvent::MouseInput { state, button, .. } if *button == self.button => {
                match state {
                    ElementState::Pressed => Some(PointerEvent::ButtonDown {
                        x: self.cursor.x,
                        y: self.cursor.y,
                    }),
                    ElementState::Released => Some(PointerEvent::ButtonUp),
                }
            }
            // The release may never arrive once focus is gone.
            WindowEvent::Focused(false) => Some(PointerEvent::ButtonUp),
            _ => None,
        }
    }
}
