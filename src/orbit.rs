use glam::{Mat4, Vec2};

/// Degrees of rotation per pixel of pointer travel.
pub const ORBIT_SENSITIVITY: f32 = 0.3;
/// Tilt limit in degrees, short of a right angle so the clock never flips over.
pub const MAX_TILT_DEGREES: f32 = 89.0;

/// Whether a drag is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// A pointer event in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    ButtonDown { x: f32, y: f32 },
    ButtonUp,
    Moved { x: f32, y: f32 },
}

/// Rotates the whole clock in response to pointer drags.
///
/// Horizontal drags spin the clock about its vertical axis without limit.
/// Vertical drags tilt it about the X axis, clamped to ±[`MAX_TILT_DEGREES`].
///
/// # Example
/// ```
/// use pendulum_clock::{OrbitController, PointerEvent};
///
/// let mut orbit = OrbitController::new();
/// orbit.apply(PointerEvent::ButtonDown { x: 100.0, y: 100.0 });
/// orbit.apply(PointerEvent::Moved { x: 110.0, y: 100.0 });
/// orbit.apply(PointerEvent::ButtonUp);
///
/// assert!((orbit.rotation_y - 3.0).abs() < 1e-5);
/// assert_eq!(orbit.rotation_x, 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Tilt in degrees.
    pub rotation_x: f32,
    /// Spin in degrees.
    pub rotation_y: f32,
    pub sensitivity: f32,
    state: DragState,
    last: Vec2,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            sensitivity: ORBIT_SENSITIVITY,
            state: DragState::Idle,
            last: Vec2::ZERO,
        }
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    pub fn on_button_down(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging;
        self.last = Vec2::new(x, y);
    }

    pub fn on_button_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Rotate by the distance travelled since the last pointer position.
    pub fn on_move(&mut self, x: f32, y: f32) {
        if self.state != DragState::Dragging {
            return;
        }

        let position = Vec2::new(x, y);
        let delta = position - self.last;
        self.last = position;

        self.rotation_y += delta.x * self.sensitivity;
        self.rotation_x = (self.rotation_x + delta.y * self.sensitivity)
            .clamp(-MAX_TILT_DEGREES, MAX_TILT_DEGREES);
    }

    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::ButtonDown { x, y } => self.on_button_down(x, y),
            PointerEvent::ButtonUp => self.on_button_up(),
            PointerEvent::Moved { x, y } => self.on_move(x, y),
        }
    }

    /// Orientation shared by every part of the clock: tilt applied after spin.
    pub fn base_rotation(&self) -> Mat4 {
        base_rotation(self.rotation_x, self.rotation_y)
    }
}

/// `Rx(rotation_x) * Ry(rotation_y)` from angles in degrees.
pub fn base_rotation(rotation_x: f32, rotation_y: f32) -> Mat4 {
    Mat4::from_rotation_x(rotation_x.to_radians()) * Mat4::from_rotation_y(rotation_y.to_radians())
}
