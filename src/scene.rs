//! Per-frame composition of the clock.
//!
//! [`compose_scene`] is a pure function: given the orbit angles, the elapsed time
//! and the handles of the three shared meshes, it returns one [`DrawCommand`] per
//! visible part with a freshly built model matrix. Nothing is cached between
//! frames.
//!
//! Every part's matrix is `base * local`, where `base` is the orbit rotation and
//! `local` places the part relative to the clock's own origin. The pendulum rod
//! and ball share one `pivot * swing` prefix, so the ball always hangs from the
//! rod's free end.

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::geometry::DiskParams;
use crate::mesh_queue::MeshId;
use crate::motion::MotionAngles;
use crate::orbit::{OrbitController, base_rotation};
use crate::transform::Transform;

/// Height of the clock's center above the world origin.
pub const CLOCK_ELEVATION: f32 = 1.5;
/// The one disk mesh every round part is scaled from.
pub const FACE_DISK: DiskParams = DiskParams::new(0.55, 0.05, 64);
pub const HOUR_MARKER_COUNT: usize = 12;
/// Distance of each hour marker from the center of the face.
pub const MARKER_RADIUS: f32 = 0.45;

pub const FACE_DEPTH: f32 = 0.3;
pub const MARKER_DEPTH: f32 = 0.35;
pub const MINUTE_HAND_DEPTH: f32 = 0.4;
pub const HOUR_HAND_DEPTH: f32 = 0.45;

pub const HOUR_HAND_SCALE: Vec3 = Vec3::new(0.2, 0.5, 0.2);
pub const MINUTE_HAND_SCALE: Vec3 = Vec3::new(0.2, 0.8, 0.2);

/// How far below the clock's center the pendulum hangs from.
pub const PIVOT_DROP: f32 = 1.0;
pub const PIVOT_SCALE: f32 = 0.05;
pub const ROD_OFFSET: f32 = -0.3;
pub const ROD_SCALE: Vec3 = Vec3::new(0.2, 2.6, 0.2);
pub const BALL_OFFSET: f32 = -0.8;
pub const BALL_SCALE: Vec3 = Vec3::new(0.2, 0.2, 0.06);

/// Body, face, twelve markers, two hands and three pendulum parts.
pub const DRAW_COMMANDS_PER_FRAME: usize = 2 + HOUR_MARKER_COUNT + 2 + 3;

/// Everything a frame depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    /// Orbit tilt in degrees.
    pub rotation_x: f32,
    /// Orbit spin in degrees.
    pub rotation_y: f32,
    /// Seconds since startup.
    pub time: f32,
}

impl FrameState {
    pub fn new(orbit: &OrbitController, time: f32) -> Self {
        Self {
            rotation_x: orbit.rotation_x,
            rotation_y: orbit.rotation_y,
            time,
        }
    }
}

/// Handles of the meshes generated once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticMeshes {
    pub body: MeshId,
    pub rect: MeshId,
    pub disk: MeshId,
}

/// Which part of the clock a command draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    Body,
    Face,
    /// Hour marker at `index * 30°` counter-clockwise from 3 o'clock.
    HourMarker(u8),
    HourHand,
    MinuteHand,
    PendulumPivot,
    PendulumRod,
    PendulumBall,
}

/// One mesh instance to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub part: Part,
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: Color,
}

/// Builds the draw list for one frame, in draw order.
pub fn compose_scene(state: FrameState, meshes: &StaticMeshes) -> Vec<DrawCommand> {
    let base = base_rotation(state.rotation_x, state.rotation_y);
    let angles = MotionAngles::at(state.time);
    let e = CLOCK_ELEVATION;

    let placed = || Transform::from_matrix(base);
    let mut commands = Vec::with_capacity(DRAW_COMMANDS_PER_FRAME);
    let mut push = |part: Part, mesh: MeshId, transform: Transform, color: Color| {
        commands.push(DrawCommand {
            part,
            mesh,
            model: transform.matrix(),
            color,
        });
    };

    push(
        Part::Body,
        meshes.body,
        placed().translate(Vec3::new(0.0, e, 0.0)),
        Color::CLOCK_BODY,
    );
    push(
        Part::Face,
        meshes.disk,
        placed().translate(Vec3::new(0.0, e, FACE_DEPTH)),
        Color::CLOCK_FACE,
    );

    for i in 0..HOUR_MARKER_COUNT {
        let a = (i as f32 * 30.0).to_radians();
        let position = Vec3::new(
            a.cos() * MARKER_RADIUS,
            a.sin() * MARKER_RADIUS + e,
            MARKER_DEPTH,
        );
        push(
            Part::HourMarker(i as u8),
            meshes.rect,
            placed().translate(position).rotate_z(a),
            Color::HOUR_MARKER,
        );
    }

    push(
        Part::HourHand,
        meshes.rect,
        placed()
            .translate(Vec3::new(0.0, e, HOUR_HAND_DEPTH))
            .rotate_z(angles.hour)
            .scale(HOUR_HAND_SCALE),
        Color::BLACK,
    );
    push(
        Part::MinuteHand,
        meshes.rect,
        placed()
            .translate(Vec3::new(0.0, e, MINUTE_HAND_DEPTH))
            .rotate_z(angles.minute)
            .scale(MINUTE_HAND_SCALE),
        Color::BLACK,
    );

    let pivot = placed().translate(Vec3::new(0.0, e - PIVOT_DROP, 0.0));
    let swing = pivot.rotate_z(angles.pendulum);

    push(
        Part::PendulumPivot,
        meshes.disk,
        pivot.uniform_scale(PIVOT_SCALE),
        Color::BLACK,
    );
    push(
        Part::PendulumRod,
        meshes.rect,
        swing
            .translate(Vec3::new(0.0, ROD_OFFSET, 0.0))
            .scale(ROD_SCALE),
        Color::BLACK,
    );
    push(
        Part::PendulumBall,
        meshes.disk,
        swing
            .translate(Vec3::new(0.0, BALL_OFFSET, 0.0))
            .scale(BALL_SCALE),
        Color::PENDULUM_BALL,
    );

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RECT_HALF_HEIGHT;
    use crate::motion::PENDULUM_AMPLITUDE_DEGREES;
    use approx::assert_abs_diff_eq;

    const MESHES: StaticMeshes = StaticMeshes {
        body: MeshId(0),
        rect: MeshId(1),
        disk: MeshId(2),
    };

    fn at(rotation_x: f32, rotation_y: f32, time: f32) -> Vec<DrawCommand> {
        compose_scene(
            FrameState {
                rotation_x,
                rotation_y,
                time,
            },
            &MESHES,
        )
    }

    fn find(commands: &[DrawCommand], part: Part) -> DrawCommand {
        *commands.iter().find(|c| c.part == part).unwrap()
    }

    fn origin(cmd: &DrawCommand) -> Vec3 {
        cmd.model.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn draws_every_part_in_order() {
        let commands = at(0.0, 0.0, 0.0);
        assert_eq!(commands.len(), DRAW_COMMANDS_PER_FRAME);
        assert_eq!(commands.len(), 19);

        let mut expected = vec![Part::Body, Part::Face];
        expected.extend((0..12).map(Part::HourMarker));
        expected.extend([
            Part::HourHand,
            Part::MinuteHand,
            Part::PendulumPivot,
            Part::PendulumRod,
            Part::PendulumBall,
        ]);
        let parts: Vec<_> = commands.iter().map(|c| c.part).collect();
        assert_eq!(parts, expected);
    }

    #[test]
    fn parts_use_shared_meshes_and_palette() {
        for cmd in at(10.0, 20.0, 3.0) {
            let (mesh, color) = match cmd.part {
                Part::Body => (MESHES.body, Color::CLOCK_BODY),
                Part::Face => (MESHES.disk, Color::CLOCK_FACE),
                Part::HourMarker(_) => (MESHES.rect, Color::HOUR_MARKER),
                Part::HourHand | Part::MinuteHand | Part::PendulumRod => {
                    (MESHES.rect, Color::BLACK)
                }
                Part::PendulumPivot => (MESHES.disk, Color::BLACK),
                Part::PendulumBall => (MESHES.disk, Color::PENDULUM_BALL),
            };
            assert_eq!(cmd.mesh, mesh, "{:?}", cmd.part);
            assert_eq!(cmd.color, color, "{:?}", cmd.part);
        }
    }

    #[test]
    fn rest_pose_positions() {
        let commands = at(0.0, 0.0, 0.0);
        let e = CLOCK_ELEVATION;

        assert!(origin(&find(&commands, Part::Body)).abs_diff_eq(Vec3::new(0.0, e, 0.0), 1e-6));
        assert!(origin(&find(&commands, Part::Face)).abs_diff_eq(Vec3::new(0.0, e, 0.3), 1e-6));
        assert!(
            origin(&find(&commands, Part::PendulumPivot))
                .abs_diff_eq(Vec3::new(0.0, e - 1.0, 0.0), 1e-6)
        );
        assert!(
            origin(&find(&commands, Part::PendulumBall))
                .abs_diff_eq(Vec3::new(0.0, e - 1.8, 0.0), 1e-6)
        );

        // Both hands point straight up at rest.
        let hour = find(&commands, Part::HourHand).model;
        let tip = hour.transform_point3(Vec3::new(0.0, RECT_HALF_HEIGHT, 0.0));
        assert!(tip.abs_diff_eq(Vec3::new(0.0, e + 0.1, 0.45), 1e-6));
    }

    #[test]
    fn markers_ring_the_face() {
        let commands = at(0.0, 0.0, 0.0);
        let center = Vec3::new(0.0, CLOCK_ELEVATION, MARKER_DEPTH);
        for i in 0..12u8 {
            let p = origin(&find(&commands, Part::HourMarker(i)));
            assert_abs_diff_eq!(p.distance(center), MARKER_RADIUS, epsilon = 1e-5);
            assert_abs_diff_eq!(p.z, MARKER_DEPTH, epsilon = 1e-6);
        }
        // Marker 3 sits at 12 o'clock.
        let top = origin(&find(&commands, Part::HourMarker(3)));
        assert!(top.abs_diff_eq(Vec3::new(0.0, CLOCK_ELEVATION + MARKER_RADIUS, MARKER_DEPTH), 1e-5));
    }

    #[test]
    fn markers_point_away_from_center() {
        let commands = at(0.0, 0.0, 0.0);
        for i in 0..12u8 {
            let a = (f32::from(i) * 30.0).to_radians();
            let up = find(&commands, Part::HourMarker(i))
                .model
                .transform_vector3(Vec3::Y);
            assert!(
                up.abs_diff_eq(Vec3::new(-a.sin(), a.cos(), 0.0), 1e-5),
                "marker {i}: {up}"
            );
        }
    }

    #[test]
    fn hour_hand_turns_one_degree_per_second() {
        let commands = at(0.0, 0.0, 90.0);
        let hour = find(&commands, Part::HourHand).model;
        let tip = hour.transform_point3(Vec3::new(0.0, RECT_HALF_HEIGHT, 0.0));
        let expected = Vec3::new(
            -RECT_HALF_HEIGHT * HOUR_HAND_SCALE.y,
            CLOCK_ELEVATION,
            HOUR_HAND_DEPTH,
        );
        assert!(tip.abs_diff_eq(expected, 1e-5), "{tip}");

        // The minute hand has gone round one and a half times and points down.
        let minute = find(&commands, Part::MinuteHand).model;
        let tip = minute.transform_point3(Vec3::new(0.0, RECT_HALF_HEIGHT, 0.0));
        assert_abs_diff_eq!(tip.x, 0.0, epsilon = 1e-4);
        assert!(tip.y < CLOCK_ELEVATION);
    }

    #[test]
    fn minute_hand_turns_six_degrees_per_second() {
        let commands = at(0.0, 0.0, 15.0);
        let minute = find(&commands, Part::MinuteHand).model;
        let tip = minute.transform_point3(Vec3::new(0.0, RECT_HALF_HEIGHT, 0.0));
        let expected = Vec3::new(
            -RECT_HALF_HEIGHT * MINUTE_HAND_SCALE.y,
            CLOCK_ELEVATION,
            MINUTE_HAND_DEPTH,
        );
        assert!(tip.abs_diff_eq(expected, 1e-5), "{tip}");

        // Fifteen degrees in, the hour hand has barely moved off twelve.
        let hour = find(&commands, Part::HourHand).model;
        let tip = hour.transform_point3(Vec3::new(0.0, RECT_HALF_HEIGHT, 0.0));
        let a = 15f32.to_radians();
        let reach = RECT_HALF_HEIGHT * HOUR_HAND_SCALE.y;
        assert!(tip.abs_diff_eq(
            Vec3::new(-a.sin() * reach, CLOCK_ELEVATION + a.cos() * reach, HOUR_HAND_DEPTH),
            1e-5
        ));
    }

    #[test]
    fn ball_hangs_from_rod_end_at_any_swing() {
        for step in 0..40 {
            let t = step as f32 * 0.11;
            let commands = at(25.0, -70.0, t);
            let rod = find(&commands, Part::PendulumRod).model;
            let ball = find(&commands, Part::PendulumBall).model;

            // Ball center expressed in the rod's own (unscaled rect) coordinates.
            let local = rod.inverse().transform_point3(ball.transform_point3(Vec3::ZERO));
            assert_abs_diff_eq!(local.x, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(local.z, 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(local.y, (BALL_OFFSET - ROD_OFFSET) / ROD_SCALE.y, epsilon = 1e-4);
            assert!(local.y < 0.0 && local.y >= -RECT_HALF_HEIGHT);
        }
    }

    #[test]
    fn pendulum_swings_about_pivot() {
        let pivot = Vec3::new(0.0, CLOCK_ELEVATION - PIVOT_DROP, 0.0);
        let peak = at(0.0, 0.0, 0.5);
        let ball = origin(&find(&peak, Part::PendulumBall));

        let amplitude = PENDULUM_AMPLITUDE_DEGREES.to_radians();
        let expected = pivot + Vec3::new(amplitude.sin(), -amplitude.cos(), 0.0) * -BALL_OFFSET;
        assert!(ball.abs_diff_eq(expected, 1e-5));
        assert_abs_diff_eq!(ball.distance(pivot), -BALL_OFFSET, epsilon = 1e-5);

        // The pivot itself does not move.
        assert!(origin(&find(&peak, Part::PendulumPivot)).abs_diff_eq(pivot, 1e-6));
    }

    #[test]
    fn orbit_rotates_assembly_rigidly() {
        let rest = at(0.0, 0.0, 1.7);
        let turned = at(-35.0, 123.0, 1.7);
        let base = base_rotation(-35.0, 123.0);

        for (a, b) in rest.iter().zip(&turned) {
            assert_eq!(a.part, b.part);
            assert!((base * a.model).abs_diff_eq(b.model, 1e-5), "{:?}", a.part);
        }
    }

    #[test]
    fn frame_state_reads_orbit() {
        let mut orbit = OrbitController::new();
        orbit.on_button_down(0.0, 0.0);
        orbit.on_move(10.0, 20.0);
        let state = FrameState::new(&orbit, 4.0);
        assert_eq!(state.rotation_x, orbit.rotation_x);
        assert_eq!(state.rotation_y, orbit.rotation_y);
        assert_eq!(state.time, 4.0);
    }
}
