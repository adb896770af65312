/// RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Light grey behind the clock.
    pub const BACKGROUND: Color = Color::rgb(0.95, 0.95, 0.95);
    /// Dark red wood of the clock body.
    pub const CLOCK_BODY: Color = Color::rgb(0.402, 0.0, 0.0);
    pub const CLOCK_FACE: Color = Color::rgb(0.686, 0.274, 0.274);
    pub const HOUR_MARKER: Color = Color::rgb(0.4, 0.0, 0.0);
    /// Brass pendulum bob.
    pub const PENDULUM_BALL: Color = Color::rgb(0.9, 0.8, 0.1);

    /// Packs the color into the `vec4<f32>` layout the shaders read.
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}
