use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

pub const EPSILON: f32 = 1.0e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const FORWARD: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        (other - self).length_sq()
    }

    pub fn try_normalize(self) -> Option<Vec2> {
        let len_sq = self.length_sq();
        if len_sq <= EPSILON || !len_sq.is_finite() {
            return None;
        }
        let inv_len = 1.0 / len_sq.sqrt();
        Some(Vec2::new(self.x * inv_len, self.y * inv_len))
    }

    pub fn normalize_or(self, default: Vec2) -> Vec2 {
        self.try_normalize().unwrap_or(default)
    }

    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn angle(self) -> f32 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        self.y.atan2(self.x)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

pub fn normalize_to_magnitude(v: Vec2, magnitude: f32) -> Vec2 {
    match v.try_normalize() {
        Some(unit) => unit * magnitude,
        None => Vec2::ZERO,
    }
}

pub fn limit_magnitude(v: Vec2, max_magnitude: f32) -> Vec2 {
    if max_magnitude <= 0.0 {
        return Vec2::ZERO;
    }

    let mag_sq = v.length_sq();
    let max_sq = max_magnitude * max_magnitude;
    if mag_sq <= max_sq {
        return v;
    }

    v * (max_magnitude / mag_sq.sqrt())
}

pub fn steer_towards(direction: Vec2, velocity: Vec2, max_speed: f32, max_force: f32) -> Vec2 {
    match direction.try_normalize() {
        Some(unit) => limit_magnitude(unit * max_speed - velocity, max_force),
        None => Vec2::ZERO,
    }
}

/// Keeps `v` inside the `[min_speed, max_speed]` band without changing its
/// direction. A stalled vector is restarted along the forward axis.
pub fn clamp_speed(v: Vec2, min_speed: f32, max_speed: f32) -> Vec2 {
    let speed_sq = v.length_sq();
    if speed_sq <= EPSILON {
        return Vec2::FORWARD * min_speed;
    }

    if speed_sq < min_speed * min_speed {
        normalize_to_magnitude(v, min_speed)
    } else if speed_sq > max_speed * max_speed {
        normalize_to_magnitude(v, max_speed)
    } else {
        v
    }
}

pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
