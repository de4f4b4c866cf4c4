use glam::{Quat, Vec2, Vec3};

/// Designed look-at point for manual orbiting.
pub const ORBIT_TARGET: [f32; 3] = [0.0, 1.0, 0.0];
pub const INITIAL_CAMERA_POSITION: [f32; 3] = [0.0, 1.6, 3.0];
pub const MIN_ORBIT_DISTANCE: f32 = 0.2;
pub const MAX_ORBIT_DISTANCE: f32 = 20.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 100.0;

const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// Orbit deltas accumulated from pointer and keyboard input since the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitInput {
    /// Radians: x orbits around the vertical axis, y tilts up/down.
    pub rotate: Vec2,
    /// Multiplier on the orbit distance; below 1 moves closer.
    pub zoom: f32,
}

impl Default for OrbitInput {
    fn default() -> Self {
        Self {
            rotate: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl OrbitInput {
    pub fn is_idle(&self) -> bool {
        self.rotate == Vec2::ZERO && self.zoom == 1.0
    }
}

/// Drag-to-rotate, pinch/scroll-to-zoom camera around a fixed target. Never rolls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    azimuth: f32,
    elevation: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(INITIAL_CAMERA_POSITION, ORBIT_TARGET)
    }
}

impl OrbitCamera {
    pub fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        let target = Vec3::from(target);
        let offset = Vec3::from(position) - target;
        let distance = offset
            .length()
            .clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE);
        let (azimuth, elevation) = if offset.length_squared() > 1e-12 {
            let dir = offset.normalize();
            (dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin())
        } else {
            (0.0, 0.0)
        };
        Self {
            target,
            distance,
            azimuth,
            elevation: elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn position(&self) -> Vec3 {
        let cos_elevation = self.elevation.cos();
        let offset = Vec3::new(
            self.azimuth.sin() * cos_elevation,
            self.elevation.sin(),
            self.azimuth.cos() * cos_elevation,
        );
        self.target + offset * self.distance
    }

    /// Looks from [`OrbitCamera::position`] at the target with -Z forward and +Y up.
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.azimuth) * Quat::from_rotation_x(-self.elevation)
    }

    /// Returns true when the pose changed.
    pub fn apply(&mut self, input: &OrbitInput) -> bool {
        let mut changed = false;
        if input.rotate.is_finite() && input.rotate != Vec2::ZERO {
            self.azimuth -= input.rotate.x;
            self.elevation = (self.elevation + input.rotate.y).clamp(-MAX_ELEVATION, MAX_ELEVATION);
            wrap_angle(&mut self.azimuth);
            changed = true;
        }
        if input.zoom.is_finite() && input.zoom > 0.0 && input.zoom != 1.0 {
            let distance =
                (self.distance * input.zoom).clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE);
            changed |= distance != self.distance;
            self.distance = distance;
        }
        changed
    }
}

fn wrap_angle(angle: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        *angle = (*angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}
