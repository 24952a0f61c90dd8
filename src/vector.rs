use std::ops::{Add, AddAssign, Mul, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::ModelError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MagnetizationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MagnetizationVector {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_parts(transverse: Complex64, z: f64) -> Self {
        Self::new(transverse.re, transverse.im, z)
    }

    /// Transverse component as `x + iy`.
    pub fn transverse(&self) -> Complex64 {
        Complex64::new(self.x, self.y)
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn rotated(&self, angle: f64, axis: Axis) -> Result<Self, ModelError> {
        Ok(Rotation::new(angle, axis)?.apply(*self))
    }
}

impl Add for MagnetizationVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for MagnetizationVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for MagnetizationVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for MagnetizationVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::iter::Sum for MagnetizationVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Axis of an RF rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    /// Arbitrary direction, normalized when the rotation is built.
    Vector([f64; 3]),
}

impl Axis {
    fn unit(&self) -> Result<[f64; 3], ModelError> {
        match *self {
            Axis::X => Ok([1.0, 0.0, 0.0]),
            Axis::Y => Ok([0.0, 1.0, 0.0]),
            Axis::Z => Ok([0.0, 0.0, 1.0]),
            Axis::Vector([x, y, z]) => {
                let norm = (x * x + y * y + z * z).sqrt();
                if !(norm > 0.0) || !norm.is_finite() {
                    return Err(ModelError::DegenerateAxis);
                }
                Ok([x / norm, y / norm, z / norm])
            }
        }
    }
}

/// Rotation matrix of an instantaneous RF pulse.
///
/// Rotating the equilibrium state by +90° about X tips it onto +Y, which is the
/// usual MR convention (`v' = v cos θ + (v × u) sin θ + u (u·v)(1 - cos θ)`).
///
/// The sense is clockwise: a rotation by `θ` about Z multiplies `x + iy` by
/// `exp(-iθ)`. Off-resonance precession in the ensemble models is
/// counter-clockwise, `exp(+iω·dt)`, so a frequency offset `ω` acting for `dt`
/// equals a Z rotation by `-ω·dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation([[f64; 3]; 3]);

impl Rotation {
    pub fn new(angle: f64, axis: Axis) -> Result<Self, ModelError> {
        let [ux, uy, uz] = axis.unit()?;
        let (s, c) = angle.sin_cos();
        let d = 1.0 - c;

        Ok(Self([
            [c + d * ux * ux, s * uz + d * ux * uy, -s * uy + d * ux * uz],
            [-s * uz + d * uy * ux, c + d * uy * uy, s * ux + d * uy * uz],
            [s * uy + d * uz * ux, -s * ux + d * uz * uy, c + d * uz * uz],
        ]))
    }

    pub fn apply(&self, v: MagnetizationVector) -> MagnetizationVector {
        let [r0, r1, r2] = &self.0;
        MagnetizationVector::new(
            r0[0] * v.x + r0[1] * v.y + r0[2] * v.z,
            r1[0] * v.x + r1[1] * v.y + r1[2] * v.z,
            r2[0] * v.x + r2[1] * v.y + r2[2] * v.z,
        )
    }

    /// Rotates an isochromat stored as transverse phasor plus longitudinal part.
    pub(crate) fn apply_parts(&self, transverse: &mut Complex64, z: &mut f64) {
        let v = self.apply(MagnetizationVector::from_parts(*transverse, *z));
        *transverse = v.transverse();
        *z = v.z;
    }
}
