use crate::Vec3;

/// Orthonormal shading basis with `normal` as the local +Z axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame around a unit normal.
    ///
    /// Branchless construction from Duff et al. 2017; the tangent orientation
    /// around the normal is arbitrary but continuous away from `n.z = -1`.
    pub fn from_normal(normal: Vec3) -> Self {
        let sign = 1.0f32.copysign(normal.z);
        let a = -1.0 / (sign + normal.z);
        let b = normal.x * normal.y * a;
        let tangent = Vec3::new(1.0 + sign * normal.x * normal.x * a, sign * b, -sign * normal.x);
        let bitangent = Vec3::new(b, sign + normal.y * normal.y * a, -normal.y);

        Self {
            tangent,
            bitangent,
            normal,
        }
    }

    /// The same frame mirrored through the surface (normal and bitangent negated),
    /// keeping it right-handed.
    pub fn flipped(&self) -> Self {
        Self {
            tangent: self.tangent,
            bitangent: -self.bitangent,
            normal: -self.normal,
        }
    }

    /// World direction to local coordinates.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.tangent), v.dot(self.bitangent), v.dot(self.normal))
    }

    /// Local coordinates to world direction.
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }
}
