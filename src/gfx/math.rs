//! # Math Helpers
//!
//! Thin, stateless wrappers over [`cgmath`] used by the scene graph and the
//! OBJ assembler. Matrices are column-major `Matrix4<f32>`, which is also the
//! layout uploaded to shaders.
//!
//! Composition helpers post-multiply, so `x_rotate(translate(m, t), a)` applies
//! the rotation first and the translation last when transforming a point.

use cgmath::{InnerSpace, Matrix, Matrix4, Rad, SquareMatrix, Vector3, Zero};

pub type Vec3 = Vector3<f32>;
pub type Mat4 = Matrix4<f32>;

pub fn identity() -> Mat4 {
    Matrix4::identity()
}

pub fn translate(matrix: Mat4, translation: Vec3) -> Mat4 {
    matrix * Matrix4::from_translation(translation)
}

pub fn x_rotate(matrix: Mat4, angle: f32) -> Mat4 {
    matrix * Matrix4::from_angle_x(Rad(angle))
}

pub fn y_rotate(matrix: Mat4, angle: f32) -> Mat4 {
    matrix * Matrix4::from_angle_y(Rad(angle))
}

pub fn z_rotate(matrix: Mat4, angle: f32) -> Mat4 {
    matrix * Matrix4::from_angle_z(Rad(angle))
}

pub fn scale(matrix: Mat4, scale: Vec3) -> Mat4 {
    matrix * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// Returns `None` for singular matrices (e.g. a zero scale component).
pub fn inverse(matrix: Mat4) -> Option<Mat4> {
    matrix.invert()
}

pub fn transpose(matrix: Mat4) -> Mat4 {
    matrix.transpose()
}

/// Inverse-transpose used to transform normals under non-uniform scale.
pub fn inverse_transpose(matrix: Mat4) -> Option<Mat4> {
    inverse(matrix).map(transpose)
}

/// Right-handed OpenGL-style perspective projection.
///
/// Unlike [`cgmath::perspective`] this never panics on degenerate input; a
/// zero field of view or `near == far` simply yields non-finite entries.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = (std::f32::consts::FRAC_PI_2 - 0.5 * fov).tan();
    let range_inv = 1.0 / (near - far);

    #[rustfmt::skip]
    let projection = Matrix4::new(
        f / aspect, 0.0, 0.0,                             0.0,
        0.0,        f,   0.0,                             0.0,
        0.0,        0.0, (near + far) * range_inv,        -1.0,
        0.0,        0.0, near * far * range_inv * 2.0,    0.0,
    );
    projection
}

/// Builds a camera placement matrix located at `eye` looking at `target`.
///
/// This is the camera-to-world matrix; invert it to get a view matrix.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let z_axis = (eye - target).normalize();
    let x_axis = up.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis).normalize();

    Matrix4::from_cols(
        x_axis.extend(0.0),
        y_axis.extend(0.0),
        z_axis.extend(0.0),
        eye.extend(1.0),
    )
}

pub fn to_array(matrix: &Mat4) -> [f32; 16] {
    *AsRef::<[f32; 16]>::as_ref(matrix)
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box collapsed onto a single point.
    pub fn point(point: Vec3) -> Self {
        Self::new(point, point)
    }

    /// Builds a box from a flat `[x, y, z, x, y, z, ...]` buffer.
    ///
    /// Returns `None` when the buffer holds no complete position.
    pub fn from_flat_positions(positions: &[f32]) -> Option<Self> {
        let mut chunks = positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut aabb = Self::point(Vector3::new(first[0], first[1], first[2]));

        for p in chunks {
            aabb.include(Vector3::new(p[0], p[1], p[2]));
        }

        Some(aabb)
    }

    pub fn include(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(mut self, other: &Aabb) -> Self {
        self.include(other.min);
        self.include(other.max);
        self
    }

    pub fn center(&self) -> Vec3 {
        self.min + (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::point(Vector3::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!(
            (a - b).magnitude() < EPSILON,
            "expected {:?} to equal {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_translate_moves_points() {
        let m = translate(identity(), Vector3::new(1.0, 2.0, 3.0));
        let p = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_vec_eq(p.truncate(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_composition_applies_last_operation_first() {
        // Rotate a unit X vector a quarter turn about Z, then translate it.
        let m = z_rotate(translate(identity(), Vector3::new(10.0, 0.0, 0.0)), FRAC_PI_2);
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_vec_eq(p.truncate(), Vector3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = scale(
            y_rotate(translate(identity(), Vector3::new(3.0, -1.0, 2.0)), 0.7),
            Vector3::new(2.0, 0.5, 1.5),
        );
        let inv = inverse(m).expect("matrix is invertible");
        let product = m * inv;
        for (a, b) in to_array(&product).iter().zip(to_array(&identity()).iter()) {
            assert!((a - b).abs() < EPSILON);
        }
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = scale(identity(), Vector3::new(1.0, 0.0, 1.0));
        assert!(inverse(m).is_none());
        assert!(inverse_transpose(m).is_none());
    }

    #[test]
    fn test_transpose_swaps_rows_and_columns() {
        let m = translate(identity(), Vector3::new(4.0, 5.0, 6.0));
        let t = transpose(m);
        assert_eq!(t.x.w, 4.0);
        assert_eq!(t.y.w, 5.0);
        assert_eq!(t.z.w, 6.0);
        assert_eq!(t.w.x, 0.0);
    }

    #[test]
    fn test_perspective_matches_cgmath() {
        let ours = perspective(1.2, 1.5, 0.1, 100.0);
        let theirs = cgmath::perspective(Rad(1.2), 1.5, 0.1, 100.0);
        for (a, b) in to_array(&ours).iter().zip(to_array(&theirs).iter()) {
            assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_look_at_points_negative_z_towards_target() {
        let eye = Vector3::new(0.0, 0.0, 5.0);
        let m = look_at(eye, Vector3::zero(), Vector3::unit_y());

        assert_vec_eq(m.w.truncate(), eye);
        let forward = (m * Vector4::new(0.0, 0.0, -1.0, 0.0)).truncate();
        assert_vec_eq(forward, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_aabb_from_flat_positions() {
        let aabb = Aabb::from_flat_positions(&[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, -1.0, 2.0, 3.0])
            .expect("three positions");
        assert_vec_eq(aabb.min, Vector3::new(-1.0, 0.0, 0.0));
        assert_vec_eq(aabb.max, Vector3::new(1.0, 2.0, 3.0));
        assert_vec_eq(aabb.center(), Vector3::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn test_aabb_from_empty_buffer() {
        assert!(Aabb::from_flat_positions(&[]).is_none());
        assert!(Aabb::from_flat_positions(&[1.0, 2.0]).is_none());
    }
}
