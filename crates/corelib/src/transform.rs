use crate::{Mat4, Quat, Vec3};

/// Body transform: translation, spin about the local Y axis, non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Spin angle in radians around local +Y.
    pub spin: f32,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub fn from_tss(translation: Vec3, spin: f32, scale: Vec3) -> Self {
        Self {
            translation,
            spin,
            scale,
        }
    }

    /// Build matrix = T * Ry * S (column-major Mat4 per glam).
    /// Scale first, then spin, then translate: the body spins about its own center.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_rotation_y(self.spin);
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }
}
