//! Core types: math re-exports, Transform, Camera, the celestial body model
//! and the registry that drives it.

pub use glam::{Mat4, Quat, Vec3, vec3};

pub mod body;
pub mod camera;
pub mod config;
pub mod error;
pub mod registry;
pub mod shared;
pub mod transform;

pub use body::{BodyId, BodyKind, BodyRecord, CelestialBody, RenderHandle};
pub use config::SolarConfig;
pub use error::{CoreError, CoreResult};
pub use registry::{MoonParams, PlanetParams, Registry, RenderItem};
pub use shared::SharedRegistry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_transform_is_identity_matrix() {
        let t = transform::Transform::from_tss(Vec3::ZERO, 0.0, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = transform::Transform::from_tss(vec3(1.0, 2.0, 3.0), 0.0, vec3(2.0, 3.0, 4.0));
        // Last column = translation, diagonal = scale (no spin).
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 3.0).abs() < 1e-6);
        assert!((m[10] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn spin_keeps_translation_column() {
        let t = transform::Transform::from_tss(vec3(50.0, 0.0, 0.0), 1.3, Vec3::splat(0.75));
        let m = t.matrix();
        assert_eq!(m.w_axis.truncate(), vec3(50.0, 0.0, 0.0));
        // Spin is about Y, so the Y basis keeps only the scale.
        assert!(m.y_axis.truncate().abs_diff_eq(vec3(0.0, 0.75, 0.0), 1e-6));
    }

    #[test]
    fn editor_camera_pv_is_finite() {
        let cam = camera::Camera::editor(16.0 / 9.0);
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
        // The sun at the origin projects to the center of the screen.
        let clip = pv.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
    }
}
