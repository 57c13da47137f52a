//! Coin signed distance field
//!
//! Same field the fragment shader marches, evaluated on the CPU for picking.

use glam::Vec3;

use super::layout::CoinGeometry;

/// Signed distance to a capped cylinder centered at the origin, axis along Y
#[inline]
pub fn sd_capped_cylinder(p: Vec3, radius: f32, half_height: f32) -> f32 {
    let dx = Vec3::new(p.x, 0.0, p.z).length() - radius;
    let dy = p.y.abs() - half_height;
    let outside = glam::Vec2::new(dx.max(0.0), dy.max(0.0)).length();
    dx.max(dy).min(0.0) + outside
}

/// Bring a world point into the coin's local frame (coin rotated by
/// `orientation` about X)
#[inline]
pub fn to_coin_space(p: Vec3, orientation: f32) -> Vec3 {
    let (s, c) = orientation.sin_cos();
    Vec3::new(p.x, p.y * c + p.z * s, -p.y * s + p.z * c)
}

/// Signed distance from a world point to the coin body plus face insets
pub fn sd_coin(p: Vec3, geometry: &CoinGeometry, orientation: f32) -> f32 {
    let local = to_coin_space(p, orientation);
    let body = sd_capped_cylinder(local, geometry.radius, geometry.thickness * 0.5);
    // Insets sit just proud of each face; modelled as one thin slab
    let insets = sd_capped_cylinder(local, geometry.inset_radius, geometry.inset_offset);
    body.min(insets)
}

/// Compute SDF gradient (surface normal) using central differences
pub fn sdf_gradient<F>(p: Vec3, sdf: F) -> Vec3
where
    F: Fn(Vec3) -> f32,
{
    let eps = 1e-3;
    let dx = sdf(p + Vec3::X * eps) - sdf(p - Vec3::X * eps);
    let dy = sdf(p + Vec3::Y * eps) - sdf(p - Vec3::Y * eps);
    let dz = sdf(p + Vec3::Z * eps) - sdf(p - Vec3::Z * eps);
    Vec3::new(dx, dy, dz).normalize_or_zero()
}

/// Result of a ray hitting a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray
    pub t: f32,
    pub point: Vec3,
}

impl RayHit {
    /// Surface normal at the hit point; costs six field samples
    pub fn normal<F>(&self, sdf: F) -> Vec3
    where
        F: Fn(Vec3) -> f32,
    {
        sdf_gradient(self.point, sdf)
    }
}

/// Sphere-trace a ray against an SDF
pub fn raymarch<F>(origin: Vec3, dir: Vec3, max_dist: f32, max_steps: usize, sdf: F) -> Option<RayHit>
where
    F: Fn(Vec3) -> f32,
{
    const HIT_EPSILON: f32 = 1e-4;
    let mut t = 0.0;

    for _ in 0..max_steps {
        let p = origin + dir * t;
        let d = sdf(p);

        if d < HIT_EPSILON * t.max(1.0) {
            return Some(RayHit { t, point: p });
        }

        t += d;
        if t >= max_dist {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn geometry() -> CoinGeometry {
        CoinGeometry::from_viewport(10.0, 10.0)
    }

    #[test]
    fn test_cylinder_distances() {
        assert!((sd_capped_cylinder(Vec3::new(0.0, 2.0, 0.0), 1.0, 0.5) - 1.5).abs() < 1e-6);
        assert!((sd_capped_cylinder(Vec3::new(3.0, 0.0, 0.0), 1.0, 0.5) - 2.0).abs() < 1e-6);
        assert!(sd_capped_cylinder(Vec3::ZERO, 1.0, 0.5) < 0.0);
    }

    #[test]
    fn test_coin_space_rotation() {
        // At π/2 the local +Y face points toward +Z
        let local = to_coin_space(Vec3::Z, FRAC_PI_2);
        assert!(local.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_face_on_ray_hits_inset() {
        let g = geometry();
        let field = |p| sd_coin(p, &g, FRAC_PI_2);
        let hit = raymarch(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 30.0, 128, field)
            .expect("ray through center should hit");
        assert!((hit.point.z - g.inset_offset).abs() < 1e-2);
        assert!(hit.normal(field).abs_diff_eq(Vec3::Z, 1e-2));
    }

    #[test]
    fn test_raymarch_samples_only_along_ray() {
        use std::cell::Cell;

        let samples = Cell::new(0);
        let plane = |p: Vec3| {
            samples.set(samples.get() + 1);
            p.z
        };
        let hit = raymarch(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 30.0, 128, plane)
            .expect("ray toward the plane should hit");
        assert!((hit.t - 10.0).abs() < 1e-5);
        // One step to the plane, one to confirm; no gradient samples
        assert_eq!(samples.get(), 2);
    }

    #[test]
    fn test_ray_past_rim_misses() {
        let g = geometry();
        let start = Vec3::new(g.radius * 1.2, 0.0, 10.0);
        let hit = raymarch(start, -Vec3::Z, 30.0, 128, |p| sd_coin(p, &g, FRAC_PI_2));
        assert!(hit.is_none());
    }

    #[test]
    fn test_edge_on_coin_is_thin() {
        let g = geometry();
        // Orientation 0: faces point up/down, camera sees the rim
        let above = Vec3::new(0.0, g.thickness * 2.0, 10.0);
        assert!(raymarch(above, -Vec3::Z, 30.0, 128, |p| sd_coin(p, &g, 0.0)).is_none());
        let through = Vec3::new(0.0, 0.0, 10.0);
        assert!(raymarch(through, -Vec3::Z, 30.0, 128, |p| sd_coin(p, &g, 0.0)).is_some());
    }
}
