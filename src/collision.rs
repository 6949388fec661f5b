//! Ray casting against loaded scene geometry
//!
//! A flat world-space triangle soup with an AABB early-out. The first-person
//! controller uses it for ground probes and movement blocking; queries treat
//! an empty mesh as "no hit ever".

use cgmath::{InnerSpace, Matrix4, Transform, Vector3};

/// A ray with origin and normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl Iterator<Item = &'a Vector3<f32>>) -> Option<Self> {
        let mut min = Vector3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vector3::new(f32::MIN, f32::MIN, f32::MIN);
        let mut any = false;

        for p in points {
            any = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        any.then_some(Self { min, max })
    }

    /// Slab test. Returns the entry distance if the ray hits the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let min = self.min[axis];
            let max = self.max[axis];

            if dir.abs() < f32::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
            } else {
                let inv = 1.0 / dir;
                let mut t0 = (min - origin) * inv;
                let mut t1 = (max - origin) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return None;
                }
            }
        }

        (t_max >= 0.0).then_some(t_min.max(0.0))
    }
}

/// World-space triangles extracted from the loaded model.
pub struct CollisionMesh {
    triangles: Vec<[Vector3<f32>; 3]>,
    bounds: Option<Aabb>,
}

impl CollisionMesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            bounds: None,
        }
    }

    /// Appends indexed geometry, baking `transform` into world space.
    pub fn add_geometry(&mut self, positions: &[[f32; 3]], indices: &[u32], transform: Matrix4<f32>) {
        for tri in indices.chunks_exact(3) {
            let fetch = |i: u32| {
                let p = positions[i as usize];
                transform.transform_point(cgmath::Point3::new(p[0], p[1], p[2]))
            };
            let a = fetch(tri[0]);
            let b = fetch(tri[1]);
            let c = fetch(tri[2]);
            self.triangles.push([
                Vector3::new(a.x, a.y, a.z),
                Vector3::new(b.x, b.y, b.z),
                Vector3::new(c.x, c.y, c.z),
            ]);
        }

        self.bounds = Aabb::from_points(self.triangles.iter().flatten());
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Nearest hit distance along `ray`, if any within `max_t`.
    pub fn raycast(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        let bounds = self.bounds.as_ref()?;
        match bounds.intersect_ray(ray) {
            Some(entry) if entry <= max_t => {}
            _ => return None,
        }

        let mut nearest: Option<f32> = None;
        for tri in &self.triangles {
            if let Some(t) = intersect_triangle(ray, tri) {
                if t <= max_t && nearest.map_or(true, |n| t < n) {
                    nearest = Some(t);
                }
            }
        }
        nearest
    }

    /// Height of the ground directly below `point`, probing from slightly
    /// above it so a camera standing on the surface still finds it.
    pub fn ground_height(&self, point: Vector3<f32>, probe_up: f32, probe_down: f32) -> Option<f32> {
        let origin = point + Vector3::new(0.0, probe_up, 0.0);
        let ray = Ray::new(origin, Vector3::new(0.0, -1.0, 0.0));
        self.raycast(&ray, probe_up + probe_down)
            .map(|t| origin.y - t)
    }
}

impl Default for CollisionMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Moller-Trumbore ray/triangle intersection. Backfaces count as hits.
fn intersect_triangle(ray: &Ray, tri: &[Vector3<f32>; 3]) -> Option<f32> {
    const EPS: f32 = 1e-7;

    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPS {
        return None; // Ray parallel to triangle plane
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > EPS).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    fn unit_quad_mesh(height: f32) -> CollisionMesh {
        // Two triangles spanning x,z in [-1, 1] at the given height
        let positions = [
            [-1.0, height, -1.0],
            [1.0, height, -1.0],
            [1.0, height, 1.0],
            [-1.0, height, 1.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mut mesh = CollisionMesh::new();
        mesh.add_geometry(&positions, &indices, Matrix4::identity());
        mesh
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0));
        let p = ray.at(3.0);
        assert_eq!(p, Vector3::new(1.0, 3.0, 0.0)); // direction normalized
    }

    #[test]
    fn test_aabb_hit_and_miss() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&hit).is_some());

        let miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&miss).is_none());

        // Box behind the ray
        let behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&behind).is_none());
    }

    #[test]
    fn test_triangle_hit() {
        let tri = [
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let t = intersect_triangle(&ray, &tri).expect("should hit");
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = [
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let ray = Ray::new(Vector3::new(5.0, 2.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(intersect_triangle(&ray, &tri).is_none());
    }

    #[test]
    fn test_nearest_hit_selected() {
        let mut mesh = unit_quad_mesh(0.0);
        let positions = [
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        mesh.add_geometry(&positions, &indices, Matrix4::identity());

        let ray = Ray::new(Vector3::new(0.0, 3.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let t = mesh.raycast(&ray, 10.0).expect("should hit upper quad");
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ground_height_probe() {
        let mesh = unit_quad_mesh(0.5);
        let ground = mesh.ground_height(Vector3::new(0.2, 2.0, 0.2), 0.5, 10.0);
        assert!((ground.expect("ground below") - 0.5).abs() < 1e-5);

        // Off the edge of the quad
        assert!(mesh.ground_height(Vector3::new(5.0, 2.0, 0.0), 0.5, 10.0).is_none());
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let mesh = CollisionMesh::new();
        assert!(mesh.is_empty());
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(mesh.raycast(&ray, 100.0).is_none());
        assert!(mesh.ground_height(Vector3::new(0.0, 1.0, 0.0), 0.5, 100.0).is_none());
    }

    #[test]
    fn test_transform_baked_into_world_space() {
        let positions = [
            [-1.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 1.0],
            [-1.0, 0.0, 1.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mut mesh = CollisionMesh::new();
        mesh.add_geometry(
            &positions,
            &indices,
            Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0)),
        );

        let ground = mesh.ground_height(Vector3::new(0.0, 10.0, 0.0), 0.5, 20.0);
        assert!((ground.expect("translated quad") - 3.0).abs() < 1e-5);
    }
}
