//! glTF scene decoding
//!
//! Flattens the node hierarchy into a list of primitives with their world
//! transforms, extracts PBR material factors, and collects every triangle
//! into a world-space collision mesh for first-person navigation.

use std::path::Path;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::collision::CollisionMesh;

use super::AssetError;

/// PBR material factors pulled from the glTF document.
pub struct LoadedMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
}

/// One renderable primitive. Positions and normals are node-local; the
/// world transform travels alongside so the scene can keep it per object.
pub struct LoadedPrimitive {
    pub name: String,
    pub transform: Matrix4<f32>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: Option<String>,
}

/// Everything extracted from the model file.
pub struct LoadedModel {
    pub materials: Vec<LoadedMaterial>,
    pub primitives: Vec<LoadedPrimitive>,
    pub collision: CollisionMesh,
}

/// Loads a .gltf/.glb scene from disk.
pub fn load(path: &Path) -> Result<LoadedModel, AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let materials = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            LoadedMaterial {
                name: material_name(&material),
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                emissive: material.emissive_factor(),
            }
        })
        .collect();

    let mut primitives = Vec::new();
    let mut collision = CollisionMesh::new();

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(
                &node,
                &buffers,
                Matrix4::identity(),
                &mut primitives,
                &mut collision,
            )?;
        }
    }

    log::info!(
        "loaded glTF scene {}: {} primitives, {} collision triangles",
        path.display(),
        primitives.len(),
        collision.triangle_count()
    );

    Ok(LoadedModel {
        materials,
        primitives,
        collision,
    })
}

fn material_name(material: &gltf::Material) -> String {
    match (material.name(), material.index()) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(index)) => format!("material_{}", index),
        _ => "default".to_string(),
    }
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Matrix4<f32>,
    primitives: &mut Vec<LoadedPrimitive>,
    collision: &mut CollisionMesh,
) -> Result<(), AssetError> {
    let local: Matrix4<f32> = node.transform().matrix().into();
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let base_name = mesh
            .name()
            .or_else(|| node.name())
            .unwrap_or("mesh")
            .to_string();

        for (index, primitive) in mesh.primitives().enumerate() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| AssetError::MissingPositions(base_name.clone()))?
                .collect();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter.collect(),
                None => compute_vertex_normals(&positions, &indices),
            };

            collision.add_geometry(&positions, &indices, world);

            let name = if index == 0 {
                base_name.clone()
            } else {
                format!("{}.{}", base_name, index)
            };

            primitives.push(LoadedPrimitive {
                name,
                transform: world,
                positions,
                normals,
                indices,
                material: primitive
                    .material()
                    .index()
                    .map(|_| material_name(&primitive.material())),
            });
        }
    }

    for child in node.children() {
        process_node(&child, buffers, world, primitives, collision)?;
    }

    Ok(())
}

/// Area-weighted vertex normals for primitives that ship without them.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

    for tri in indices.chunks_exact(3) {
        let a = Vector3::from(positions[tri[0] as usize]);
        let b = Vector3::from(positions[tri[1] as usize]);
        let c = Vector3::from(positions[tri[2] as usize]);

        // Cross product length is proportional to triangle area, so larger
        // faces weigh more without explicit normalization here.
        let face_normal = (b - a).cross(c - a);
        for &vertex in tri {
            accumulated[vertex as usize] += face_normal;
        }
    }

    accumulated
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                let n = n.normalize();
                [n.x, n.y, n.z]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_triangle_normal_points_up() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let indices = [0u32, 1, 2];
        let normals = compute_vertex_normals(&positions, &indices);

        for n in normals {
            assert!((n[0]).abs() < 1e-6);
            assert!((n[1] - 1.0).abs() < 1e-6);
            assert!((n[2]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_fallback_normal() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [9.0, 9.0, 9.0],
        ];
        let indices = [0u32, 1, 2];
        let normals = compute_vertex_normals(&positions, &indices);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_shared_vertex_averages_faces() {
        // Two faces meeting at a right angle along the x axis
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [0.0, 1.0, 0.0],
        ];
        // First face lies in the xz plane (normal +y), second in the xy
        // plane (normal +z)
        let indices = [0u32, 1, 2, 0, 1, 3];
        let normals = compute_vertex_normals(&positions, &indices);

        // Shared vertices lean between +y and +z
        let shared = Vector3::from(normals[0]);
        assert!(shared.y > 0.0);
        assert!(shared.z > 0.0);
        assert!((shared.magnitude() - 1.0).abs() < 1e-5);
    }
}
