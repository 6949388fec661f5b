use wgpu::Device;

use crate::assets::LoadedModel;
use crate::collision::CollisionMesh;
use crate::gfx::resources::material::{Material, MaterialManager};

use super::object::{Mesh, Object};

/// Scene contents: objects, materials, and the collision geometry extracted
/// from the loaded model.
///
/// The camera deliberately lives outside the scene, in the application
/// state, since two different controllers write it.
pub struct Scene {
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager,
    collision: Option<CollisionMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            collision: None,
        }
    }

    /// Ingests a decoded glTF model: registers its materials, turns its
    /// primitives into scene objects, and takes ownership of the collision
    /// mesh for first-person navigation.
    pub fn add_model(&mut self, model: LoadedModel) {
        for loaded in &model.materials {
            self.material_manager
                .add_material(Material::from_loaded(loaded));
        }

        for primitive in model.primitives {
            let mesh = Mesh::new(&primitive.positions, &primitive.normals, primitive.indices);
            let object = Object::new(&primitive.name, vec![mesh])
                .with_transform(primitive.transform)
                .with_material(primitive.material);
            self.objects.push(object);
        }

        if !model.collision.is_empty() {
            self.collision = Some(model.collision);
        }

        log::info!(
            "scene now holds {} objects, {} materials",
            self.objects.len(),
            self.material_manager.list_materials().len()
        );
    }

    /// Collision geometry for the first-person controller. `None` until the
    /// model has loaded; callers treat that as "collision never occurs".
    pub fn collision(&self) -> Option<&CollisionMesh> {
        self.collision.as_ref()
    }

    /// Initializes GPU resources for all objects and materials.
    ///
    /// Called once after the GPU context exists and again whenever the
    /// loader delivers new objects; already-initialized resources are kept.
    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device);
        }

        self.material_manager.update_all_gpu_resources(device, queue);
    }

    /// Syncs every visible object's transform to the GPU.
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            if object.gpu_resources.is_some() {
                object.update_transform(queue);
            }
        }
    }

    /// Material lookup for rendering, falling back to the default material.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    pub fn get_object_count(&self) -> usize {
        self.objects.len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::model::{LoadedMaterial, LoadedPrimitive};
    use cgmath::{Matrix4, SquareMatrix};

    fn sample_model() -> LoadedModel {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let normals = vec![[0.0, 1.0, 0.0]; 3];
        let indices = vec![0, 1, 2];

        let mut collision = CollisionMesh::new();
        collision.add_geometry(&positions, &indices, Matrix4::identity());

        LoadedModel {
            materials: vec![LoadedMaterial {
                name: "plaster".to_string(),
                base_color: [0.9, 0.9, 0.85, 1.0],
                metallic: 0.0,
                roughness: 0.8,
                emissive: [0.0, 0.0, 0.0],
            }],
            primitives: vec![LoadedPrimitive {
                name: "floor".to_string(),
                transform: Matrix4::identity(),
                positions,
                normals,
                indices,
                material: Some("plaster".to_string()),
            }],
            collision,
        }
    }

    #[test]
    fn test_add_model_populates_scene() {
        let mut scene = Scene::new();
        assert!(scene.collision().is_none());

        scene.add_model(sample_model());
        assert_eq!(scene.get_object_count(), 1);
        assert!(scene.collision().is_some());
        assert!(scene.material_manager.get_material("plaster").is_some());

        let material = scene.get_material_for_object(&scene.objects[0]);
        assert_eq!(material.name, "plaster");
    }

    #[test]
    fn test_empty_collision_not_stored() {
        let mut scene = Scene::new();
        let mut model = sample_model();
        model.collision = CollisionMesh::new();
        scene.add_model(model);
        assert!(scene.collision().is_none());
    }
}
