use super::*;
use crate::descriptor::DescriptorKind;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::material::{MaterialDefinition, ParamValue};
use crate::shader::{
    ConstantBufferInfo, FieldInfo, ShaderLibrary, ShaderStage, ShaderStageInfo, SignatureCache,
    TextureDimension,
};
use glam::{Mat4, Vec3};

struct Fixture {
    resources: ResourceTable,
    signature: Arc<Signature>,
}

fn fixture() -> Fixture {
    let device = Arc::new(MockGraphicsDevice::new());
    let mut shaders = ShaderLibrary::new();
    shaders.register(
        ShaderStageInfo::new("vs", ShaderStage::Vertex, &[1])
            .with_constant_buffer(ConstantBufferInfo::new("$Globals", 0, vec![
                FieldInfo::new("world_view_proj", 0, 64),
                FieldInfo::new("texture_index_0", 64, 4),
                FieldInfo::new("roughness", 68, 4),
            ]))
            .with_vertex_input(),
    );
    shaders.register(
        ShaderStageInfo::new("ps", ShaderStage::Pixel, &[2])
            .with_constant_buffer(ConstantBufferInfo::new("Frame", 1, vec![
                FieldInfo::new("time", 0, 4),
                FieldInfo::new("tint", 16, 16),
            ]))
            .with_texture("albedo", 0, TextureDimension::Texture2D)
            .with_texture("detail", 1, TextureDimension::Texture2D),
    );
    let signature = SignatureCache::new(64).get_or_build(device.as_ref(), &shaders, "vs", "ps").unwrap();
    let mut resources = ResourceTable::new(device, 32).unwrap();
    resources.create_view("stone", DescriptorKind::Texture2D).unwrap();
    Fixture { resources, signature }
}

fn resolve(f: &Fixture, definition: &MaterialDefinition) -> MaterialInstance {
    let resolved = ResolvedDefinition::flatten(&[definition]);
    MaterialInstance::resolve_resources(MaterialInstanceId(0), &definition.name, &resolved, f.signature.clone(), &f.resources)
}

#[test]
fn test_fields_split_into_defaults_and_auto_params() {
    let f = fixture();
    let definition = MaterialDefinition::new("stone", "vs", "ps")
        .with_param("roughness", ParamValue::Float(0.5))
        .with_param("tint", ParamValue::Vec4([0.25; 4]))
        .with_texture("albedo", "stone");
    let instance = resolve(&f, &definition);

    assert_eq!(instance.buffers.len(), 2);
    assert!(instance.buffers[0].inline);
    assert!(!instance.buffers[1].inline);
    assert_eq!(&instance.buffers[0].defaults[68..72], &0.5f32.to_ne_bytes());
    assert_eq!(&instance.buffers[1].defaults[16..20], &0.25f32.to_ne_bytes());

    let params: Vec<AutoParam> = instance.auto_params.iter().map(|slot| slot.param).collect();
    assert_eq!(params, vec![AutoParam::WorldViewProj, AutoParam::TextureIndex(0), AutoParam::Time]);
    assert!(instance.has_auto_param(AutoParam::Time));
    assert!(!instance.has_auto_param(AutoParam::EntityId));
}

#[test]
fn test_texture_index_baked_into_defaults() {
    let f = fixture();
    let stone = f.resources.index_of("stone").unwrap();
    let instance = resolve(&f, &MaterialDefinition::new("stone", "vs", "ps").with_texture("albedo", "stone"));

    assert_eq!(instance.texture_indices, vec![stone]);
    assert_eq!(&instance.buffers[0].defaults[64..68], &stone.to_ne_bytes());
}

#[test]
fn test_missing_textures_use_fallback() {
    let f = fixture();
    let instance = resolve(&f, &MaterialDefinition::new("bare", "vs", "ps")
        .with_texture("albedo", "instance_tests:does_not_exist"));

    let fallback = f.resources.fallback_index();
    assert_eq!(instance.texture_indices, vec![fallback]);
    assert_eq!(instance.textures.len(), 2);
    assert!(instance.textures.iter().all(|binding| binding.descriptor_index == fallback));
}

#[test]
fn test_fill_buffer_refreshes_dynamic_params() {
    let f = fixture();
    let instance = resolve(&f, &MaterialDefinition::new("stone", "vs", "ps")
        .with_param("roughness", ParamValue::Float(0.5)));

    let frame = FrameParams { view_proj: Mat4::from_scale(Vec3::splat(3.0)), time: 4.0, ..FrameParams::default() };
    let object = ObjectParams { world: Mat4::from_translation(Vec3::X), ..ObjectParams::default() };

    let mut data = Vec::new();
    instance.fill_buffer(0, &frame, &object, &mut data);
    assert_eq!(data.len(), instance.buffers[0].defaults.len());
    let wvp: Mat4 = bytemuck::pod_read_unaligned(&data[0..64]);
    assert_eq!(wvp, frame.view_proj * object.world);
    assert_eq!(&data[68..72], &0.5f32.to_ne_bytes());

    instance.fill_buffer(1, &frame, &object, &mut data);
    assert_eq!(&data[0..4], &4.0f32.to_ne_bytes());

    instance.fill_buffer(9, &frame, &object, &mut data);
    assert!(data.is_empty());
}
