/// Authored material definitions
///
/// Definitions arrive already parsed from the loader collaborator. A
/// definition may name a base definition; resolution walks the chain from
/// the root base down to the definition itself.

use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::pipeline::{MaterialFlags, Technique};

/// A typed parameter value for the material
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    UInt(u32),
    Mat4(Mat4),
}

impl ParamValue {
    /// Raw bytes of the value, as laid out in a constant buffer
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ParamValue::Float(v) => bytemuck::bytes_of(v),
            ParamValue::Vec2(v) => bytemuck::cast_slice(v),
            ParamValue::Vec3(v) => bytemuck::cast_slice(v),
            ParamValue::Vec4(v) => bytemuck::cast_slice(v),
            ParamValue::Int(v) => bytemuck::bytes_of(v),
            ParamValue::UInt(v) => bytemuck::bytes_of(v),
            ParamValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

/// What a material does for one technique instead of rendering normally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechniqueOverride {
    /// Do not render with this technique
    Skip,
    /// Render with another material
    Substitute(String),
}

/// Parsed material definition
#[derive(Debug, Clone)]
pub struct MaterialDefinition {
    pub name: String,
    /// Definition this one inherits from
    pub base: Option<String>,
    /// Vertex stage name; empty inherits the base's
    pub vertex_stage: String,
    /// Pixel stage name; empty inherits the base's
    pub pixel_stage: String,
    /// Default parameter values by field name
    pub params: FxHashMap<String, ParamValue>,
    /// Texture references: binding name -> texture view name
    ///
    /// Declaration order is kept: the n-th reference feeds `texture_index_<n>`.
    pub textures: Vec<(String, String)>,
    pub flags: MaterialFlags,
    pub overrides: Vec<(Technique, TechniqueOverride)>,
}

impl MaterialDefinition {
    pub fn new(name: &str, vertex_stage: &str, pixel_stage: &str) -> Self {
        Self {
            name: name.to_string(),
            base: None,
            vertex_stage: vertex_stage.to_string(),
            pixel_stage: pixel_stage.to_string(),
            params: FxHashMap::default(),
            textures: Vec::new(),
            flags: MaterialFlags::empty(),
            overrides: Vec::new(),
        }
    }

    /// Definition inheriting stages, parameters and textures from `base`
    pub fn derived(name: &str, base: &str) -> Self {
        let mut definition = Self::new(name, "", "");
        definition.base = Some(base.to_string());
        definition
    }

    pub fn with_param(mut self, name: &str, value: ParamValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    pub fn with_texture(mut self, binding: &str, view: &str) -> Self {
        self.textures.push((binding.to_string(), view.to_string()));
        self
    }

    pub fn with_flags(mut self, flags: MaterialFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_override(mut self, technique: Technique, technique_override: TechniqueOverride) -> Self {
        self.overrides.push((technique, technique_override));
        self
    }
}

/// Definition chain flattened from root base to leaf
#[derive(Debug, Clone, Default)]
pub struct ResolvedDefinition {
    pub vertex_stage: String,
    pub pixel_stage: String,
    pub params: FxHashMap<String, ParamValue>,
    pub textures: Vec<(String, String)>,
    pub flags: MaterialFlags,
}

impl ResolvedDefinition {
    /// Flatten `chain` (root base first). Later definitions override earlier ones;
    /// flags accumulate.
    pub fn flatten(chain: &[&MaterialDefinition]) -> Self {
        let mut resolved = Self::default();
        for definition in chain {
            if !definition.vertex_stage.is_empty() {
                resolved.vertex_stage = definition.vertex_stage.clone();
            }
            if !definition.pixel_stage.is_empty() {
                resolved.pixel_stage = definition.pixel_stage.clone();
            }
            for (name, value) in &definition.params {
                resolved.params.insert(name.clone(), value.clone());
            }
            for (binding, view) in &definition.textures {
                match resolved.textures.iter_mut().find(|(existing, _)| existing == binding) {
                    Some(entry) => entry.1 = view.clone(),
                    None => resolved.textures.push((binding.clone(), view.clone())),
                }
            }
            resolved.flags |= definition.flags;
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_bytes() {
        assert_eq!(ParamValue::Float(1.0).as_bytes(), &1.0f32.to_ne_bytes());
        assert_eq!(ParamValue::Vec3([1.0, 2.0, 3.0]).as_bytes().len(), 12);
        assert_eq!(ParamValue::Mat4(Mat4::IDENTITY).as_bytes().len(), 64);
        assert_eq!(ParamValue::UInt(7).as_bytes(), &7u32.to_ne_bytes());
    }

    #[test]
    fn test_flatten_child_overrides_base() {
        let base = MaterialDefinition::new("rock", "lit_vs", "lit_ps")
            .with_param("roughness", ParamValue::Float(0.8))
            .with_param("tint", ParamValue::Vec4([1.0; 4]))
            .with_texture("albedo", "rock_albedo")
            .with_texture("normal", "rock_normal")
            .with_flags(MaterialFlags::TWO_SIDED);
        let child = MaterialDefinition::derived("wet_rock", "rock")
            .with_param("roughness", ParamValue::Float(0.1))
            .with_texture("albedo", "wet_rock_albedo")
            .with_flags(MaterialFlags::ALPHA_TO_COVERAGE);

        let resolved = ResolvedDefinition::flatten(&[&base, &child]);
        assert_eq!(resolved.vertex_stage, "lit_vs");
        assert_eq!(resolved.pixel_stage, "lit_ps");
        assert_eq!(resolved.params["roughness"], ParamValue::Float(0.1));
        assert_eq!(resolved.params["tint"], ParamValue::Vec4([1.0; 4]));
        assert_eq!(resolved.textures, vec![
            ("albedo".to_string(), "wet_rock_albedo".to_string()),
            ("normal".to_string(), "rock_normal".to_string()),
        ]);
        assert_eq!(resolved.flags, MaterialFlags::TWO_SIDED | MaterialFlags::ALPHA_TO_COVERAGE);
    }
}
