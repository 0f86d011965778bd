//! Shader sources and override-constant handling

use std::borrow::Cow;
use std::collections::HashMap;

/// Shader specialization constant value
#[derive(Clone, Debug)]
pub enum ShaderDefine {
    Bool(bool),
    U32(u32),
    F32(f32),
}

/// Prepend WGSL `override` declarations for the given defines.
///
/// Overrides are applied at pipeline creation, so toggling a define swaps
/// pipeline variants without recompiling shader source.
pub fn apply_defines(source: &str, defines: &HashMap<String, ShaderDefine>) -> String {
    let mut result = String::new();
    for (name, value) in defines {
        match value {
            ShaderDefine::Bool(b) => {
                result.push_str(&format!("override {}: bool = {};\n", name, b));
            }
            ShaderDefine::U32(u) => {
                result.push_str(&format!("override {}: u32 = {}u;\n", name, u));
            }
            ShaderDefine::F32(f) => {
                result.push_str(&format!("override {}: f32 = {};\n", name, f));
            }
        }
    }
    result.push_str(source);
    result
}

/// Name of the caustics shader the water feature resolves by default.
pub const CAUSTICS_SHADER: &str = "caustics";
/// Name of the water FX mask shader.
pub const WATER_FX_SHADER: &str = "water_fx";
/// Name of the depth-only capture shader.
pub const DEPTH_ONLY_SHADER: &str = "depth_only";

/// Shader library resolving sources by name.
///
/// The built-in water shaders are embedded; hosts may register replacements
/// under the same names before feature registration.
pub struct ShaderLibrary {
    sources: HashMap<String, Cow<'static, str>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Library preloaded with the built-in water shaders.
    pub fn with_builtin() -> Self {
        let mut library = Self::new();
        library.register(CAUSTICS_SHADER, include_str!("wgsl/caustics.wgsl"));
        library.register(WATER_FX_SHADER, include_str!("wgsl/water_fx.wgsl"));
        library.register(DEPTH_ONLY_SHADER, include_str!("wgsl/depth_only.wgsl"));
        library
    }

    pub fn register(&mut self, name: impl Into<String>, source: impl Into<Cow<'static, str>>) {
        self.sources.insert(name.into(), source.into());
    }

    /// Resolve a shader by name. Callers treat `None` as "leave the
    /// dependent pass disabled", never as a hard failure.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(|s| s.as_ref())
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_shaders_resolve() {
        let library = ShaderLibrary::with_builtin();
        assert!(library.resolve(CAUSTICS_SHADER).is_some());
        assert!(library.resolve(WATER_FX_SHADER).is_some());
        assert!(library.resolve(DEPTH_ONLY_SHADER).is_some());
        assert!(library.resolve("missing").is_none());
    }

    #[test]
    fn defines_become_override_constants() {
        let mut defines = HashMap::new();
        defines.insert("DEBUG_CAUSTICS".to_string(), ShaderDefine::Bool(true));
        let out = apply_defines("fn main() {}", &defines);
        assert!(out.starts_with("override DEBUG_CAUSTICS: bool = true;\n"));
        assert!(out.ends_with("fn main() {}"));
    }
}
