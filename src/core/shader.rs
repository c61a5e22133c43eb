//! WGSL module composition
//!
//! Shaders are assembled from named WGSL fragments concatenated in the order
//! they are added. A fragment may only use items declared by fragments added
//! before it. There is no textual substitution: variants are expressed by
//! choosing which fragment fills a slot.

use crate::error::ShaderError;

/// A named piece of WGSL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderModule {
    pub name: &'static str,
    pub source: &'static str,
}

impl ShaderModule {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }
}

/// Ordered list of modules that compose into one WGSL source.
#[derive(Debug, Clone, Default)]
pub struct ShaderComposer {
    modules: Vec<ShaderModule>,
}

impl ShaderComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. Names must be unique within one composition.
    pub fn module(mut self, module: ShaderModule) -> Result<Self, ShaderError> {
        if self.modules.iter().any(|m| m.name == module.name) {
            return Err(ShaderError::DuplicateModule(module.name.to_string()));
        }
        self.modules.push(module);
        Ok(self)
    }

    /// Names of the modules in composition order.
    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|m| m.name)
    }

    /// Concatenate all modules, each preceded by a marker comment.
    pub fn compose(&self) -> Result<String, ShaderError> {
        if self.modules.is_empty() {
            return Err(ShaderError::Empty);
        }

        let capacity = self
            .modules
            .iter()
            .map(|m| m.source.len() + m.name.len() + 16)
            .sum();
        let mut out = String::with_capacity(capacity);
        for module in &self.modules {
            out.push_str("// module: ");
            out.push_str(module.name);
            out.push('\n');
            out.push_str(module.source);
            if !module.source.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ShaderModule = ShaderModule::new("a", "fn a() -> f32 { return 1.0; }");
    const B: ShaderModule = ShaderModule::new("b", "fn b() -> f32 { return a(); }\n");

    #[test]
    fn test_compose_keeps_order() {
        let source = ShaderComposer::new()
            .module(A)
            .and_then(|c| c.module(B))
            .and_then(|c| c.compose())
            .unwrap();

        let a = source.find("fn a()").unwrap();
        let b = source.find("fn b()").unwrap();
        assert!(a < b);
        assert!(source.contains("// module: a\n"));
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let err = ShaderComposer::new()
            .module(A)
            .and_then(|c| c.module(A))
            .unwrap_err();
        assert_eq!(err, ShaderError::DuplicateModule("a".into()));
    }

    #[test]
    fn test_empty_composition_rejected() {
        assert_eq!(ShaderComposer::new().compose(), Err(ShaderError::Empty));
    }
}
