use super::cell::Uniform;
use super::UniformError;

/// Insertion-ordered mapping from field name to uniform cell.
///
/// Declaration order is the field order the shader's uniform block must use.
#[derive(Debug, Clone, Default)]
pub struct UniformGroup {
    fields: Vec<(String, Uniform)>,
}

impl UniformGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> UniformGroupBuilder {
        UniformGroupBuilder::default()
    }

    /// Appends a field.
    ///
    /// Fails if `name` is not a shader identifier or already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Uniform>,
    ) -> Result<Uniform, UniformError> {
        let name = name.into();
        if !is_shader_identifier(&name) {
            return Err(UniformError::InvalidName(name));
        }
        if self.get(&name).is_some() {
            return Err(UniformError::DuplicateName(name));
        }

        let uniform = value.into();
        self.fields.push((name, uniform.clone()));
        Ok(uniform)
    }

    pub fn get(&self, name: &str) -> Option<&Uniform> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, u)| u)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Uniform)> {
        self.fields.iter().map(|(n, u)| (n.as_str(), u))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Chained builder for [`UniformGroup`]; the first invalid field is reported by `build`.
#[derive(Debug, Default)]
pub struct UniformGroupBuilder {
    group: UniformGroup,
    error: Option<UniformError>,
}

impl UniformGroupBuilder {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Uniform>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.group.insert(name, value) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn build(self) -> Result<UniformGroup, UniformError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.group),
        }
    }
}

/// WGSL-compatible identifier: `[A-Za-z_][A-Za-z0-9_]*`, excluding `_` and
/// names starting with `__`.
pub fn is_shader_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if name == "_" || name.starts_with("__") {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::Vec2;

    #[test]
    fn builder_preserves_insertion_order() {
        let g = UniformGroup::builder()
            .field("zeta", 1.0f32)
            .field("alpha", 2.0f32)
            .field("mid", Vec2::new(0.0, 0.0))
            .build()
            .unwrap();
        let names: Vec<&str> = g.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn builder_reports_first_error() {
        let err = UniformGroup::builder()
            .field("ok", 1.0f32)
            .field("ok", 2.0f32)
            .field("1bad", 3.0f32)
            .build()
            .unwrap_err();
        assert_eq!(err, UniformError::DuplicateName("ok".into()));
    }

    #[test]
    fn insert_returns_shared_handle() {
        let mut g = UniformGroup::new();
        let t = g.insert("uTime", 0.0f32).unwrap();
        t.set(3.0f32);
        t.update();
        assert_eq!(&*g.get("uTime").unwrap().staging(), &[3.0]);
    }

    // ── identifiers ───────────────────────────────────────────────────────

    #[test]
    fn identifier_rules() {
        assert!(is_shader_identifier("uTime"));
        assert!(is_shader_identifier("_private"));
        assert!(is_shader_identifier("light2"));
        assert!(!is_shader_identifier(""));
        assert!(!is_shader_identifier("_"));
        assert!(!is_shader_identifier("__reserved"));
        assert!(!is_shader_identifier("2light"));
        assert!(!is_shader_identifier("light.color"));
        assert!(!is_shader_identifier("has space"));
    }
}
