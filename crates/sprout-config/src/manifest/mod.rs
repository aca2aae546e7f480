//! Dependency manifest parsing.
//!
//! Both ecosystems share one shape: a mapping with a `name` and optional
//! dependency mappings of `name -> location expression`. bower manifests are
//! JSON, pub manifests are YAML; both are read into a `serde_json::Value`
//! first and then walked leniently.

use camino::Utf8Path;
use indexmap::IndexMap;
use serde_json::Value;
use sprout_core::error::SproutError;
use sprout_core::types::DependencyDeclaration;

use crate::ConfigResult;

/// Keys holding development dependencies, in lookup order
const DEV_KEYS: [&str; 2] = ["dev_dependencies", "devDependencies"];

/// Serialization format of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

/// Parsed dependency manifest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    /// Declared package name
    pub name: String,
    /// Runtime dependencies in declaration order
    pub dependencies: IndexMap<String, String>,
    /// Development dependencies in declaration order
    pub dev_dependencies: IndexMap<String, String>,
}

impl ManifestFormat {
    /// Pick the format from a manifest file name
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
            ManifestFormat::Yaml
        } else {
            ManifestFormat::Json
        }
    }
}

impl Manifest {
    /// Runtime declarations only
    pub fn runtime_declarations(&self) -> Vec<DependencyDeclaration> {
        self.dependencies
            .iter()
            .map(|(name, expr)| DependencyDeclaration::new(name.clone(), expr.clone()))
            .collect()
    }

    /// Runtime declarations followed by development declarations
    pub fn all_declarations(&self) -> Vec<DependencyDeclaration> {
        let mut declarations = self.runtime_declarations();
        declarations.extend(
            self.dev_dependencies
                .iter()
                .map(|(name, expr)| DependencyDeclaration::dev(name.clone(), expr.clone())),
        );
        declarations
    }

    /// Every declared dependency name, runtime first
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
    }
}

/// Parse manifest text.
///
/// `origin` names the document in error messages (a path or `owner/repo#branch`).
pub fn parse_manifest(text: &str, format: ManifestFormat, origin: &str) -> ConfigResult<Manifest> {
    let document: Value = match format {
        ManifestFormat::Json => serde_json::from_str(text)
            .map_err(|e| SproutError::malformed(origin, format!("JSON parsing error: {}", e)))?,
        ManifestFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| SproutError::malformed(origin, format!("YAML parsing error: {}", e)))?,
    };

    let root = document
        .as_object()
        .ok_or_else(|| SproutError::malformed(origin, "expected a mapping at the top level"))?;

    let name = root
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| SproutError::malformed(origin, "missing string field 'name'"))?
        .to_string();

    let dependencies = dependency_section(root.get("dependencies"));
    let dev_dependencies = DEV_KEYS
        .iter()
        .find_map(|key| root.get(*key))
        .map(|section| dependency_section(Some(section)))
        .unwrap_or_default();

    Ok(Manifest {
        name,
        dependencies,
        dev_dependencies,
    })
}

/// Read and parse a manifest file, choosing the format from its name
pub async fn load_manifest(path: &Utf8Path) -> ConfigResult<Manifest> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SproutError::io(format!("Failed to read {}", path), e))?;
    let format = ManifestFormat::from_file_name(path.file_name().unwrap_or_default());
    parse_manifest(&text, format, path.as_str())
}

/// Non-mapping sections count as "no dependencies"
fn dependency_section(section: Option<&Value>) -> IndexMap<String, String> {
    let Some(Value::Object(entries)) = section else {
        return IndexMap::new();
    };

    entries
        .iter()
        .map(|(name, value)| {
            let expr = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            (name.clone(), expr)
        })
        .collect()
}
