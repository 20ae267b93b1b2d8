//! Generation template resolution and parameter binding.
//!
//! Instructions for the generation provider come from one of two places: a
//! template bundle on disk (a directory of named templates, each holding
//! `prompt.txt` plus a `config.json` manifest) or the built-in inline
//! template compiled into the binary. Which tier is active gets decided at
//! most once per process lifetime; after the first resolution the answer
//! is cached and never revisited, even if the directory appears later.
//! A failed bundle load is a logged downgrade, not an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use outfitter_core::error::OutfitterError;
use outfitter_core::types::ProductRecord;

/// Name of the bundle template used to answer catalog searches.
pub const SEARCH_TEMPLATE_NAME: &str = "search_response";

/// The built-in fallback instructions. Parameter names are fixed;
/// directory-sourced templates are expected to accept the same five.
pub const INLINE_TEMPLATE: &str = "\
You are an intelligent assistant helping clients with their search about outdoor products. \
Generate a catchy and friendly answer to the customer's question using the provided product. \
Mention the product name and the price in the answer.
Question: {{question}}
Product Id: {{productid}}
Product Name: {{productname}}
Product Description: {{productdescription}}
Product Price: {{productprice}}";

/// Where the active template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// Loaded from the configured bundle directory.
    Directory,
    /// The built-in instruction string.
    Inline,
}

/// The outcome of template resolution. Exactly one of these is active per
/// process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub source: TemplateSource,
    pub instructions: String,
}

impl ResolvedTemplate {
    fn inline() -> Self {
        Self {
            source: TemplateSource::Inline,
            instructions: INLINE_TEMPLATE.to_string(),
        }
    }
}

/// The `config.json` manifest accompanying each bundle template.
#[derive(Debug, Deserialize)]
struct TemplateManifest {
    #[serde(default)]
    description: String,
    #[serde(default)]
    input_variables: Vec<TemplateVariable>,
}

#[derive(Debug, Deserialize)]
struct TemplateVariable {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: String,
}

/// A template loaded from the bundle directory.
#[derive(Debug, Clone)]
struct LoadedTemplate {
    instructions: String,
    description: String,
    variables: Vec<String>,
}

/// Load every template in the bundle directory.
///
/// Each immediate subdirectory must hold `prompt.txt` and a parseable
/// `config.json`; anything else fails the whole load. An empty bundle is
/// also a failure, since it cannot supply the search template.
fn load_bundle(directory: &Path) -> Result<HashMap<String, LoadedTemplate>, OutfitterError> {
    let mut templates = HashMap::new();

    let entries = std::fs::read_dir(directory).map_err(|e| {
        OutfitterError::Template(format!(
            "Cannot read template directory {}: {}",
            directory.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| OutfitterError::Template(e.to_string()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let instructions = std::fs::read_to_string(path.join("prompt.txt")).map_err(|e| {
            OutfitterError::Template(format!("Template '{}' has no readable prompt.txt: {}", name, e))
        })?;

        let manifest_raw = std::fs::read_to_string(path.join("config.json")).map_err(|e| {
            OutfitterError::Template(format!("Template '{}' has no readable config.json: {}", name, e))
        })?;
        let manifest: TemplateManifest = serde_json::from_str(&manifest_raw).map_err(|e| {
            OutfitterError::Template(format!("Template '{}' has a malformed manifest: {}", name, e))
        })?;

        let variables = manifest
            .input_variables
            .iter()
            .map(|v| v.name.clone())
            .collect();

        templates.insert(
            name,
            LoadedTemplate {
                instructions,
                description: manifest.description,
                variables,
            },
        );
    }

    if templates.is_empty() {
        return Err(OutfitterError::Template(format!(
            "Template directory {} contains no templates",
            directory.display()
        )));
    }

    Ok(templates)
}

/// Decide which template tier serves this process.
///
/// Pure with respect to its outcome: every failure path collapses into the
/// inline fallback, logged at warn and never surfaced to callers.
pub fn resolve_template(directory: &Path) -> ResolvedTemplate {
    match load_bundle(directory) {
        Ok(mut templates) => match templates.remove(SEARCH_TEMPLATE_NAME) {
            Some(loaded) => {
                info!(
                    directory = %directory.display(),
                    description = %loaded.description,
                    variables = loaded.variables.len(),
                    "Using template bundle from directory"
                );
                ResolvedTemplate {
                    source: TemplateSource::Directory,
                    instructions: loaded.instructions,
                }
            }
            None => {
                warn!(
                    directory = %directory.display(),
                    template = SEARCH_TEMPLATE_NAME,
                    "Bundle loaded but search template missing, using inline template"
                );
                ResolvedTemplate::inline()
            }
        },
        Err(e) => {
            warn!(
                directory = %directory.display(),
                error = %e,
                "Template bundle unavailable, using inline template"
            );
            ResolvedTemplate::inline()
        }
    }
}

/// Caches the template decision for the process lifetime.
///
/// Concurrent first callers cannot double-resolve, and a cancelled first
/// resolution leaves the cell unset rather than half-resolved.
#[derive(Debug)]
pub struct TemplateResolver {
    directory: PathBuf,
    resolved: OnceCell<ResolvedTemplate>,
}

impl TemplateResolver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            resolved: OnceCell::new(),
        }
    }

    /// Get the active template, resolving it on first use.
    pub async fn resolved(&self) -> &ResolvedTemplate {
        self.resolved
            .get_or_init(|| async { resolve_template(&self.directory) })
            .await
    }

    /// The decided source, if resolution has happened yet.
    pub fn source(&self) -> Option<TemplateSource> {
        self.resolved.get().map(|r| r.source)
    }
}

/// The five parameters every search template accepts, already rendered as
/// display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParams {
    pub question: String,
    pub product_id: String,
    pub product_name: String,
    pub product_description: String,
    pub product_price: String,
}

impl PromptParams {
    /// Build the parameter set for a matched product.
    pub fn for_product(question: &str, product: &ProductRecord) -> Self {
        Self {
            question: question.to_string(),
            product_id: product.id.to_string(),
            product_name: product.name.clone(),
            product_description: product.description.clone(),
            product_price: product.price.to_string(),
        }
    }

    /// Substitute the parameters into a template's `{{name}}` placeholders.
    pub fn bind(&self, instructions: &str) -> String {
        instructions
            .replace("{{question}}", &self.question)
            .replace("{{productid}}", &self.product_id)
            .replace("{{productname}}", &self.product_name)
            .replace("{{productdescription}}", &self.product_description)
            .replace("{{productprice}}", &self.product_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_template(root: &Path, name: &str, prompt: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("prompt.txt"), prompt).unwrap();
        std::fs::write(
            dir.join("config.json"),
            r#"{
  "description": "Answer a catalog search question",
  "input_variables": [
    { "name": "question" },
    { "name": "productid" },
    { "name": "productname" },
    { "name": "productdescription" },
    { "name": "productprice" }
  ]
}"#,
        )
        .unwrap();
    }

    // ---- resolution ----

    #[test]
    fn test_inline_template_has_all_placeholders() {
        for placeholder in [
            "{{question}}",
            "{{productid}}",
            "{{productname}}",
            "{{productdescription}}",
            "{{productprice}}",
        ] {
            assert!(
                INLINE_TEMPLATE.contains(placeholder),
                "missing {}",
                placeholder
            );
        }
    }

    #[test]
    fn test_resolve_missing_directory_falls_back() {
        let resolved = resolve_template(Path::new("/nonexistent/templates"));
        assert_eq!(resolved.source, TemplateSource::Inline);
        assert_eq!(resolved.instructions, INLINE_TEMPLATE);
    }

    #[test]
    fn test_resolve_empty_directory_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Inline);
    }

    #[test]
    fn test_resolve_valid_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), SEARCH_TEMPLATE_NAME, "Custom {{productname}} answer");

        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Directory);
        assert_eq!(resolved.instructions, "Custom {{productname}} answer");
    }

    #[test]
    fn test_resolve_bundle_missing_search_template_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "unrelated_template", "Something else");

        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Inline);
    }

    #[test]
    fn test_resolve_malformed_manifest_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join(SEARCH_TEMPLATE_NAME);
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("prompt.txt"), "fine").unwrap();
        std::fs::write(sub.join("config.json"), "{ not json").unwrap();

        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Inline);
    }

    #[test]
    fn test_resolve_missing_prompt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join(SEARCH_TEMPLATE_NAME);
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("config.json"), "{}").unwrap();

        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Inline);
    }

    #[test]
    fn test_resolve_ignores_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();
        write_template(dir.path(), SEARCH_TEMPLATE_NAME, "Bundle {{question}}");

        let resolved = resolve_template(dir.path());
        assert_eq!(resolved.source, TemplateSource::Directory);
    }

    // ---- caching ----

    #[tokio::test]
    async fn test_resolver_caches_success() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), SEARCH_TEMPLATE_NAME, "From disk");

        let resolver = TemplateResolver::new(dir.path());
        assert_eq!(resolver.source(), None);

        let first = resolver.resolved().await.clone();
        assert_eq!(first.source, TemplateSource::Directory);

        // Deleting the bundle after resolution changes nothing.
        drop(dir);
        let second = resolver.resolved().await;
        assert_eq!(second.source, TemplateSource::Directory);
        assert_eq!(second.instructions, "From disk");
        assert_eq!(resolver.source(), Some(TemplateSource::Directory));
    }

    #[tokio::test]
    async fn test_resolver_never_retries_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("late_bundle");

        let resolver = TemplateResolver::new(&bundle_path);
        let first = resolver.resolved().await.clone();
        assert_eq!(first.source, TemplateSource::Inline);

        // The directory becoming valid later must not flip the decision.
        write_template(&bundle_path, SEARCH_TEMPLATE_NAME, "Too late");
        let second = resolver.resolved().await;
        assert_eq!(second.source, TemplateSource::Inline);
        assert_eq!(second.instructions, INLINE_TEMPLATE);
    }

    #[tokio::test]
    async fn test_resolver_concurrent_first_use() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), SEARCH_TEMPLATE_NAME, "Shared once");

        let resolver = Arc::new(TemplateResolver::new(dir.path()));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.resolved().await.clone()
            }));
        }

        for handle in handles {
            let resolved = handle.await.unwrap();
            assert_eq!(resolved.source, TemplateSource::Directory);
            assert_eq!(resolved.instructions, "Shared once");
        }
    }

    // ---- parameter binding ----

    #[test]
    fn test_bind_replaces_all_placeholders() {
        let params = PromptParams {
            question: "what tent should I buy".to_string(),
            product_id: "1".to_string(),
            product_name: "Tent".to_string(),
            product_description: "A waterproof tent".to_string(),
            product_price: "199.99".to_string(),
        };

        let bound = params.bind(INLINE_TEMPLATE);
        assert!(!bound.contains("{{"));
        assert!(bound.contains("what tent should I buy"));
        assert!(bound.contains("Product Id: 1"));
        assert!(bound.contains("Tent"));
        assert!(bound.contains("199.99"));
    }

    #[test]
    fn test_for_product_renders_display_strings() {
        let product = ProductRecord::new(1, "Tent", "A waterproof tent", 199.99, "");
        let params = PromptParams::for_product("any tents?", &product);

        assert_eq!(params.product_id, "1");
        assert_eq!(params.product_name, "Tent");
        assert_eq!(params.product_price, "199.99");
        assert_eq!(params.question, "any tents?");
    }

    #[test]
    fn test_bind_leaves_unknown_placeholders_alone() {
        let params = PromptParams::for_product(
            "q",
            &ProductRecord::new(2, "Stove", "A stove", 45.0, ""),
        );
        let bound = params.bind("{{productname}} / {{unknown}}");
        assert_eq!(bound, "Stove / {{unknown}}");
    }
}
