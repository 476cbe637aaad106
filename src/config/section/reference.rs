//! `[reference]` configuration: generated reference pages.
//!
//! # Example
//!
//! ```toml
//! [reference]
//! package_dirs = ["src/pkg"]
//! placeholder = "reference"
//! exclude_glob = "pkg/internal/*"
//!
//! [reference.copy_files]
//! "changelog.md" = "CHANGELOG.md"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Default per-page template for generated pages.
pub const REFERENCE_TEMPLATE: &str = "# `{ident}`\n\n::: {ident}\n    options:\n        show_source: false\n";

/// Placeholder token substituted with the module's dotted path.
pub const IDENT_TOKEN: &str = "{ident}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Ordered package roots to scan.
    pub package_dirs: Vec<PathBuf>,

    /// Nav route replaced by the generated tree. Also the route prefix of generated pages.
    #[serde(alias = "reference_section")]
    pub placeholder: String,

    /// Glob for modules and authored pages to omit (empty disables).
    pub exclude_glob: String,

    /// Content template of a generated page.
    pub template: String,

    /// Retitle the index leaf of authored sections as "Overview".
    pub overview_sections: bool,

    /// Destination route -> source file, copied verbatim.
    pub copy_files: BTreeMap<String, PathBuf>,
}

impl ReferenceConfig {
    pub const PLACEHOLDER: FieldPath = FieldPath::new("reference.placeholder");
    pub const EXCLUDE_GLOB: FieldPath = FieldPath::new("reference.exclude_glob");
    pub const TEMPLATE: FieldPath = FieldPath::new("reference.template");
    pub const COPY_FILES: FieldPath = FieldPath::new("reference.copy_files");

    /// Render the page template for a dotted identifier.
    pub fn render_template(&self, ident: &str) -> String {
        self.template.replace(IDENT_TOKEN, ident)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.placeholder.trim_matches('/').trim().is_empty() {
            diag.error(Self::PLACEHOLDER, "placeholder route must not be empty");
        }
        if !self.template.contains(IDENT_TOKEN) {
            diag.error_with_hint(
                Self::TEMPLATE,
                "template does not reference the module",
                format!("add `{IDENT_TOKEN}` where the dotted path belongs"),
            );
        }
        if !self.exclude_glob.is_empty()
            && let Err(e) = globset::Glob::new(&self.exclude_glob)
        {
            diag.error(Self::EXCLUDE_GLOB, format!("invalid glob: {e}"));
        }
        for dest in self.copy_files.keys() {
            if dest.trim_matches('/').is_empty() {
                diag.error(Self::COPY_FILES, "copy_files destination must not be empty");
            }
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            package_dirs: Vec::new(),
            placeholder: "reference".into(),
            exclude_glob: "assets/fragments/*".into(),
            template: REFERENCE_TEMPLATE.into(),
            overview_sections: false,
            copy_files: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let config = ReferenceConfig::default();
        let rendered = config.render_template("pkg.math");
        assert!(rendered.starts_with("# `pkg.math`"));
        assert!(rendered.contains("::: pkg.math\n"));
    }

    #[test]
    fn test_reference_section_alias() {
        let config: ReferenceConfig = toml::from_str(r#"reference_section = "api""#).unwrap();
        assert_eq!(config.placeholder, "api");
    }

    #[test]
    fn test_validate() {
        let config = ReferenceConfig {
            placeholder: "/".into(),
            template: "no token".into(),
            exclude_glob: "a/[".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.len(), 3);

        let mut diag = ConfigDiagnostics::new();
        ReferenceConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
