//! Prompt Loader
//!
//! Loads prompt templates from the override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for rendering prompt templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    /// The step being elaborated or illustrated
    pub step: String,
    /// Every step of the build, each preceded by a newline
    pub all_steps: String,
}

impl PromptContext {
    /// Context for illustrating a single step
    pub fn step(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            all_steps: String::new(),
        }
    }

    /// Context for elaborating `step` within the steps of its build
    pub fn elaboration(step: impl Into<String>, steps: &[String]) -> Self {
        let step = step.into();
        debug!(step_len = step.len(), steps = steps.len(), "PromptContext::elaboration: called");
        Self {
            step,
            all_steps: steps.iter().map(|s| format!("\n{}", s)).collect(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directory holding `{name}.pmt` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that prefers templates from `override_dir`
    pub fn new(override_dir: Option<&Path>) -> Self {
        let override_dir = override_dir.map(Path::to_path_buf);
        debug!(?override_dir, "PromptLoader::new: called");

        let override_dir = match override_dir {
            Some(dir) if dir.is_dir() => Some(dir),
            Some(dir) => {
                tracing::warn!("Prompt override directory {} does not exist, using embedded prompts", dir.display());
                None
            }
            None => None,
        };

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    // Prompts are plain text, never HTML
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{prompts-dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in override directory");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in override directory");
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        let rendered = self
            .hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))?;
        Ok(rendered.trim_end().to_string())
    }

    pub fn verify_prompt(&self) -> Result<String> {
        self.render("verify", &PromptContext::default())
    }

    pub fn instructions_prompt(&self) -> Result<String> {
        self.render("instructions", &PromptContext::default())
    }

    pub fn elaboration_prompt(&self) -> Result<String> {
        self.render("elaboration", &PromptContext::default())
    }

    /// User text for an elaboration call
    pub fn elaboration_request(&self, step: &str, steps: &[String]) -> Result<String> {
        self.render("elaboration-request", &PromptContext::elaboration(step, steps))
    }

    /// Image prompt for a step of a new build
    pub fn image_step(&self, step: &str) -> Result<String> {
        self.render("image-step", &PromptContext::step(step))
    }

    /// Image prompt for an elaborated step
    pub fn image_elaboration(&self, step: &str) -> Result<String> {
        self.render("image-elaboration", &PromptContext::step(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_elaboration_request_layout() {
        let loader = PromptLoader::embedded_only();
        let steps = vec!["#### Step 1: Cut".to_string(), "#### Step 2: Sand".to_string()];

        let text = loader.elaboration_request("#### Step 2: Sand", &steps).unwrap();
        assert_eq!(text, "<< #### Step 2: Sand >> \n\n\n\n\n#### Step 1: Cut\n#### Step 2: Sand");
    }

    #[test]
    fn test_no_html_escaping() {
        let loader = PromptLoader::embedded_only();
        let text = loader.image_step("Drill a 1/4\" hole & \"countersink\" <carefully>").unwrap();
        assert!(text.ends_with("<< Drill a 1/4\" hole & \"countersink\" <carefully> >>"));
    }

    #[test]
    fn test_image_elaboration_differs_from_step() {
        let loader = PromptLoader::embedded_only();
        let step = loader.image_step("x").unwrap();
        let elaborated = loader.image_elaboration("x").unwrap();
        assert_ne!(step, elaborated);
        assert!(elaborated.contains("sequence"));
    }

    #[test]
    fn test_override_directory_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("verify.pmt"), "Just say no.").unwrap();

        let loader = PromptLoader::new(Some(temp.path()));
        assert_eq!(loader.verify_prompt().unwrap(), "Just say no.");
        // Templates missing from the override directory still come from the binary
        assert!(loader.instructions_prompt().unwrap().contains("#### Step N:"));
    }

    #[test]
    fn test_missing_override_directory_falls_back() {
        let temp = TempDir::new().unwrap();
        let absent = temp.path().join("absent");
        let loader = PromptLoader::new(Some(absent.as_path()));
        assert!(loader.verify_prompt().unwrap().contains("\"no\""));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.render("nonexistent-template", &PromptContext::default()).is_err());
    }
}
