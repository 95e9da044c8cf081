//! Templates for newly generated secrets.
//!
//! A template is registered for a directory prefix and applies to every secret
//! below it; the closest directory wins. Placeholders:
//!
//! - `{{ content }}`: the generated password
//! - `{{ name }}`: final segment of the secret name
//! - `{{ dir }}`: directory of the secret
//! - `{{ path }}`: full secret name

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::rules::{basename, dirname};

pub trait TemplateRenderer {
    /// Render the template that applies to `name`. `Ok(None)` when none does.
    fn render(&self, name: &str, password: &[u8]) -> Result<Option<String>>;
}

#[derive(Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    pub fn new(templates: BTreeMap<String, String>) -> Self {
        let templates = templates
            .into_iter()
            .map(|(dir, body)| (dir.trim_matches('/').to_string(), body))
            .collect();
        Self { templates }
    }

    fn lookup(&self, name: &str) -> Option<&String> {
        let mut dir = dirname(name);
        loop {
            let key = if dir == "." || dir == "/" { "" } else { dir };
            if let Some(template) = self.templates.get(key) {
                return Some(template);
            }
            if key.is_empty() {
                return None;
            }
            dir = dirname(dir);
        }
    }
}

impl TemplateRenderer for TemplateSet {
    fn render(&self, name: &str, password: &[u8]) -> Result<Option<String>> {
        let template = match self.lookup(name) {
            Some(t) => t,
            None => return Ok(None),
        };

        let content = std::str::from_utf8(password)
            .map_err(|_| Error::Template("password is not valid UTF-8".to_string()))?;

        render_template(template, name, content).map(Some)
    }
}

fn render_template(template: &str, name: &str, content: &str) -> Result<String> {
    let mut output = String::with_capacity(template.len() + content.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| Error::Template("unclosed placeholder".to_string()))?;

        let value = match after[..end].trim() {
            "content" => content,
            "name" => basename(name),
            "dir" => dirname(name),
            "path" => name,
            other => {
                return Err(Error::Template(format!("unknown placeholder `{}`", other)));
            }
        };
        output.push_str(value);
        rest = &after[end + 2..];
    }
    output.push_str(rest);

    Ok(output)
}
