//! Minimal `$name` / `${name}` placeholder rendering for configuration skeletons

use std::collections::BTreeMap;
use thiserror::Error;

use shellproof_utils::error::{ErrorCategory, UserFriendlyError};

/// Maven `settings.xml` pointing every repository at `${repository}`
pub const SETTINGS_TEMPLATE: &str = include_str!("templates/settings.xml");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template references unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Unterminated '${{' at byte {offset}")]
    Unterminated { offset: usize },

    #[error("Empty placeholder at byte {offset}")]
    EmptyPlaceholder { offset: usize },
}

impl UserFriendlyError for TemplateError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some("Placeholders are written $name or ${name}; $$ is a literal dollar sign.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownParameter { name } => vec![format!("Provide a value for '{name}'")],
            Self::Unterminated { .. } | Self::EmptyPlaceholder { .. } => {
                vec!["Close the placeholder with '}' or escape the dollar as $$".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute placeholders in `template` from `parameters`.
///
/// A `$` not followed by a name character or `{` is kept as-is.
pub fn render(template: &str, parameters: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let dollar_at = offset + pos;

        let consumed = if after.starts_with('$') {
            out.push('$');
            1
        } else if let Some(braced) = after.strip_prefix('{') {
            let end = braced
                .find('}')
                .ok_or(TemplateError::Unterminated { offset: dollar_at })?;
            let name = &braced[..end];
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder { offset: dollar_at });
            }
            out.push_str(lookup(parameters, name)?);
            end + 2
        } else {
            let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
            if len == 0 {
                out.push('$');
            } else {
                out.push_str(lookup(parameters, &after[..len])?);
            }
            len
        };

        let advance = pos + 1 + consumed;
        rest = &rest[advance..];
        offset += advance;
    }
    out.push_str(rest);

    Ok(out)
}

fn lookup<'a>(parameters: &'a BTreeMap<String, String>, name: &str) -> Result<&'a str, TemplateError> {
    parameters
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| TemplateError::UnknownParameter {
            name: name.to_string(),
        })
}

/// Render [`SETTINGS_TEMPLATE`] for `repository`.
pub fn render_settings(repository: &str) -> Result<String, TemplateError> {
    let parameters = BTreeMap::from([("repository".to_string(), repository.to_string())]);
    render(SETTINGS_TEMPLATE, &parameters)
}
