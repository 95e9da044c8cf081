use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::SecureString;

/// Key that addresses the password slot of either record shape
pub const PASSWORD_KEY: &str = "password";

/// A secret as held by the store
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum SecretRecord {
    /// Password slot plus arbitrary key/value fields
    Flat(FlatSecret),
    /// Parsed from rendered template content
    Structured(StructuredSecret),
}

impl SecretRecord {
    /// Create an empty flat record
    pub fn new() -> Self {
        SecretRecord::Flat(FlatSecret::default())
    }

    pub fn password(&self) -> &SecureString {
        match self {
            SecretRecord::Flat(s) => &s.password,
            SecretRecord::Structured(s) => &s.password,
        }
    }

    pub fn set_password(&mut self, password: SecureString) {
        match self {
            SecretRecord::Flat(s) => s.password = password,
            SecretRecord::Structured(s) => s.password = password,
        }
    }

    /// Look up a field value; `password` is never returned here
    pub fn get(&self, key: &str) -> Option<&str> {
        let fields = match self {
            SecretRecord::Flat(s) => &s.fields,
            SecretRecord::Structured(s) => &s.fields,
        };
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing an existing value in place.
    ///
    /// Setting `password` writes the password slot.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidField {
                field: key.to_string(),
                reason: "field name must not be empty".to_string(),
            });
        }

        if key == PASSWORD_KEY {
            self.set_password(SecureString::from(value));
            return Ok(());
        }

        let fields = match self {
            SecretRecord::Flat(s) => &mut s.fields,
            SecretRecord::Structured(s) => {
                if key.contains(':') || key.chars().any(char::is_whitespace) {
                    return Err(Error::InvalidField {
                        field: key.to_string(),
                        reason: "structured field names must not contain ':' or whitespace"
                            .to_string(),
                    });
                }
                if value.contains('\n') {
                    return Err(Error::InvalidField {
                        field: key.to_string(),
                        reason: "structured field values must be a single line".to_string(),
                    });
                }
                &mut s.fields
            }
        };

        match fields.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => fields.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn keys(&self) -> Vec<&str> {
        let fields = match self {
            SecretRecord::Flat(s) => &s.fields,
            SecretRecord::Structured(s) => &s.fields,
        };
        fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, SecretRecord::Structured(_))
    }

    /// Render the record as editable text: password on the first line,
    /// `key: value` lines, then the free-form body.
    pub fn to_text(&self) -> std::result::Result<String, std::str::Utf8Error> {
        let (password, fields, body) = match self {
            SecretRecord::Flat(s) => (&s.password, &s.fields, &s.body),
            SecretRecord::Structured(s) => (&s.password, &s.fields, &s.body),
        };

        let mut text = String::from(password.as_str()?);
        text.push('\n');
        for (k, v) in fields {
            text.push_str(&format!("{}: {}\n", k, v));
        }
        if !body.is_empty() {
            text.push_str(body);
            if !body.ends_with('\n') {
                text.push('\n');
            }
        }
        Ok(text)
    }
}

impl Default for SecretRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Password slot plus unordered auxiliary fields
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FlatSecret {
    pub password: SecureString,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl Default for FlatSecret {
    fn default() -> Self {
        Self {
            password: SecureString::from(""),
            fields: Vec::new(),
            body: String::new(),
        }
    }
}

/// Record with a template-defined field set
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StructuredSecret {
    pub password: SecureString,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

type Parts = (SecureString, Vec<(String, String)>, String);

/// Split text into password line, `key: value` fields and body. Everything
/// from the first line that is not a field onwards is kept verbatim as the
/// body.
fn parse_parts(content: &str) -> Parts {
    let mut lines = content.lines();
    let password = lines.next().unwrap_or_default();

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut body = String::new();
    for line in lines {
        if body.is_empty() {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                if !key.is_empty() && !key.chars().any(char::is_whitespace) {
                    let value = value.trim().to_string();
                    match fields.iter_mut().find(|(k, _)| k == key) {
                        Some(entry) => entry.1 = value,
                        None => fields.push((key.to_string(), value)),
                    }
                    continue;
                }
            }
        }
        body.push_str(line);
        body.push('\n');
    }

    (SecureString::from(password), fields, body)
}

/// Parse rendered template content into a structured record.
///
/// The first line is the password, followed by `key: value` fields and a
/// free-form body.
pub fn parse_structured(content: &str) -> Result<SecretRecord> {
    if content.trim().is_empty() {
        return Err(Error::Template("rendered content is empty".to_string()));
    }

    let (password, fields, body) = parse_parts(content);
    Ok(SecretRecord::Structured(StructuredSecret {
        password,
        fields,
        body,
    }))
}

/// Parse text produced by [`SecretRecord::to_text`] back into a record of
/// the same shape as `like`.
pub fn parse_like(like: &SecretRecord, content: &str) -> Result<SecretRecord> {
    if like.is_structured() {
        return parse_structured(content);
    }

    let (password, fields, body) = parse_parts(content);
    Ok(SecretRecord::Flat(FlatSecret {
        password,
        fields,
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_flat_and_empty() {
        let record = SecretRecord::new();
        assert!(!record.is_structured());
        assert!(record.password().is_empty());
        assert!(record.keys().is_empty());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = SecretRecord::new();
        record.set("user", "alice").unwrap();
        record.set("url", "https://example.com").unwrap();
        record.set("user", "bob").unwrap();

        assert_eq!(record.get("user"), Some("bob"));
        assert_eq!(record.keys(), vec!["user", "url"]);
    }

    #[test]
    fn test_set_password_key_writes_slot() {
        let mut record = SecretRecord::new();
        record.set("password", "hunter2").unwrap();

        assert_eq!(record.password().as_bytes(), b"hunter2");
        assert!(record.get("password").is_none());
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut record = SecretRecord::new();
        assert!(record.set("", "x").is_err());
    }

    #[test]
    fn test_structured_rejects_invalid_keys() {
        let mut record = parse_structured("pw\nuser: alice\n").unwrap();

        assert!(record.set("has space", "x").is_err());
        assert!(record.set("a:b", "x").is_err());
        assert!(record.set("note", "two\nlines").is_err());
        assert!(record.set("login", "alice").is_ok());
    }

    #[test]
    fn test_parse_structured() {
        let record =
            parse_structured("s3cret\nuser: alice\nurl: https://example.com\n\nfree text\n")
                .unwrap();

        assert!(record.is_structured());
        assert_eq!(record.password().as_bytes(), b"s3cret");
        assert_eq!(record.get("user"), Some("alice"));
        assert_eq!(record.get("url"), Some("https://example.com"));

        let text = record.to_text().unwrap();
        assert!(text.starts_with("s3cret\n"));
        assert!(text.ends_with("free text\n"));
    }

    #[test]
    fn test_parse_like_keeps_shape() {
        let mut flat = SecretRecord::new();
        flat.set("password", "pw").unwrap();
        flat.set("user", "alice").unwrap();

        let text = flat.to_text().unwrap();
        let parsed = parse_like(&flat, &format!("{}note\n", text)).unwrap();

        assert!(!parsed.is_structured());
        assert_eq!(parsed.password().as_bytes(), b"pw");
        assert_eq!(parsed.get("user"), Some("alice"));
        assert_eq!(parsed.to_text().unwrap(), "pw\nuser: alice\nnote\n");
    }

    #[test]
    fn test_parse_structured_empty_fails() {
        assert!(parse_structured("  \n").is_err());
    }
}
