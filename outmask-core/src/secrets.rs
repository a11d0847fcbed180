//! Resolves the configured secret sources into the needle list.
//!
//! Values are collected in a fixed order (literals, environment variables, files),
//! which is also the candidate precedence the redactor uses. Raw values are never
//! logged; log lines name the source instead.

use std::fs;

use log::{debug, warn};

use crate::config::RedactionConfig;
use crate::errors::{OutmaskError, Result};

/// Collects every secret value named by `config`.
///
/// `env_lookup` resolves environment variable names; pass
/// `|name| std::env::var(name).ok()` in production.
pub fn resolve_needles<F>(config: &RedactionConfig, env_lookup: F) -> Result<Vec<Vec<u8>>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut needles: Vec<Vec<u8>> = Vec::new();

    for (i, value) in config.secrets.iter().enumerate() {
        push_needle(&mut needles, value.as_bytes(), &format!("secrets[{}]", i), config);
    }

    for name in &config.secret_env {
        match env_lookup(name) {
            Some(value) => push_needle(&mut needles, value.as_bytes(), &format!("env:{}", name), config),
            None if config.allow_missing_env => {
                warn!("Secret environment variable '{}' is not set; skipping.", name);
            }
            None => return Err(OutmaskError::MissingSecretEnv(name.clone())),
        }
    }

    for path in &config.secret_files {
        let raw = fs::read(path).map_err(|source| OutmaskError::SecretFileRead {
            path: path.clone(),
            source,
        })?;
        let source = format!("file:{}", path.display());
        push_needle(&mut needles, trim_line_ending(&raw), &source, config);
    }

    debug!("Resolved {} distinct secret value(s).", needles.len());
    Ok(needles)
}

fn push_needle(needles: &mut Vec<Vec<u8>>, value: &[u8], source: &str, config: &RedactionConfig) {
    if value.is_empty() {
        warn!("Secret from {} is empty; ignoring.", source);
        return;
    }
    if value.len() < config.min_secret_length {
        warn!(
            "Secret from {} is shorter than min_secret_length ({}); ignoring.",
            source, config.min_secret_length
        );
        return;
    }
    if value.iter().any(|&b| b == b'\n' || b == b'\r') {
        warn!("Secret from {} contains a line break; occurrences split across lines may not be redacted.", source);
    }
    if needles.iter().any(|n| n.as_slice() == value) {
        debug!("Secret from {} duplicates an earlier value.", source);
        return;
    }
    needles.push(value.to_vec());
}

/// Secret files usually end with a newline that is not part of the value.
fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_resolve_in_source_order() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"file-token\n")?;

        let config = RedactionConfig {
            secrets: vec!["literal-1".into()],
            secret_env: vec!["DB_PASSWORD".into()],
            secret_files: vec![file.path().to_path_buf()],
            ..Default::default()
        };
        let needles = resolve_needles(&config, env(&[("DB_PASSWORD", "hunter2")]))?;
        assert_eq!(
            needles,
            vec![b"literal-1".to_vec(), b"hunter2".to_vec(), b"file-token".to_vec()]
        );
        Ok(())
    }

    #[test]
    fn test_missing_env_is_an_error_by_default() {
        let config = RedactionConfig {
            secret_env: vec!["NOPE".into()],
            ..Default::default()
        };
        let err = resolve_needles(&config, env(&[])).unwrap_err();
        assert!(matches!(err, OutmaskError::MissingSecretEnv(ref name) if name == "NOPE"));
    }

    #[test]
    fn test_missing_env_can_be_allowed() -> Result<()> {
        let config = RedactionConfig {
            secret_env: vec!["NOPE".into()],
            allow_missing_env: true,
            ..Default::default()
        };
        assert!(resolve_needles(&config, env(&[]))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_short_empty_and_duplicate_values_are_dropped() -> Result<()> {
        let config = RedactionConfig {
            secrets: vec!["".into(), "abc".into(), "longer-secret".into()],
            secret_env: vec!["SAME".into()],
            min_secret_length: 6,
            ..Default::default()
        };
        let needles = resolve_needles(&config, env(&[("SAME", "longer-secret")]))?;
        assert_eq!(needles, vec![b"longer-secret".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_unreadable_secret_file() {
        let config = RedactionConfig {
            secret_files: vec!["/definitely/not/here/secret".into()],
            ..Default::default()
        };
        let err = resolve_needles(&config, env(&[])).unwrap_err();
        assert!(matches!(err, OutmaskError::SecretFileRead { .. }));
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
        assert_eq!(trim_line_ending(b"a\nb\n"), b"a\nb");
    }
}
