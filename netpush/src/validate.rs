//! Checks run over the collected command output of every host.
//!
//! Validators are looked up by reference in a [`ValidatorRegistry`] built at
//! compile time. A reference is a dotted identifier path such as `contains`
//! or `site.checks.bgp_up`; references are checked before any session is
//! opened, so a typo fails fast instead of after a fleet-wide run.
//!
//! The built-in validators compare each host's output against an expected
//! string taken from [`ValidationArgs`]:
//!
//! | name           | passes when the output...            |
//! |----------------|--------------------------------------|
//! | `contains`     | contains the expected text           |
//! | `not_contains` | does not contain the expected text   |
//! | `regex`        | matches the expected regex           |
//!
//! The host `*` sets the expectation for every host not listed by name.

use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::command::CommandResult;
use crate::error::{Error, Result, ValidationError};

/// Host key that applies an expectation to every unlisted host.
pub const ANY_HOST: &str = "*";

/// Verdict of one validator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub pass: bool,
    pub message: String,
}

/// Arguments handed to a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationArgs {
    /// Key/value pairs, host to expected value for the built-ins.
    Inline(IndexMap<String, String>),
    /// Raw CSV text with `host,expected` rows.
    Csv(String),
}

impl ValidationArgs {
    /// Load from a file: `.yml`/`.yaml` as a string map, anything else as CSV.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));

        if !is_yaml {
            return Ok(Self::Csv(content));
        }

        let map: IndexMap<String, String> =
            serde_yaml::from_str(&content).map_err(|e| ValidationError::InvalidArgs {
                message: format!("{}: {e}", path.display()),
            })?;
        Ok(Self::Inline(map))
    }

    /// Host to expected value, in file order.
    pub fn expectations(&self) -> Result<IndexMap<String, String>> {
        match self {
            Self::Inline(map) => Ok(map.clone()),
            Self::Csv(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| -> Result<(String, String)> {
                    let (host, expected) =
                        line.split_once(',').ok_or_else(|| ValidationError::InvalidArgs {
                            message: format!("expected 'host,value', got {line:?}"),
                        })?;
                    Ok((host.trim().to_string(), expected.trim().to_string()))
                })
                .collect(),
        }
    }
}

/// A check over the outputs of every host.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        outputs: &IndexMap<String, CommandResult>,
        args: &ValidationArgs,
    ) -> Result<Validation>;
}

/// Closed set of validators, keyed by reference.
pub struct ValidatorRegistry {
    validators: IndexMap<String, Box<dyn Validator>>,
}

impl ValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            validators: IndexMap::new(),
        }
    }

    /// A registry holding `contains`, `not_contains` and `regex`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("contains", ExpectText { negate: false });
        registry.insert("not_contains", ExpectText { negate: true });
        registry.insert("regex", ExpectRegex);
        registry
    }

    fn insert(&mut self, reference: &str, validator: impl Validator + 'static) {
        self.validators.insert(reference.to_string(), Box::new(validator));
    }

    /// Add a validator under `reference`, replacing any previous one.
    pub fn register(&mut self, reference: &str, validator: impl Validator + 'static) -> Result<()> {
        check_reference(reference)?;
        self.insert(reference, validator);
        Ok(())
    }

    /// Look up a validator; run this before opening any session.
    pub fn resolve(&self, reference: &str) -> Result<&dyn Validator> {
        check_reference(reference)?;
        self.validators
            .get(reference)
            .map(|validator| &**validator)
            .ok_or_else(|| {
                ValidationError::UnknownValidator {
                    name: reference.to_string(),
                }
                .into()
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn check_reference(reference: &str) -> Result<()> {
    let is_ident = |segment: &str| {
        let mut chars = segment.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    if reference.split('.').all(is_ident) {
        Ok(())
    } else {
        Err(ValidationError::MalformedValidator {
            reference: reference.to_string(),
        }
        .into())
    }
}

/// Run `check(output, expected)` for every expected host and fold the verdicts.
fn check_each(
    outputs: &IndexMap<String, CommandResult>,
    args: &ValidationArgs,
    mut check: impl FnMut(&str, &str) -> Result<bool>,
) -> Result<Validation> {
    let expectations = args.expectations()?;
    if expectations.is_empty() {
        return Err(ValidationError::InvalidArgs {
            message: "no expectations given".to_string(),
        }
        .into());
    }

    let mut pairs: Vec<(&str, &str)> = expectations
        .iter()
        .filter(|(host, _)| host.as_str() != ANY_HOST)
        .map(|(host, expected)| (host.as_str(), expected.as_str()))
        .collect();
    if let Some(expected) = expectations.get(ANY_HOST) {
        pairs.extend(
            outputs
                .keys()
                .filter(|host| !expectations.contains_key(host.as_str()))
                .map(|host| (host.as_str(), expected.as_str())),
        );
    }

    let mut failures = vec![];
    for (host, expected) in &pairs {
        match outputs.get(*host) {
            None => failures.push(format!("{host}: no output collected")),
            Some(result) if !result.succeeded() => failures.push(format!(
                "{host}: command failed: {}",
                result.error_detail().unwrap_or_default()
            )),
            Some(result) => {
                if !check(result.raw_output(), expected)? {
                    failures.push(format!("{host}: check failed for {expected:?}"));
                }
            }
        }
    }
    debug!("validated {} hosts, {} failures", pairs.len(), failures.len());

    Ok(if failures.is_empty() {
        Validation {
            pass: true,
            message: format!("{} checks passed", pairs.len()),
        }
    } else {
        Validation {
            pass: false,
            message: failures.join("; "),
        }
    })
}

struct ExpectText {
    negate: bool,
}

impl Validator for ExpectText {
    fn validate(
        &self,
        outputs: &IndexMap<String, CommandResult>,
        args: &ValidationArgs,
    ) -> Result<Validation> {
        check_each(outputs, args, |output, expected| {
            Ok(output.contains(expected) != self.negate)
        })
    }
}

struct ExpectRegex;

impl Validator for ExpectRegex {
    fn validate(
        &self,
        outputs: &IndexMap<String, CommandResult>,
        args: &ValidationArgs,
    ) -> Result<Validation> {
        check_each(outputs, args, |output, expected| {
            let re = Regex::new(expected).map_err(|e| ValidationError::InvalidArgs {
                message: format!("bad regex {expected:?}: {e}"),
            })?;
            Ok(re.is_match(output))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> IndexMap<String, CommandResult> {
        IndexMap::from([
            ("r1".to_string(), CommandResult::ok("r1", "BGP state = Established, up for 2d")),
            ("r2".to_string(), CommandResult::ok("r2", "BGP state = Idle")),
            ("r3".to_string(), CommandResult::failed("r3", "connection refused")),
        ])
    }

    fn inline(pairs: &[(&str, &str)]) -> ValidationArgs {
        ValidationArgs::Inline(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_resolve_builtins() {
        let registry = ValidatorRegistry::with_builtins();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["contains", "not_contains", "regex"]);
        assert!(registry.resolve("regex").is_ok());
    }

    #[test]
    fn test_malformed_reference() {
        let registry = ValidatorRegistry::default();
        for reference in ["", "a..b", "checks.", "1abc", "checks.bgp-up", "../etc/passwd"] {
            match registry.resolve(reference) {
                Err(Error::Validation(ValidationError::MalformedValidator { .. })) => {}
                Err(other) => panic!("{reference:?}: unexpected {other}"),
                Ok(_) => panic!("{reference:?} accepted"),
            }
        }
    }

    #[test]
    fn test_unknown_reference() {
        let registry = ValidatorRegistry::default();
        match registry.resolve("site.checks.bgp_up") {
            Err(Error::Validation(ValidationError::UnknownValidator { name })) => {
                assert_eq!(name, "site.checks.bgp_up")
            }
            Err(other) => panic!("unexpected {other}"),
            Ok(_) => panic!("unknown validator resolved"),
        }
    }

    #[test]
    fn test_register_custom() {
        struct AllSucceeded;
        impl Validator for AllSucceeded {
            fn validate(
                &self,
                outputs: &IndexMap<String, CommandResult>,
                _: &ValidationArgs,
            ) -> Result<Validation> {
                let pass = outputs.values().all(CommandResult::succeeded);
                Ok(Validation {
                    pass,
                    message: String::new(),
                })
            }
        }

        let mut registry = ValidatorRegistry::new();
        registry.register("site.checks.all_up", AllSucceeded).unwrap();
        assert!(registry.register("site checks", AllSucceeded).is_err());

        let verdict = registry
            .resolve("site.checks.all_up")
            .unwrap()
            .validate(&outputs(), &inline(&[]))
            .unwrap();
        assert!(!verdict.pass);
    }

    #[test]
    fn test_contains() {
        let registry = ValidatorRegistry::default();
        let contains = registry.resolve("contains").unwrap();

        let verdict = contains.validate(&outputs(), &inline(&[("r1", "Established")])).unwrap();
        assert!(verdict.pass, "{}", verdict.message);

        let verdict = contains
            .validate(&outputs(), &inline(&[("r1", "Established"), ("r2", "Established")]))
            .unwrap();
        assert!(!verdict.pass);
        assert!(verdict.message.starts_with("r2:"));
    }

    #[test]
    fn test_not_contains_with_wildcard() {
        let registry = ValidatorRegistry::default();
        let verdict = registry
            .resolve("not_contains")
            .unwrap()
            .validate(&outputs(), &inline(&[("*", "Idle")]))
            .unwrap();
        assert!(!verdict.pass);
        assert!(verdict.message.contains("r2:"));
        assert!(verdict.message.contains("r3: command failed: connection refused"));
        assert!(!verdict.message.contains("r1:"));
    }

    #[test]
    fn test_regex() {
        let registry = ValidatorRegistry::default();
        let regex = registry.resolve("regex").unwrap();

        let verdict = regex
            .validate(&outputs(), &inline(&[("r1", r"up for \d+d")]))
            .unwrap();
        assert!(verdict.pass);

        let err = regex.validate(&outputs(), &inline(&[("r1", "(")])).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidArgs { .. })));
    }

    #[test]
    fn test_missing_host_fails() {
        let registry = ValidatorRegistry::default();
        let verdict = registry
            .resolve("contains")
            .unwrap()
            .validate(&outputs(), &inline(&[("r9", "x")]))
            .unwrap();
        assert!(!verdict.pass);
        assert_eq!(verdict.message, "r9: no output collected");
    }

    #[test]
    fn test_csv_args() {
        let args = ValidationArgs::Csv("r1, Established\n\nr2,Idle\n".to_string());
        let expectations = args.expectations().unwrap();
        assert_eq!(expectations["r1"], "Established");
        assert_eq!(expectations["r2"], "Idle");

        let verdict = ValidatorRegistry::default()
            .resolve("contains")
            .unwrap()
            .validate(&outputs(), &args)
            .unwrap();
        assert!(verdict.pass);

        let bad = ValidationArgs::Csv("r1\n".to_string());
        assert!(bad.expectations().is_err());
    }

    #[test]
    fn test_args_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("expect.yml");
        std::fs::write(&yaml, "r1: Established\nr2: Idle\n").unwrap();
        assert_eq!(
            ValidationArgs::from_file(&yaml).unwrap(),
            inline(&[("r1", "Established"), ("r2", "Idle")])
        );

        let csv = dir.path().join("expect.csv");
        std::fs::write(&csv, "r1,Established\n").unwrap();
        assert_eq!(
            ValidationArgs::from_file(&csv).unwrap(),
            ValidationArgs::Csv("r1,Established\n".to_string())
        );

        let missing = ValidationArgs::from_file(&dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }
}
