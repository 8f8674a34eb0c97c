//! Packaging hook configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use videoh_core::hook::{AwsSettings, BuildStep, ConfigEntry, HookConfig};

// Keys end up as environment variables of the front-end build
static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Parse a hook configuration from KDL text.
///
/// Relative paths are kept as written; see [`load_hook_config`] for
/// resolution against the file's directory.
pub fn parse_hook_config(kdl: &str) -> ConfigResult<HookConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut hook = HookConfig {
        entries: Vec::new(),
        ..HookConfig::default()
    };
    let mut aws = AwsSettings::default();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => hook.project = PathBuf::from(required_string(node, "project")?),
            "env-file" => hook.env_file = PathBuf::from(required_string(node, "env-file")?),
            "dist" => hook.dist = PathBuf::from(required_string(node, "dist")?),
            "prefix" => hook.prefix = get_first_string_arg(node).unwrap_or_default(),
            "strict-outputs" => hook.strict_outputs = required_bool(node, "strict-outputs")?,
            "atomic-write" => hook.atomic_write = required_bool(node, "atomic-write")?,
            "require-deployed" => {
                hook.require_deployed = required_bool(node, "require-deployed")?
            }
            "aws" => {
                aws.region = get_string_prop(node, "region");
                aws.profile = get_string_prop(node, "profile");
            }
            "output" => hook.entries.push(parse_output(node)?),
            "credential" => hook.entries.push(parse_credential(node)?),
            "literal" => hook.entries.push(parse_literal(node)?),
            "build" => hook.steps = parse_build(node)?,
            _ => {} // Ignore unknown nodes
        }
    }
    hook.aws = aws;

    if hook.entries.is_empty() {
        return Err(ConfigError::MissingField(
            "at least one output, credential or literal entry".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &hook.entries {
        if !KEY_REGEX.is_match(&entry.key) {
            return Err(ConfigError::InvalidValue {
                field: "entry key".to_string(),
                message: format!("'{}' is not a valid variable name", entry.key),
            });
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(ConfigError::Duplicate(format!("entry '{}'", entry.key)));
        }
    }

    Ok(hook)
}

/// Read and parse a hook configuration file.
///
/// A relative `project` is resolved against the directory holding the file.
pub fn load_hook_config(path: &Path) -> ConfigResult<HookConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut hook = parse_hook_config(&content)?;

    if hook.project.is_relative() {
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        hook.project = base.join(&hook.project);
    }

    Ok(hook)
}

fn parse_output(node: &KdlNode) -> ConfigResult<ConfigEntry> {
    let key = required_string(node, "output key")?;
    let stack = get_string_prop(node, "stack")
        .ok_or_else(|| ConfigError::MissingField(format!("stack for output '{}'", key)))?;
    let output_key = get_string_prop(node, "key")
        .ok_or_else(|| ConfigError::MissingField(format!("key for output '{}'", key)))?;
    check_query_literal("output key", &output_key)?;

    Ok(ConfigEntry::output(key, &stack, &output_key))
}

fn parse_credential(node: &KdlNode) -> ConfigResult<ConfigEntry> {
    let key = required_string(node, "credential key")?;
    let name = get_string_prop(node, "name")
        .ok_or_else(|| ConfigError::MissingField(format!("name for credential '{}'", key)))?;
    check_query_literal("credential name", &name)?;

    Ok(ConfigEntry::credential(key, name))
}

fn parse_literal(node: &KdlNode) -> ConfigResult<ConfigEntry> {
    let args = get_all_string_args(node);
    match args.as_slice() {
        [key, value] => Ok(ConfigEntry::literal(key, value)),
        [key] => Err(ConfigError::MissingField(format!("value for literal '{}'", key))),
        _ => Err(ConfigError::InvalidValue {
            field: "literal".to_string(),
            message: "expected a key and a value".to_string(),
        }),
    }
}

fn parse_build(node: &KdlNode) -> ConfigResult<Vec<BuildStep>> {
    let mut steps = Vec::new();
    let mut names = HashSet::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "step" {
                continue;
            }
            let mut args = get_all_string_args(child).into_iter();
            let name = args
                .next()
                .ok_or_else(|| ConfigError::MissingField("step name".to_string()))?;
            let program = args
                .next()
                .ok_or_else(|| ConfigError::MissingField(format!("program for step '{}'", name)))?;

            if !names.insert(name.clone()) {
                return Err(ConfigError::Duplicate(format!("step '{}'", name)));
            }
            steps.push(BuildStep::new(name, program, args));
        }
    }

    if steps.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "build".to_string(),
            message: "build block has no steps".to_string(),
        });
    }

    Ok(steps)
}

/// Output keys and credential names are quoted inside JMESPath queries.
fn check_query_literal(field: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() || value.contains(['\'', '`']) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("'{}' must be non-empty and contain no quotes or backticks", value),
        });
    }
    Ok(())
}

// Helper functions for extracting values from KDL nodes

fn required_string(node: &KdlNode, field: &str) -> ConfigResult<String> {
    get_first_string_arg(node).ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn required_bool(node: &KdlNode, field: &str) -> ConfigResult<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: field.to_string(),
            message: "expected #true or #false".to_string(),
        })
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
