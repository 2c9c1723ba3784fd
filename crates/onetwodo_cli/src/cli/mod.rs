use clap::Parser;
use onetwodo_core::config::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output views as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,

    /// Command to run once, e.g. `add Buy milk d/tomorrow t/6pm`.
    /// Starts the interactive prompt when empty.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// The one-shot command line, or `None` for the interactive prompt.
    pub fn command_line(&self) -> Option<String> {
        let joined = self.command.join(" ");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StorePath,
    LogLevel,
    LogDir,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let plain = |target: ConfigOverrideTarget| {
        if remainder.is_some() {
            Err(format!("{canonical_field} override cannot have subfields"))
        } else {
            Ok(ParsedConfigOverride {
                target,
                value: value.clone(),
            })
        }
    };

    match canonical_field.as_str() {
        "store_path" | "store" => plain(ConfigOverrideTarget::StorePath),
        "log_level" => plain(ConfigOverrideTarget::LogLevel),
        "log_dir" => plain(ConfigOverrideTarget::LogDir),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` into one set, reporting the first bad entry.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|err| format!("{CONFIG_OVERRIDE_FLAG} {entry}: {err}"))?;
        match parsed.target {
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(parsed.value.into()),
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
            ConfigOverrideTarget::LogDir => overrides.log_dir = Some(parsed.value.into()),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, ConfigOverrideTarget, collect_overrides, parse_config_override};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Log-Level = debug ").unwrap();

        match parsed.target {
            ConfigOverrideTarget::LogLevel => {}
            other => panic!("unexpected target: {other:?}"),
        }

        assert_eq!(parsed.value, "debug");
    }

    #[test]
    fn parse_config_override_rejects_subfields_on_plain_keys() {
        let err = parse_config_override("store_path.x=/tmp/a.json").unwrap_err();
        assert!(err.contains("cannot have subfields"));
    }

    #[test]
    fn parse_config_override_rejects_empty_alias_name() {
        let err = parse_config_override("aliases. = foo").unwrap_err();
        assert!(err.contains("aliases override requires an alias name"));
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("theme=dark").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("aliasesls").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_trims_whitespace_for_alias_names() {
        let parsed = parse_config_override("aliases. ls = list all").unwrap();

        match parsed.target {
            ConfigOverrideTarget::Alias(alias) => assert_eq!(alias, "ls"),
            other => panic!("unexpected target: {other:?}"),
        }

        assert_eq!(parsed.value, "list all");
    }

    #[test]
    fn collect_overrides_folds_entries() {
        let overrides = collect_overrides(&[
            "store_path=/tmp/tasks.json".to_string(),
            "aliases.a=add".to_string(),
            "log_dir=/tmp/logs".to_string(),
        ])
        .unwrap();

        assert_eq!(overrides.store_path, Some(PathBuf::from("/tmp/tasks.json")));
        assert_eq!(overrides.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(overrides.aliases.get("a").map(String::as_str), Some("add"));
        assert!(collect_overrides(&["bogus=1".to_string()]).is_err());
    }

    #[test]
    fn trailing_words_form_one_command_line() {
        let cli = Cli::try_parse_from([
            "onetwodo", "--json", "add", "Buy", "milk", "d/tomorrow", "t/6pm",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(
            cli.command_line().as_deref(),
            Some("add Buy milk d/tomorrow t/6pm")
        );
    }

    #[test]
    fn no_words_means_interactive() {
        let cli = Cli::try_parse_from(["onetwodo", "--store", "/tmp/x.json"]).unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(cli.command_line(), None);
    }
}
