use std::collections::BTreeMap;
use std::env;

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use minijinja::{Environment, UndefinedBehavior, Value};

/// Holds in-memory config state for the execution.
///
/// Defaults are overridden first by `JINJAPAD_*` environment variables and
/// then by command line flags.
#[derive(Debug, Clone)]
pub struct Config {
    strict: bool,
    newline: bool,
    sample: bool,
    fuel: u64,
    expr_out: String,
    defines: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // strict is the default, --lenient opts out
            strict: true,
            newline: true,
            sample: true,
            fuel: 0,
            expr_out: "print".to_string(),
            defines: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn update_from_env(&mut self) -> Result<(), Error> {
        if let Ok(lenient) = env::var("JINJAPAD_LENIENT") {
            self.strict = !parse_env_bool(&lenient, "JINJAPAD_LENIENT")?;
        }
        if let Ok(newline) = env::var("JINJAPAD_NEWLINE") {
            self.newline = parse_env_bool(&newline, "JINJAPAD_NEWLINE")?;
        }
        if let Ok(sample) = env::var("JINJAPAD_SAMPLE") {
            self.sample = parse_env_bool(&sample, "JINJAPAD_SAMPLE")?;
        }
        if let Ok(expr_out) = env::var("JINJAPAD_EXPR_OUT") {
            self.expr_out = parse_expr_out(&expr_out, "JINJAPAD_EXPR_OUT")?;
        }
        if let Ok(fuel) = env::var("JINJAPAD_FUEL") {
            self.fuel = fuel
                .parse::<u64>()
                .with_context(|| format!("invalid fuel value in JINJAPAD_FUEL: {}", fuel))?;
        }
        Ok(())
    }

    pub fn update_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        if matches.get_flag("lenient") {
            self.strict = false;
        }
        if matches.get_flag("no-newline") {
            self.newline = false;
        }
        if matches.get_flag("no-sample") {
            self.sample = false;
        }
        if let Some(expr_out) = matches.get_one::<String>("expr-out") {
            self.expr_out = expr_out.clone();
        }
        if let Some(fuel) = matches.get_one::<u64>("fuel") {
            self.fuel = *fuel;
        }
        if let Some(items) = matches.get_many::<String>("define") {
            for item in items {
                self.add_define(item)?;
            }
        }
        Ok(())
    }

    fn add_define(&mut self, item: &str) -> Result<(), Error> {
        if let Some((key, raw_value)) = item.split_once(":=") {
            self.defines
                .insert(key.to_string(), interpret_raw_value(raw_value)?);
        } else if let Some((key, string_value)) = item.split_once('=') {
            self.defines
                .insert(key.to_string(), Value::from(string_value));
        } else {
            self.defines.insert(item.to_string(), Value::from(true));
        }
        Ok(())
    }

    pub fn newline(&self) -> bool {
        self.newline
    }

    pub fn sample(&self) -> bool {
        self.sample
    }

    pub fn expr_out(&self) -> &str {
        &self.expr_out
    }

    pub fn defines(&self) -> Value {
        Value::from_serialize(&self.defines)
    }

    pub fn apply_to_env(&self, env: &mut Environment) {
        // debug mode attaches template source context to engine errors
        env.set_debug(true);
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        if self.fuel > 0 {
            env.set_fuel(Some(self.fuel));
        }
    }
}

fn interpret_raw_value(s: &str) -> Result<Value, Error> {
    serde_json::from_str::<Value>(s)
        .with_context(|| format!("invalid raw value '{}' (not valid JSON)", s))
}

// clap validates --expr-out through its value parser; the env var path
// has to do the same check by hand
fn parse_expr_out(s: &str, var_name: &str) -> Result<String, Error> {
    match s {
        "print" | "json" | "json-pretty" => Ok(s.to_string()),
        _ => bail!("Invalid expression output mode for {}: {}", var_name, s),
    }
}

fn parse_env_bool(s: &str, var_name: &str) -> Result<bool, Error> {
    match s.to_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => bail!("Invalid boolean value for {}: {}", var_name, s),
    }
}
