//! Split raw command-line tokens into positional values and resolved options.
//!
//! Token grammar:
//! - `--name=value`
//! - `--name` (value `"true"`)
//! - `--no-name` (value `"false"`) unless `no-name` is itself declared
//! - `-x`, `-xyz`: every character is an independent short name, value `"true"`
//! - `-x=value`: a single short name with a value; `-xy=value` is rejected
//! - `--`: everything after it is positional
//! - `-`, negative numbers and anything else: positional

use crate::error::BindError;
use crate::interpolate::{DefaultsContext, interpolate};
use crate::list_encoding;
use crate::spec::Spec;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// Per-invocation binding state: leftover positionals and resolved options.
///
/// Created fresh for each invocation; the binder consumes it.
#[derive(Debug, Clone)]
pub struct Arguments<'s> {
    spec: &'s Spec,
    positionals: VecDeque<String>,
    options: IndexMap<String, Option<String>>,
    supplied: IndexSet<String>,
}

#[derive(Default)]
struct Collected {
    supplied: IndexMap<String, String>,
    invalid: Vec<String>,
    repeated: Vec<String>,
}

impl Collected {
    fn record(&mut self, spec: &Spec, name: &str, value: &str) {
        let Some(opt) = spec.resolve(name) else {
            if !self.invalid.iter().any(|n| n == name) {
                self.invalid.push(name.to_string());
            }
            return;
        };

        let primary = opt.name();
        if opt.is_listable() {
            let next = list_encoding::append(
                self.supplied.get(primary).map(String::as_str),
                value,
            );
            self.supplied.insert(primary.to_string(), next);
        } else if self.supplied.contains_key(primary) {
            if !self.repeated.iter().any(|n| n == primary) {
                self.repeated.push(primary.to_string());
            }
        } else {
            self.supplied.insert(primary.to_string(), value.to_string());
        }
    }
}

fn is_negative_number(spec: &Spec, token: &str) -> bool {
    let body = &token[1..];
    let starts_numeric = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    if !starts_numeric {
        return false;
    }
    // A declared digit short name wins over the numeric reading.
    let first = &body[..1];
    !spec.knows(first) && body.parse::<f64>().is_ok()
}

impl<'s> Arguments<'s> {
    /// Tokenize `argv` against `spec`.
    ///
    /// Unknown names, missing required options and repeated non-listable
    /// options are collected over the whole input and reported at the end,
    /// in that order of precedence.
    pub fn bind<S: AsRef<str>>(
        spec: &'s Spec,
        argv: &[S],
        defaults: &dyn DefaultsContext,
    ) -> Result<Self, BindError> {
        let mut collected = Collected::default();
        let mut positionals: VecDeque<String> = VecDeque::new();
        let mut after_separator = false;

        for token in argv {
            let arg = token.as_ref();

            if after_separator {
                positionals.push_back(arg.to_string());
                continue;
            }
            if arg == "--" {
                after_separator = true;
                continue;
            }

            if let Some(body) = arg.strip_prefix("--") {
                if let Some((name, value)) = body.split_once('=') {
                    if name.is_empty() {
                        return Err(BindError::InvalidOption {
                            token: arg.to_string(),
                        });
                    }
                    collected.record(spec, name, value);
                } else if spec.knows(body) {
                    collected.record(spec, body, "true");
                } else if let Some(negated) = body.strip_prefix("no-").filter(|n| spec.knows(n)) {
                    collected.record(spec, negated, "false");
                } else {
                    collected.record(spec, body, "true");
                }
                tracing::trace!(token = arg, "long option");
                continue;
            }

            if arg.len() > 1 && arg.starts_with('-') && !is_negative_number(spec, arg) {
                let body = &arg[1..];
                if let Some((name, value)) = body.split_once('=') {
                    if name.chars().count() != 1 {
                        return Err(BindError::InvalidOption {
                            token: arg.to_string(),
                        });
                    }
                    collected.record(spec, name, value);
                } else {
                    let mut buf = [0u8; 4];
                    for c in body.chars() {
                        collected.record(spec, c.encode_utf8(&mut buf), "true");
                    }
                }
                tracing::trace!(token = arg, "short options");
                continue;
            }

            positionals.push_back(arg.to_string());
        }

        let Collected {
            supplied,
            invalid,
            repeated,
        } = collected;

        if !invalid.is_empty() {
            return Err(BindError::UnknownOption { names: invalid });
        }

        let missing: Vec<String> = spec
            .options()
            .values()
            .filter(|opt| opt.is_required() && !supplied.contains_key(opt.name()))
            .map(|opt| opt.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BindError::MissingRequiredOption { names: missing });
        }

        if !repeated.is_empty() {
            return Err(BindError::RepeatedOption { names: repeated });
        }

        let mut options = spec.defaults();
        for value in options.values_mut() {
            if let Some(raw) = value {
                *raw = interpolate(raw, defaults);
            }
        }
        let supplied_names: IndexSet<String> = supplied.keys().cloned().collect();
        for (name, value) in supplied {
            options.insert(name, Some(value));
        }

        tracing::debug!(
            positionals = positionals.len(),
            supplied = supplied_names.len(),
            "tokenized arguments"
        );

        Ok(Self {
            spec,
            positionals,
            options,
            supplied: supplied_names,
        })
    }

    pub fn spec(&self) -> &'s Spec {
        self.spec
    }

    /// Leftover positional tokens, in input order.
    pub fn positionals(&self) -> impl Iterator<Item = &str> {
        self.positionals.iter().map(String::as_str)
    }

    /// Leftover options: primary name -> raw value (default or supplied).
    pub fn options(&self) -> &IndexMap<String, Option<String>> {
        &self.options
    }

    /// Whether the option was given explicitly on the command line.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(name)
    }

    pub(crate) fn take_option(&mut self, name: &str) -> Option<String> {
        self.options.shift_remove(name).flatten()
    }

    pub(crate) fn take_positional(&mut self) -> Option<String> {
        self.positionals.pop_front()
    }

    pub(crate) fn remaining_positionals(&self) -> usize {
        self.positionals.len()
    }

    pub(crate) fn drain_positionals(&mut self) -> Vec<String> {
        self.positionals.drain(..).collect()
    }

    pub(crate) fn drain_options(&mut self) -> Vec<String> {
        self.options.drain(..).map(|(k, _)| k).collect()
    }
}
