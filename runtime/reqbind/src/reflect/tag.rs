//! The grammar of parameter binding tags.
//!
//! A tag is a comma-separated list of tokens, e.g. `"id,optional,desc=The todo identifier"`:
//!
//! - the first bare token (no `=`) is the lookup alias. It may be left empty to keep the
//!   field name as alias, e.g. `",optional"`;
//! - `optional` and `required` set the optionality. Parameters are required by default;
//! - `alias=<name>` sets the alias explicitly, overriding the bare one;
//! - `desc=<text>` documents the parameter. It has no runtime effect.
//!
//! Tokens are trimmed before being interpreted. An empty tag selects all defaults.

/// The outcome of parsing a binding tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamTag {
    /// The lookup alias, if the tag sets one.
    pub alias: Option<String>,
    /// `Some(true)` for `optional`, `Some(false)` for `required`, `None` if unspecified.
    pub optional: Option<bool>,
    /// The human-readable description, if the tag sets one.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
/// A problem with a single token of a binding tag.
pub enum TagError {
    #[error("`{token}` is malformed: {reason}")]
    MalformedToken { token: String, reason: &'static str },
    #[error("`{key}` is not a known modifier. Expected one of `optional`, `required`, `alias` or `desc`")]
    UnknownModifier { key: String },
    #[error("`{modifier}` conflicts with a modifier set earlier in the same tag")]
    ConflictingModifier { modifier: String },
}

/// Parse a binding tag.
///
/// All the problems in the tag are reported, not just the first one.
pub fn parse(tag: &str) -> Result<ParamTag, Vec<TagError>> {
    let mut parsed = ParamTag::default();
    let mut errors = Vec::new();
    if tag.trim().is_empty() {
        return Ok(parsed);
    }

    let mut bare_alias_seen = false;
    let mut explicit_alias = false;
    for (i, raw) in tag.split(',').enumerate() {
        let token = raw.trim();
        match token {
            "optional" | "required" => {
                let optional = token == "optional";
                match parsed.optional {
                    Some(previous) if previous != optional => {
                        errors.push(TagError::ConflictingModifier {
                            modifier: token.to_owned(),
                        });
                    }
                    _ => parsed.optional = Some(optional),
                }
            }
            "" if i == 0 => {
                bare_alias_seen = true;
            }
            "" => errors.push(TagError::MalformedToken {
                token: token.to_owned(),
                reason: "empty token",
            }),
            _ => match token.split_once('=') {
                None => {
                    if bare_alias_seen || explicit_alias {
                        errors.push(TagError::MalformedToken {
                            token: token.to_owned(),
                            reason: "only the first bare token is used as alias, expected `key=value`",
                        });
                        continue;
                    }
                    bare_alias_seen = true;
                    parsed.alias = Some(token.to_owned());
                }
                Some((key, value)) => {
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() || value.is_empty() {
                        errors.push(TagError::MalformedToken {
                            token: token.to_owned(),
                            reason: "expected `key=value`",
                        });
                        continue;
                    }
                    match key {
                        "alias" => {
                            if explicit_alias {
                                errors.push(TagError::ConflictingModifier {
                                    modifier: key.to_owned(),
                                });
                                continue;
                            }
                            explicit_alias = true;
                            parsed.alias = Some(value.to_owned());
                        }
                        "desc" => {
                            if parsed.description.is_some() {
                                errors.push(TagError::ConflictingModifier {
                                    modifier: key.to_owned(),
                                });
                                continue;
                            }
                            parsed.description = Some(value.to_owned());
                        }
                        _ => errors.push(TagError::UnknownModifier {
                            key: key.to_owned(),
                        }),
                    }
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}
