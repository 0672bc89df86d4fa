//! Compound CSS selector parsing and matching.
//!
//! Only the subset demo scripts use is supported: an optional tag or `*`,
//! followed by any mix of `#id`, `.class`, and attribute tests (`[name]`,
//! `[name="v"]`, `[name^="v"]`, `[name$="v"]`, `[name*="v"]`). Combinators and
//! selector lists are rejected.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("unexpected '{ch}' at offset {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("expected a name at offset {position}")]
    MissingName { position: usize },
    #[error("attribute test starting at offset {position} is not closed")]
    UnterminatedAttribute { position: usize },
    #[error("quoted value starting at offset {position} is not closed")]
    UnterminatedString { position: usize },
    #[error("combinators and selector lists are unsupported ('{ch}' at offset {position})")]
    UnsupportedCombinator { ch: char, position: usize },
}

/// Element view a [`Selector`] is matched against.
pub trait SelectorSubject {
    /// Lowercase tag name.
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    Equals,
    Prefix,
    Suffix,
    Contains,
}

impl AttributeOperator {
    fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Prefix => actual.starts_with(expected),
            Self::Suffix => actual.ends_with(expected),
            Self::Contains => actual.contains(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Id(String),
    Class(String),
    Attribute {
        name: String,
        test: Option<(AttributeOperator, String)>,
    },
}

impl SimpleSelector {
    fn matches(&self, subject: &impl SelectorSubject) -> bool {
        match self {
            Self::Tag(tag) => subject.tag() == tag,
            Self::Id(id) => subject.attribute("id") == Some(id.as_str()),
            Self::Class(class) => subject.has_class(class),
            Self::Attribute { name, test } => match (subject.attribute(name), test) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((operator, expected))) => operator.test(actual, expected),
            },
        }
    }
}

/// Parsed compound selector. `*` alone parses to an empty selector that
/// matches every element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    parts: Vec<SimpleSelector>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        input.parse()
    }

    pub fn parts(&self) -> &[SimpleSelector] {
        &self.parts
    }

    pub fn matches(&self, subject: &impl SelectorSubject) -> bool {
        self.parts.iter().all(|part| part.matches(subject))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut cursor = Cursor {
            chars: source.char_indices().peekable(),
        };
        let mut parts = Vec::new();
        let mut leading = true;

        while let Some((position, ch)) = cursor.peek() {
            match ch {
                '#' => {
                    cursor.bump();
                    parts.push(SimpleSelector::Id(cursor.identifier(position + 1)?));
                }
                '.' => {
                    cursor.bump();
                    parts.push(SimpleSelector::Class(cursor.identifier(position + 1)?));
                }
                '[' => {
                    cursor.bump();
                    parts.push(cursor.attribute(position)?);
                }
                '*' if leading => {
                    cursor.bump();
                }
                ch if leading && is_name_char(ch) => {
                    parts.push(SimpleSelector::Tag(cursor.identifier(position)?.to_ascii_lowercase()));
                }
                ch if ch.is_whitespace() || matches!(ch, '>' | '+' | '~' | ',') => {
                    return Err(SelectorError::UnsupportedCombinator { ch, position });
                }
                ch => return Err(SelectorError::UnexpectedChar { ch, position }),
            }
            leading = false;
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Cursor<'_> {
    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, ch)) if ch.is_whitespace()) {
            self.bump();
        }
    }

    fn identifier(&mut self, position: usize) -> Result<String, SelectorError> {
        let mut name = String::new();
        while let Some((_, ch)) = self.peek() {
            if !is_name_char(ch) {
                break;
            }
            name.push(ch);
            self.bump();
        }
        if name.is_empty() {
            return Err(SelectorError::MissingName { position });
        }
        Ok(name)
    }

    /// Parses the remainder of `[...]`; the opening bracket at `start` is consumed.
    fn attribute(&mut self, start: usize) -> Result<SimpleSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.identifier(start + 1)?;
        self.skip_whitespace();

        let operator = match self.bump() {
            Some((_, ']')) => return Ok(SimpleSelector::Attribute { name, test: None }),
            Some((_, '=')) => AttributeOperator::Equals,
            Some((_, prefix @ ('^' | '$' | '*'))) => {
                match self.bump() {
                    Some((_, '=')) => {}
                    Some((position, ch)) => return Err(SelectorError::UnexpectedChar { ch, position }),
                    None => return Err(SelectorError::UnterminatedAttribute { position: start }),
                }
                match prefix {
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Contains,
                }
            }
            Some((position, ch)) => return Err(SelectorError::UnexpectedChar { ch, position }),
            None => return Err(SelectorError::UnterminatedAttribute { position: start }),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some((position, quote @ ('"' | '\''))) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err(SelectorError::UnterminatedString { position }),
                    }
                }
                value
            }
            Some((position, _)) => self.identifier(position)?,
            None => return Err(SelectorError::UnterminatedAttribute { position: start }),
        };

        self.skip_whitespace();
        match self.bump() {
            Some((_, ']')) => Ok(SimpleSelector::Attribute {
                name,
                test: Some((operator, value)),
            }),
            Some((position, ch)) => Err(SelectorError::UnexpectedChar { ch, position }),
            None => Err(SelectorError::UnterminatedAttribute { position: start }),
        }
    }
}
