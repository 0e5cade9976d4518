//! Rename pattern templates.
//!
//! A media directory has one pattern, used both to name files and to
//! reverse-parse names that already follow it. Placeholders:
//!
//! | Token | Meaning      |
//! |-------|--------------|
//! | `%n`  | show name    |
//! | `%t`  | title        |
//! | `%s`  | season       |
//! | `%e`  | episode      |
//! | `%y`  | year         |
//! | `%p`  | part         |
//! | `%x`  | extension    |
//! | `%h`  | provider id  |
//! | `%%`  | literal `%`  |
//!
//! Text inside `{...}` is optional: it is rendered only when every token in it
//! has a value, and it may be absent when matching.

use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// A placeholder of a rename pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    ShowName,
    Title,
    Season,
    Episode,
    Year,
    Part,
    Extension,
    Id,
}

impl Token {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Token::ShowName),
            't' => Some(Token::Title),
            's' => Some(Token::Season),
            'e' => Some(Token::Episode),
            'y' => Some(Token::Year),
            'p' => Some(Token::Part),
            'x' => Some(Token::Extension),
            'h' => Some(Token::Id),
            _ => None,
        }
    }

    /// Whether the token only ever holds digits.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Token::Season | Token::Episode | Token::Year | Token::Part
        )
    }

    fn regex(&self) -> &'static str {
        match self {
            Token::Season | Token::Episode | Token::Year | Token::Part => r"(\d+)",
            Token::Extension => r"([^./]+)",
            _ => r"([^/]+?)",
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Token::ShowName => "show name",
            Token::Title => "title",
            Token::Season => "season",
            Token::Episode => "episode",
            Token::Year => "year",
            Token::Part => "part",
            Token::Extension => "extension",
            Token::Id => "id",
        };
        write!(f, "{}", name)
    }
}

/// Values of the tokens of a pattern.
pub type TokenValues = BTreeMap<Token, String>;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Token(Token),
    Optional(Vec<Segment>),
}

/// A compiled rename pattern.
#[derive(Debug, Clone)]
pub struct PatternTemplate {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
    groups: Vec<Token>,
}

impl PatternTemplate {
    /// Parse and compile a pattern.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut optional: Option<Vec<Segment>> = None;
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    let next = chars
                        .next()
                        .ok_or_else(|| Error::pattern(template, "trailing '%'"))?;
                    if next == '%' {
                        literal.push('%');
                        continue;
                    }
                    let token = Token::from_char(next).ok_or_else(|| {
                        Error::pattern(template, format!("unknown token '%{}'", next))
                    })?;
                    let target = optional.as_mut().unwrap_or(&mut segments);
                    flush_literal(&mut literal, target);
                    target.push(Segment::Token(token));
                }
                '{' => {
                    if optional.is_some() {
                        return Err(Error::pattern(template, "nested optional groups"));
                    }
                    flush_literal(&mut literal, &mut segments);
                    optional = Some(Vec::new());
                }
                '}' => {
                    let mut group = optional
                        .take()
                        .ok_or_else(|| Error::pattern(template, "unbalanced '}'"))?;
                    flush_literal(&mut literal, &mut group);
                    segments.push(Segment::Optional(group));
                }
                _ => literal.push(c),
            }
        }

        if optional.is_some() {
            return Err(Error::pattern(template, "unclosed '{'"));
        }
        flush_literal(&mut literal, &mut segments);

        let mut groups = Vec::new();
        let mut expr = String::from("^");
        build_regex(&segments, &mut expr, &mut groups);
        expr.push('$');

        if groups.is_empty() {
            return Err(Error::pattern(template, "no placeholders"));
        }

        let regex = Regex::new(&expr).map_err(|e| Error::pattern(template, e.to_string()))?;

        Ok(Self {
            source: template.to_string(),
            segments,
            regex,
            groups,
        })
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of token placeholders (`%%` excluded).
    pub fn placeholder_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether the pattern uses the token.
    pub fn contains(&self, token: Token) -> bool {
        self.groups.contains(&token)
    }

    /// Reverse-parse a path relative to the media directory root.
    ///
    /// Returns `None` when the path does not follow the pattern.
    pub fn match_path(&self, relative: &Path) -> Option<TokenValues> {
        let path = relative.to_string_lossy().replace('\\', "/");
        self.match_str(&path)
    }

    /// Reverse-parse a `/`-separated relative path.
    pub fn match_str(&self, path: &str) -> Option<TokenValues> {
        let caps = self.regex.captures(path)?;
        let mut values = TokenValues::new();
        for (i, token) in self.groups.iter().enumerate() {
            if let Some(m) = caps.get(i + 1) {
                values.entry(*token).or_insert_with(|| m.as_str().to_string());
            }
        }
        Some(values)
    }

    /// Render the pattern with the given values.
    ///
    /// Optional groups are dropped unless all of their tokens have a value.
    pub fn render(&self, values: &TokenValues) -> String {
        let mut out = String::new();
        render_segments(&self.segments, values, &mut out);
        out
    }
}

impl std::fmt::Display for PatternTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn flush_literal(literal: &mut String, target: &mut Vec<Segment>) {
    if !literal.is_empty() {
        target.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn build_regex(segments: &[Segment], expr: &mut String, groups: &mut Vec<Token>) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => expr.push_str(&regex::escape(text)),
            Segment::Token(token) => {
                expr.push_str(token.regex());
                groups.push(*token);
            }
            Segment::Optional(inner) => {
                // Lazy: prefer leaving optional tokens empty.
                expr.push_str("(?:");
                build_regex(inner, expr, groups);
                expr.push_str(")??");
            }
        }
    }
}

fn render_segments(segments: &[Segment], values: &TokenValues, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(token) => {
                if let Some(value) = values.get(token) {
                    out.push_str(value);
                }
            }
            Segment::Optional(inner) => {
                let complete = inner.iter().all(|s| match s {
                    Segment::Token(token) => values.get(token).is_some_and(|v| !v.is_empty()),
                    _ => true,
                });
                if complete {
                    render_segments(inner, values, out);
                }
            }
        }
    }
}

/// Read a numeric token value.
pub fn number(values: &TokenValues, token: Token) -> Option<u32> {
    values.get(&token).and_then(|v| v.parse().ok())
}
