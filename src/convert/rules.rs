//! The individual wiki-to-Markdown rewrite rules.
//!
//! Each rule is a pure function of its input text (and, for the revision
//! rules, the revision map). A rule that finds nothing to rewrite returns
//! the input borrowed.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::revmap::RevisionMap;

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\{\{\{(?:#!([\w+-]+))?|\}\}\}"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\[(https?://[^\s\]]+)[ \t]+([^\]]*?)\]"));
static ITALIC_TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)<i>(.*?)</i>"));
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\A\s*(={1,3})[ \t]+"));
static REVISION_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\br(\d+)\b"));
static CHANGESET_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\[changeset:"(\d+)"[ \t]+(\d+)\]"#));
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\[\[br\]\]|\\\\"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
}

/// One step of the conversion chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `'''bold'''` becomes `**bold**`.
    Bold,
    /// `''italic''` becomes `*italic*`. Runs after [`Rule::Bold`].
    Italic,
    /// `{{{` / `}}}` become fences; `{{{#!lang` keeps the language tag.
    CodeFence,
    /// Carriage returns are dropped.
    CarriageReturn,
    /// `[http://url label]` becomes `[label](http://url)`.
    BracketLink,
    /// `<i>text</i>` (any case) becomes `*text*`.
    ItalicTag,
    /// A leading `=`, `==` or `===` heading marker becomes `#`, `##` or `###`.
    Heading,
    /// Leading and trailing whitespace is trimmed.
    Trim,
    /// Standalone `r1234` tokens become the mapped identifier.
    Revision,
    /// `[changeset:"1234" 1234]` becomes the mapped identifier.
    Changeset,
    /// `[[BR]]` and `\\` become newlines.
    LineBreak,
}

impl Rule {
    /// Every rule, in the order the converter applies them.
    pub const ALL: [Rule; 11] = [
        Rule::Bold,
        Rule::Italic,
        Rule::CodeFence,
        Rule::CarriageReturn,
        Rule::BracketLink,
        Rule::ItalicTag,
        Rule::Heading,
        Rule::Trim,
        Rule::Revision,
        Rule::Changeset,
        Rule::LineBreak,
    ];

    /// Short name used in debug logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rule::Bold => "bold",
            Rule::Italic => "italic",
            Rule::CodeFence => "code-fence",
            Rule::CarriageReturn => "carriage-return",
            Rule::BracketLink => "bracket-link",
            Rule::ItalicTag => "italic-tag",
            Rule::Heading => "heading",
            Rule::Trim => "trim",
            Rule::Revision => "revision",
            Rule::Changeset => "changeset",
            Rule::LineBreak => "line-break",
        }
    }

    /// Applies this rule to `text`.
    #[must_use]
    pub fn apply<'t>(self, text: &'t str, revisions: &RevisionMap) -> Cow<'t, str> {
        match self {
            Rule::Bold => replace_literal(text, "'''", "**"),
            Rule::Italic => replace_literal(text, "''", "*"),
            Rule::CodeFence => CODE_FENCE_RE.replace_all(text, |caps: &Captures<'_>| {
                format!("```{}", caps.get(1).map_or("", |m| m.as_str()))
            }),
            Rule::CarriageReturn => replace_literal(text, "\r", ""),
            Rule::BracketLink => LINK_RE.replace_all(text, "[$2]($1)"),
            Rule::ItalicTag => ITALIC_TAG_RE.replace_all(text, "*$1*"),
            Rule::Heading => HEADING_RE.replace(text, |caps: &Captures<'_>| {
                format!("{} ", "#".repeat(caps[1].len()))
            }),
            Rule::Trim => {
                let trimmed = text.trim();
                Cow::Borrowed(trimmed)
            }
            Rule::Revision => REVISION_RE.replace_all(text, |caps: &Captures<'_>| {
                revisions.lookup(&caps[1]).unwrap_or(&caps[0]).to_string()
            }),
            Rule::Changeset => CHANGESET_RE.replace_all(text, |caps: &Captures<'_>| {
                let mapped = if caps[1] == caps[2] { revisions.lookup(&caps[1]) } else { None };
                mapped.unwrap_or(&caps[0]).to_string()
            }),
            Rule::LineBreak => match LINE_BREAK_RE.replace_all(text, "\n") {
                // a break at either edge can expose whitespace or a heading marker
                Cow::Owned(replaced) => {
                    Cow::Owned(Rule::Heading.apply(replaced.trim(), revisions).into_owned())
                }
                Cow::Borrowed(unchanged) => Cow::Borrowed(unchanged),
            },
        }
    }
}

fn replace_literal<'t>(text: &'t str, from: &str, to: &str) -> Cow<'t, str> {
    if text.contains(from) {
        Cow::Owned(text.replace(from, to))
    } else {
        Cow::Borrowed(text)
    }
}
