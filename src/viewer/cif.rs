//! Category tables of a CIF data block.
//!
//! `pdbtbx` keeps only the categories it models, so the partial-charge
//! categories are read here. Tokens are recognized with `nom`; `loop_`
//! tables, single items, quoted values, `#` comments and `;` text fields are
//! supported. Save frames are not; mmCIF does not use them.

use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_until};
use nom::character::complete::{
    char, line_ending, not_line_ending, one_of, space1,
};
use nom::combinator::{map, not, value};
use nom::error::{Error, ErrorKind};
use nom::multi::many0_count;
use nom::sequence::{delimited, pair, terminated};
use nom::IResult;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `data_<name>`.
    Data,
    /// `loop_`.
    Loop,
    /// `_category.field`.
    Tag(&'a str),
    /// Bare, quoted or text-field value.
    Value(&'a str),
}

/// All fields of one category, column-major by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Table {
    fields: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of rows.
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of one field, or `None` if the field is absent.
    pub(crate) fn column(
        &self,
        field: &str,
    ) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.fields.iter().position(|f| f == field)?;
        Some(
            self.rows
                .iter()
                .filter_map(move |row| row.get(idx).map(String::as_str)),
        )
    }
}

/// Parsed data block: category name (without leading `_`) → table.
#[derive(Debug, Clone, Default)]
pub(crate) struct CifBlock {
    tables: FxHashMap<String, Table>,
}

impl CifBlock {
    /// Parse the first data block of a CIF document. Reading stops at the
    /// next `data_` header or at a token that cannot be read.
    pub(crate) fn parse(text: &str) -> Self {
        let tokens = tokenize(text);
        let start = usize::from(tokens.first() == Some(&Token::Data));
        let end = tokens[start..]
            .iter()
            .position(|t| *t == Token::Data)
            .map_or(tokens.len(), |i| start + i);
        let tokens = &tokens[start..end];

        let mut block = Self::default();
        let mut i = 0;
        while let Some(token) = tokens.get(i) {
            i = match *token {
                Token::Loop => block.read_loop(tokens, i + 1),
                Token::Tag(tag) => match tokens.get(i + 1) {
                    Some(Token::Value(value)) => {
                        block.push_item(tag, value);
                        i + 2
                    }
                    _ => i + 1,
                },
                Token::Data | Token::Value(_) => i + 1,
            };
        }
        block
    }

    /// Table for a category such as `"atom_site"`.
    pub(crate) fn table(&self, category: &str) -> Option<&Table> {
        self.tables.get(category)
    }

    /// Whether a category is present at all.
    pub(crate) fn has(&self, category: &str) -> bool {
        self.tables.contains_key(category)
    }

    fn read_loop(&mut self, tokens: &[Token<'_>], mut i: usize) -> usize {
        let mut category = None;
        let mut fields = Vec::new();
        while let Some(Token::Tag(tag)) = tokens.get(i) {
            let (cat, field) = split_tag(tag);
            let _ = category.get_or_insert(cat);
            fields.push(field.to_owned());
            i += 1;
        }
        let mut values = Vec::new();
        while let Some(Token::Value(value)) = tokens.get(i) {
            values.push((*value).to_owned());
            i += 1;
        }
        let Some(category) = category else {
            return i;
        };
        let rows = values
            .chunks_exact(fields.len())
            .map(<[String]>::to_vec)
            .collect();
        let _ = self
            .tables
            .insert(category.to_owned(), Table { fields, rows });
        i
    }

    fn push_item(&mut self, tag: &str, value: &str) {
        let (category, field) = split_tag(tag);
        let table = self.tables.entry(category.to_owned()).or_default();
        table.fields.push(field.to_owned());
        match table.rows.first_mut() {
            Some(row) => row.push(value.to_owned()),
            None => table.rows.push(vec![value.to_owned()]),
        }
    }
}

/// `_cat.field` → (`cat`, `field`).
fn split_tag(tag: &str) -> (&str, &str) {
    let tag = tag.trim_start_matches('_');
    tag.split_once('.').unwrap_or((tag, ""))
}

// ── Tokens ───────────────────────────────────────────────────────────────

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Ok((after, ())) = blank(rest) {
        if after.is_empty() {
            break;
        }
        match token(after) {
            Ok((next, tok)) => {
                tokens.push(tok);
                rest = next;
            }
            Err(_) => break,
        }
    }
    tokens
}

/// Spaces, comments and line breaks. A line break that opens a text field
/// is left for [`text_field`].
fn blank(i: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            value((), space1),
            value((), pair(char('#'), not_line_ending)),
            value((), terminated(line_ending, not(char(';')))),
        ))),
    )(i)
}

fn token(i: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(text_field, Token::Value),
        map(quoted, Token::Value),
        map(take_till1(char::is_whitespace), classify),
    ))(i)
}

/// `;`-delimited multi-line value.
fn text_field(i: &str) -> IResult<&str, &str> {
    map(
        delimited(
            pair(line_ending, char(';')),
            take_until("\n;"),
            pair(line_ending, char(';')),
        ),
        str::trim,
    )(i)
}

/// Single- or double-quoted value. The quote only closes when followed by
/// whitespace, so `'O5'B'` reads as `O5'B`.
fn quoted(i: &str) -> IResult<&str, &str> {
    let (body, quote) = one_of("'\"")(i)?;
    let mut offset = 0;
    while let Some(pos) = body[offset..].find(quote) {
        let close = offset + pos;
        let after = &body[close + 1..];
        if after.chars().next().map_or(true, char::is_whitespace) {
            let inner = &body[..close];
            if inner.contains('\n') {
                break;
            }
            return Ok((after, inner));
        }
        offset = close + 1;
    }
    Err(nom::Err::Error(Error::new(i, ErrorKind::Char)))
}

fn classify(word: &str) -> Token<'_> {
    if word.starts_with('_') {
        Token::Tag(word)
    } else if word.eq_ignore_ascii_case("loop_") {
        Token::Loop
    } else if word
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("data_"))
    {
        Token::Data
    } else {
        Token::Value(word)
    }
}
