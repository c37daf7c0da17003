//! Helper functions available in every page template.

use minijinja::{Environment, Error, ErrorKind};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but `A-Z a-z 0-9 - _ . ~` is escaped in query components.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Bind all helpers into `env`.
///
/// Unary helpers are also filters, so `{{ name | capitalize }}` works.
pub fn register(env: &mut Environment<'_>) {
    env.add_function("add", add);
    env.add_function("subtract", subtract);
    env.add_function("pluralize", pluralize);
    env.add_function("commaseparate", commaseparate);
    env.add_function("stripscheme", stripscheme);
    env.add_function("capitalize", capitalize);
    env.add_function("queryescape", queryescape);

    env.add_filter("commaseparate", commaseparate);
    env.add_filter("stripscheme", stripscheme);
    env.add_filter("capitalize", capitalize);
    env.add_filter("queryescape", queryescape);
}

pub fn add(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_add(b).ok_or_else(|| overflow("add"))
}

pub fn subtract(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_sub(b).ok_or_else(|| overflow("subtract"))
}

fn overflow(name: &str) -> Error {
    Error::new(ErrorKind::InvalidOperation, format!("{name}: integer overflow"))
}

/// `word` with an `s` appended unless `count` is exactly one.
pub fn pluralize(count: i64, word: &str) -> String {
    if count == 1 {
        word.to_owned()
    } else {
        format!("{word}s")
    }
}

pub fn commaseparate(items: Vec<String>) -> String {
    items.join(", ")
}

/// Drop everything up to and including `://`, if it appears after the first byte.
pub fn stripscheme(url: &str) -> String {
    match url.find("://") {
        Some(i) if i > 0 => url[i + 3..].to_owned(),
        _ => url.to_owned(),
    }
}

/// Title-case every word. Any character other than a letter, digit or
/// apostrophe starts a new word, so `game-of-life` becomes `Game-Of-Life`.
pub fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if !c.is_alphanumeric() && c != '\'' {
            word_start = true;
            out.push(c);
        } else if word_start {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Escape `text` for use inside a query string; spaces become `+`.
pub fn queryescape(text: &str) -> String {
    utf8_percent_encode(text, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}
