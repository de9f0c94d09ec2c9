//! Word splitting and casing of identifiers.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// How a single word is capitalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capitalization {
    /// `word`
    Lower,
    /// `Word`, or `WORD` for an initialism.
    Title,
    /// `WORD`
    Upper,
}

/// A casing convention: capitalization of the first and remaining words,
/// joined by a delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Case {
    pub first: Capitalization,
    pub rest: Capitalization,
    pub delimiter: &'static str,
}

impl Case {
    pub const PASCAL: Self = Self {
        first: Capitalization::Title,
        rest: Capitalization::Title,
        delimiter: "",
    };

    pub const CAMEL: Self = Self {
        first: Capitalization::Lower,
        rest: Capitalization::Title,
        delimiter: "",
    };

    pub const SNAKE: Self = Self {
        first: Capitalization::Lower,
        rest: Capitalization::Lower,
        delimiter: "_",
    };

    pub const SCREAMING_SNAKE: Self = Self {
        first: Capitalization::Upper,
        rest: Capitalization::Upper,
        delimiter: "_",
    };

    /// Joins `words` in this case. A word equal to one of `initialisms`
    /// (ignoring ASCII case) is fully upper-cased wherever this case would
    /// title-case it.
    #[must_use]
    pub fn apply(self, words: &[String], initialisms: &[&str]) -> String {
        words
            .iter()
            .enumerate()
            .map(|(index, word)| {
                let capitalization: Capitalization = if index == 0 {
                    self.first
                } else {
                    self.rest
                };
                let is_initialism: bool = initialisms
                    .iter()
                    .any(|initialism| initialism.eq_ignore_ascii_case(word));
                capitalize(word, capitalization, is_initialism)
            })
            .collect::<Vec<String>>()
            .join(self.delimiter)
    }
}

fn capitalize(word: &str, capitalization: Capitalization, is_initialism: bool) -> String {
    match capitalization {
        Capitalization::Lower => word.to_ascii_lowercase(),
        Capitalization::Upper => word.to_ascii_uppercase(),
        Capitalization::Title if is_initialism => word.to_ascii_uppercase(),
        Capitalization::Title => word.to_upper_camel_case(),
    }
}

/// Splits raw text into lowercase ASCII words.
///
/// Word boundaries are any non-alphanumeric character, a lower-to-upper
/// transition (`fooBar`) and the end of an upper-case run followed by a
/// lowercase letter (`HTTPServer`). Non-ASCII characters are dropped.
#[must_use]
pub fn split_words(raw: &str) -> Vec<String> {
    raw.to_snake_case()
        .split('_')
        .map(|word| word.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect()
}
