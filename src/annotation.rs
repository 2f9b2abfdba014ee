use crate::{Annotator, Lex, Opts, QueryAtom, QueryOp, QueryToken};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

// The key character class is [-a-z0-5]+, digits 0 through 5 only. The range is
// preserved verbatim from the historical grammar even though it reads like a
// typo for 0-9; lexemes such as `baz6:qux` therefore annotate as whole-lexeme
// keys with an empty value.
static ATOM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([-a-z0-5]+)(?:\[([^\]]*)\])?:(.*)$").expect("atom pattern is a valid regex")
});

impl Annotator {
    pub fn new() -> Self {
        Annotator
    }

    /// Tag every lexeme as an operator symbol, a parenthesis or an atom.
    ///
    /// Annotation is total: a lexeme that is neither an operator word nor a
    /// `key:value` pair becomes an atom whose key is the whole lexeme.
    pub fn annotate(&self, lexemes: Vec<Lex<String>>) -> Vec<Lex<QueryToken>> {
        lexemes
            .into_iter()
            .map(|lex| Lex::new(Self::classify(&lex.token), lex.start, lex.end))
            .collect()
    }

    fn classify(lexeme: &str) -> QueryToken {
        match lexeme {
            "(" => QueryToken::OpenParen,
            ")" => QueryToken::CloseParen,
            _ => match QueryOp::from_symbol(lexeme) {
                Some(op) => QueryToken::Operator(op),
                None => QueryToken::Atom(QueryAtom::parse(lexeme)),
            },
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAtom {
    /// Split a lexeme into key, bracketed options and value.
    pub fn parse(lexeme: &str) -> QueryAtom {
        match ATOM_PATTERN.captures(lexeme) {
            Some(captures) => QueryAtom {
                key: captures[1].to_string(),
                opts: captures
                    .get(2)
                    .map(|group| Opts::parse(group.as_str()))
                    .unwrap_or_default(),
                value: captures[3].to_string(),
            },
            None => QueryAtom {
                key: lexeme.to_string(),
                value: String::new(),
                opts: Opts::default(),
            },
        }
    }

    pub fn new(key: &str, value: &str) -> QueryAtom {
        QueryAtom {
            key: key.to_string(),
            value: value.to_string(),
            opts: Opts::default(),
        }
    }
}

impl Display for QueryAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}:{}", self.key, self.value)
        }
    }
}

impl Opts {
    /// Parse bracket contents: parts split on `,`, each part on the first `=`.
    /// A part without `=` is a boolean flag; empty parts are skipped.
    pub fn parse(text: &str) -> Opts {
        let mut entries = HashMap::new();
        for part in text.split(',') {
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((name, value)) => entries.insert(name.to_string(), Some(value.to_string())),
                None => entries.insert(part.to_string(), None),
            };
        }
        Opts { entries }
    }

    /// Whether the option is present, as a flag or with a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Value of a `name=value` option; `None` for flags and absent options.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|value| value.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
