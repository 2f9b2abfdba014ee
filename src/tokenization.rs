use crate::{Lex, Log, ParseError, QueryTokenizer};
use once_cell::unsync::OnceCell;
use std::fmt::{Debug, Display, Formatter};
use std::mem;

impl<TToken: Debug> Display for Lex<TToken> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("")
            .field(&self.token)
            .field(&self.start)
            .field(&self.end)
            .finish()
    }
}

impl<TToken> Lex<TToken> {
    pub fn new(token: TToken, start: usize, end: usize) -> Self {
        Self { token, start, end }
    }
}

#[derive(PartialEq, Clone, Copy)]
enum Quote {
    None,
    Single,
    Double,
}

impl QueryTokenizer {
    pub fn new() -> Self {
        Self {
            debug: OnceCell::new(),
        }
    }

    /// Set a log label to debug the tokenizer.
    /// Based on the level of the [Log], lexemes are printed as they are emitted.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Split `query` into lexemes.
    ///
    /// Unquoted spaces separate lexemes. Double quotes honor `\c` escapes, single
    /// quotes take every character literally, and each quote character is literal
    /// inside the other quote kind. Quotes only change how characters are read;
    /// they never open a lexeme of their own, so `pre"mid dle"post` is one lexeme.
    /// Empty accumulators are never emitted.
    pub fn tokenize(&self, query: &str) -> Result<Vec<Lex<String>>, ParseError> {
        #[cfg(debug_assertions)]
        let debug = self.debug.get().map_or(Log::None, |log| *log);

        let mut lexemes: Vec<Lex<String>> = Vec::new();
        let mut chars = query.char_indices();
        let mut quote = Quote::None;
        let mut quote_start = 0;
        let mut accumulator = String::new();
        let mut span_open = false;
        let mut start = 0;

        while let Some((index, ch)) = chars.next() {
            if quote == Quote::None && ch == ' ' {
                if !accumulator.is_empty() {
                    let lex = Lex::new(mem::take(&mut accumulator), start, index);
                    #[cfg(debug_assertions)]
                    if debug.order() >= Log::Verbose(()).order() {
                        println!(
                            "[{}; Lexeme]: {:?} at {}-{}",
                            debug, lex.token, lex.start, lex.end
                        );
                    }
                    lexemes.push(lex);
                }
                span_open = false;
                continue;
            }
            if !span_open {
                span_open = true;
                start = index;
            }
            match quote {
                Quote::None => match ch {
                    '"' => {
                        quote = Quote::Double;
                        quote_start = index;
                    }
                    '\'' => {
                        quote = Quote::Single;
                        quote_start = index;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped)) => accumulator.push(escaped),
                        None => {
                            return Err(ParseError::new(index, "invalid escape".to_string()));
                        }
                    },
                    other => accumulator.push(other),
                },
                Quote::Double => match ch {
                    '"' => quote = Quote::None,
                    '\\' => match chars.next() {
                        Some((_, escaped)) => accumulator.push(escaped),
                        None => {
                            return Err(ParseError::new(index, "invalid escape".to_string()));
                        }
                    },
                    other => accumulator.push(other),
                },
                Quote::Single => match ch {
                    '\'' => quote = Quote::None,
                    other => accumulator.push(other),
                },
            }
        }

        if quote != Quote::None {
            return Err(ParseError::new(quote_start, "unclosed quotes".to_string()));
        }
        if !accumulator.is_empty() {
            let lex = Lex::new(accumulator, start, query.len());
            #[cfg(debug_assertions)]
            if debug.order() >= Log::Verbose(()).order() {
                println!(
                    "[{}; Lexeme]: {:?} at {}-{}",
                    debug, lex.token, lex.start, lex.end
                );
            }
            lexemes.push(lex);
        }

        #[cfg(debug_assertions)]
        if debug.order() >= Log::Success(()).order() {
            println!("[{}; Tokenization success]: {} lexemes", debug, lexemes.len());
        }

        Ok(lexemes)
    }
}

impl Default for QueryTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
