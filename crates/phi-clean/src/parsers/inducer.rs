//! Gene inducer ID parser
//!
//! Values mix chemical names, CHEBI and CAS identifiers, bare numbers and the
//! `anti-infective` label in no fixed notation. The lexer turns a value into
//! [`Token`]s and the serializer writes them back in the canonical form:
//!
//! ```text
//! anti-infective: name, name: CHEBI:1, CAS:1-2-3; name: 42
//! ```

use phi_common::Result;
use regex::Regex;
use std::fmt;

/// A chemical identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChemId {
    Chebi(String),
    Cas(String),
    /// Digits with no namespace
    Bare(String),
}

impl fmt::Display for ChemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChemId::Chebi(id) => write!(f, "CHEBI:{}", id),
            ChemId::Cas(id) => write!(f, "CAS:{}", id),
            ChemId::Bare(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The `anti-infective` group label
    Label,
    Name(String),
    ChemId(ChemId),
}

/// Which kind of token opened the current group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Label,
    Name,
}

pub struct InducerParser {
    lexer: Regex,
}

impl InducerParser {
    pub fn new() -> Result<Self> {
        let lexer = Regex::new(concat!(
            r"(?P<anti_inf>anti-infective)",
            r"|CHEBI:\s*(?P<chebi_id>\d+)\s*",
            r"|(?i:CAS\s*(?::|No[.:])?\s*)?(?P<cas_id>\d+-\d+-\d+)",
            r"|(?P<text>[^\s:(]+|\(.+?\))",
            r"|(?P<colon>:)",
            r"|(?P<whitespace>\s+)",
        ))?;
        Ok(Self { lexer })
    }

    /// Parse and re-serialize one value
    ///
    /// A value that yields no tokens is returned unchanged.
    pub fn parse(&self, value: &str) -> String {
        let tokens = self.lex(value.trim_matches(';'));
        if tokens.is_empty() {
            return value.to_string();
        }
        serialize(&tokens)
    }

    pub fn lex(&self, value: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut name = String::new();

        for caps in self.lexer.captures_iter(value) {
            if caps.name("whitespace").is_some() {
                if !name.is_empty() {
                    name.push(' ');
                }
                continue;
            }

            let Some(text) = caps.name("text") else {
                // every other alternative, a bare colon included, ends a pending name
                flush_name(&mut name, &mut tokens);
                if caps.name("anti_inf").is_some() {
                    tokens.push(Token::Label);
                } else if let Some(id) = caps.name("chebi_id") {
                    tokens.push(Token::ChemId(ChemId::Chebi(id.as_str().to_string())));
                } else if let Some(id) = caps.name("cas_id") {
                    tokens.push(Token::ChemId(ChemId::Cas(id.as_str().to_string())));
                }
                continue;
            };

            let text = text.as_str();
            let (body, separated) = match text.strip_suffix([';', ',']) {
                Some(body) => (body, true),
                None => (text, false),
            };
            if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
                flush_name(&mut name, &mut tokens);
                tokens.push(Token::ChemId(ChemId::Bare(body.to_string())));
            } else {
                name.push_str(body);
                if separated {
                    flush_name(&mut name, &mut tokens);
                }
            }
        }

        flush_name(&mut name, &mut tokens);
        tokens
    }
}

fn flush_name(name: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = name.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Name(trimmed.to_string()));
    }
    name.clear();
}

/// Write tokens in canonical form
pub fn serialize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    let mut context: Option<Context> = None;

    for token in tokens {
        let separator = match (token, previous) {
            (_, None) => "",
            (Token::Label, Some(_)) => "; ",
            (Token::Name(_), Some(Token::Name(_))) => ", ",
            (Token::Name(_), Some(Token::Label)) => ": ",
            (Token::Name(_), Some(Token::ChemId(_))) => {
                if context.is_some() {
                    "; "
                } else {
                    ", "
                }
            }
            (Token::ChemId(_), Some(Token::Name(_) | Token::Label)) => ": ",
            (Token::ChemId(_), Some(Token::ChemId(_))) => {
                if context.is_some() {
                    ", "
                } else {
                    "; "
                }
            }
        };
        out.push_str(separator);

        match token {
            Token::Label => {
                out.push_str("anti-infective");
                context = Some(Context::Label);
            }
            Token::Name(name) => {
                out.push_str(name);
                context = Some(Context::Name);
            }
            Token::ChemId(id) => out.push_str(&id.to_string()),
        }
        previous = Some(token);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(value: &str) -> String {
        InducerParser::new().unwrap().parse(value)
    }

    #[test]
    fn test_id_then_name() {
        assert_eq!(parse("CHEBI: 3392 congo red"), "CHEBI:3392, congo red");
    }

    #[test]
    fn test_name_then_id() {
        assert_eq!(parse("congo red CHEBI:3392"), "congo red: CHEBI:3392");
    }

    #[test]
    fn test_lex_tokens() {
        let parser = InducerParser::new().unwrap();
        assert_eq!(
            parser.lex("CHEBI: 3392 congo red"),
            vec![
                Token::ChemId(ChemId::Chebi("3392".to_string())),
                Token::Name("congo red".to_string()),
            ]
        );
    }

    #[test]
    fn test_labelled_groups() {
        assert_eq!(
            parse("carbendazim: CHEBI:3392; thiabendazole: CHEBI:45979;"),
            "carbendazim: CHEBI:3392; thiabendazole: CHEBI:45979"
        );
    }

    #[test]
    fn test_cas_prefixes() {
        assert_eq!(parse("CAS No. 10605-21-7"), "CAS:10605-21-7");
        assert_eq!(parse("cas: 10605-21-7"), "CAS:10605-21-7");
        assert_eq!(parse("benomyl 17804-35-2"), "benomyl: CAS:17804-35-2");
    }

    #[test]
    fn test_id_lists() {
        assert_eq!(parse("CHEBI:1, CHEBI:2"), "CHEBI:1; CHEBI:2");
        assert_eq!(parse("sorbitol: CHEBI:1, 42"), "sorbitol: CHEBI:1, 42");
    }

    #[test]
    fn test_bare_id_list() {
        assert_eq!(parse("sorbitol: 1, 2"), "sorbitol: 1, 2");
        assert_eq!(parse("sorbitol 42; mannitol 7"), "sorbitol: 42; mannitol: 7");
        assert_eq!(parse("CHEBI:1, 42, 43"), "CHEBI:1; 42; 43");
    }

    #[test]
    fn test_colon_ends_name() {
        let parser = InducerParser::new().unwrap();
        assert_eq!(
            parser.lex("congo red: 3392"),
            vec![
                Token::Name("congo red".to_string()),
                Token::ChemId(ChemId::Bare("3392".to_string())),
            ]
        );
    }

    #[test]
    fn test_name_lists() {
        assert_eq!(parse("sorbitol, (+)-catechin"), "sorbitol, (+)-catechin");
        assert_eq!(parse("calcofluor white"), "calcofluor white");
    }

    #[test]
    fn test_anti_infective_label() {
        assert_eq!(
            parse("anti-infective benomyl CHEBI:3015"),
            "anti-infective: benomyl: CHEBI:3015"
        );
        assert_eq!(
            parse("anti-infective: A: 1; anti-infective: B: 2"),
            "anti-infective: A: 1; anti-infective: B: 2"
        );
    }

    #[test]
    fn test_parse_is_stable() {
        for value in [
            "CHEBI:3392, congo red",
            "carbendazim: CHEBI:3392; thiabendazole: CHEBI:45979",
            "anti-infective: benomyl: CHEBI:3015",
            "anti-infective: A: 1; anti-infective: B: 2",
            "sorbitol: 42, 43",
            "CHEBI:1; 42; 43",
        ] {
            assert_eq!(parse(value), value);
        }
    }

    #[test]
    fn test_no_tokens_keeps_value() {
        assert_eq!(parse(";"), ";");
        assert_eq!(parse(""), "");
    }
}
