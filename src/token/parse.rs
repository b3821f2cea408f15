//! Tokenizer for raws text.
//!
//! Raws text is a run of `[VALUE:ARG:...]` tokens. Whatever sits between two
//! tokens becomes the prefix of the following token; whatever follows the
//! last token becomes its suffix. Serializing the resulting chain reproduces
//! the input exactly.

use crate::token::chain::{Token, TokenChain};
use crate::token::errors::TokenError;

impl TokenChain {
    /// Tokenize raws text into a chain.
    pub fn parse(text: &str) -> Result<Self, TokenError> {
        let (tokens, trailing) = scan(text)?;
        if tokens.is_empty() {
            let mut chain = TokenChain::new();
            chain.loose_text = trailing;
            return Ok(chain);
        }
        let mut chain = TokenChain::from_tokens(tokens);
        if !trailing.is_empty() {
            if let Some(tail) = chain.tail() {
                if let Some(token) = chain.token_mut(tail) {
                    token.suffix = Some(trailing);
                }
            }
        }
        Ok(chain)
    }
}

/// Tokenize raws text into a flat list of tokens.
///
/// Text after the last token is attached as that token's suffix.
pub fn parse_tokens(text: &str) -> Result<Vec<Token>, TokenError> {
    let (mut tokens, trailing) = scan(text)?;
    if !trailing.is_empty() {
        if let Some(last) = tokens.last_mut() {
            last.suffix = Some(trailing);
        }
    }
    Ok(tokens)
}

/// Parse a pretty pattern such as `CREATURE:DOG` or `[CREATURE:DOG]` into a
/// single token. Surrounding whitespace is ignored.
pub fn parse_singular(pattern: &str) -> Result<Token, TokenError> {
    let trimmed = pattern.trim();
    let wrapped;
    let source = if trimmed.starts_with('[') {
        trimmed
    } else {
        wrapped = format!("[{trimmed}]");
        wrapped.as_str()
    };
    let (mut tokens, _) = scan(source)?;
    if tokens.len() != 1 {
        return Err(TokenError::NotSingular {
            input: pattern.to_string(),
            found: tokens.len(),
        });
    }
    let mut token = tokens.remove(0);
    token.prefix = None;
    token.suffix = None;
    Ok(token)
}

fn scan(text: &str) -> Result<(Vec<Token>, String), TokenError> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut open: Option<usize> = None;

    for (offset, ch) in text.char_indices() {
        match (ch, open) {
            ('[', Some(_)) => return Err(TokenError::NestedOpen { offset }),
            ('[', None) => open = Some(offset),
            (']', Some(start)) => {
                let mut parts = text[start + 1..offset].split(':');
                let value = parts.next().unwrap_or_default();
                if value.is_empty() {
                    return Err(TokenError::EmptyValue { offset: start });
                }
                let prefix = &text[text_start..start];
                tokens.push(Token {
                    value: value.to_string(),
                    args: parts.map(str::to_string).collect(),
                    prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                    suffix: None,
                });
                text_start = offset + 1;
                open = None;
            }
            _ => {}
        }
    }

    if let Some(offset) = open {
        return Err(TokenError::Unterminated { offset });
    }

    Ok((tokens, text[text_start..].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefix_and_suffix() {
        let text = "creature_standard\n\n[OBJECT:CREATURE]\n\t[CREATURE:DOG] comment\n";
        let tokens = parse_tokens(text).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, "OBJECT");
        assert_eq!(tokens[0].args, ["CREATURE"]);
        assert_eq!(tokens[0].prefix.as_deref(), Some("creature_standard\n\n"));
        assert_eq!(tokens[1].prefix.as_deref(), Some("\n\t"));
        assert_eq!(tokens[1].suffix.as_deref(), Some(" comment\n"));
    }

    #[test]
    fn chain_round_trips_exactly() {
        let text = "header\n[A:1:2]\n  [B]x[C::]\r\n";
        let chain = TokenChain::parse(text).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.to_string(), text);
    }

    #[test]
    fn empty_args_are_kept() {
        let token = parse_singular("C::").unwrap();
        assert_eq!(token.args, ["", ""]);
    }

    #[test]
    fn text_without_tokens_round_trips() {
        let chain = TokenChain::parse("just a comment\n").unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.to_string(), "just a comment\n");
    }

    #[test]
    fn unterminated_token_is_an_error() {
        let err = TokenChain::parse("ok [A:B").unwrap_err();
        assert_eq!(err, TokenError::Unterminated { offset: 3 });
    }

    #[test]
    fn nested_open_is_an_error() {
        let err = parse_tokens("[A[B]]").unwrap_err();
        assert_eq!(err, TokenError::NestedOpen { offset: 2 });
    }

    #[test]
    fn singular_accepts_bare_and_bracketed() {
        assert_eq!(parse_singular("CREATURE:DOG").unwrap(), Token::with_args("CREATURE", ["DOG"]));
        assert_eq!(parse_singular(" [NAME:dog:dogs:canine] ").unwrap().nargs(), 3);
    }

    #[test]
    fn singular_rejects_multiple_tokens() {
        let err = parse_singular("[A][B]").unwrap_err();
        assert!(matches!(err, TokenError::NotSingular { found: 2, .. }));
    }
}
