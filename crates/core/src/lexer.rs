use crate::error::ScpError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Any unquoted run of non-space characters (identifiers, keywords,
    /// attribute names, punctuation-joined list literals alike)
    Word(String),
    /// Quoted string literal (content without quotes, captured verbatim)
    Str(String),
    /// Statement terminator `;`
    Semi,
}

impl Token {
    /// The textual content of a token, for value concatenation.
    pub fn text(&self) -> &str {
        match self {
            Token::Word(w) => w,
            Token::Str(s) => s,
            Token::Semi => ";",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// Tokenize preprocessed scp source.
///
/// Tabs and newlines count as spaces; a space flushes the pending word,
/// `;` flushes it and is emitted as its own token, and `"` opens a verbatim
/// string run ending at the next `"`. There is no escape handling inside
/// strings. Running off the end of the input inside a string is a fatal
/// tokenize error.
pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, ScpError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut buf = String::new();
    let mut buf_line: u32 = 1;

    let flush = |buf: &mut String, buf_line: u32, tokens: &mut Vec<Spanned>| {
        if !buf.is_empty() {
            tokens.push(Spanned {
                token: Token::Word(std::mem::take(buf)),
                line: buf_line,
            });
        }
    };

    while pos < chars.len() {
        let c = chars[pos];

        if c == ' ' || c == '\t' || c == '\n' {
            flush(&mut buf, buf_line, &mut tokens);
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        if c == ';' {
            flush(&mut buf, buf_line, &mut tokens);
            tokens.push(Spanned {
                token: Token::Semi,
                line,
            });
            pos += 1;
            continue;
        }

        if c == '"' {
            flush(&mut buf, buf_line, &mut tokens);
            let tok_line = line;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(ScpError::tokenize(
                        filename,
                        tok_line,
                        "unterminated string literal",
                    ));
                }
                let sc = chars[pos];
                if sc == '"' {
                    pos += 1;
                    break;
                }
                if sc == '\n' {
                    line += 1;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        if buf.is_empty() {
            buf_line = line;
        }
        buf.push(c);
        pos += 1;
    }

    flush(&mut buf, buf_line, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(src: &str) -> Vec<Token> {
        lex(src, "t.scp").unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn splits_on_space_tab_newline() {
        assert_eq!(
            words("a b\tc\nd"),
            vec![
                Token::Word("a".into()),
                Token::Word("b".into()),
                Token::Word("c".into()),
                Token::Word("d".into()),
            ]
        );
    }

    #[test]
    fn semicolon_is_its_own_token() {
        assert_eq!(
            words("Dir=FOO;"),
            vec![Token::Word("Dir=FOO".into()), Token::Semi]
        );
    }

    #[test]
    fn quoted_string_keeps_embedded_space() {
        assert_eq!(
            words("Name = \"Program Files\";"),
            vec![
                Token::Word("Name".into()),
                Token::Word("=".into()),
                Token::Str("Program Files".into()),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn quote_flushes_pending_word() {
        assert_eq!(
            words("x\"y\""),
            vec![Token::Word("x".into()), Token::Str("y".into())]
        );
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = lex("Name = \"oops", "t.scp").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.kind, crate::error::ErrorKind::Tokenize);
    }

    #[test]
    fn lines_are_tracked() {
        let toks = lex("a\nb\nc", "t.scp").unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[2].line, 3);
    }
}
