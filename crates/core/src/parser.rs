//! Entity parser: token stream -> registry of typed entities.
//!
//! The stream is a sequence of `NodeType Name <body> End` blocks back to
//! back. Body statements end at `;`; a statement with no `=` contributes
//! its tokens to the entity's ordered value list, a statement with exactly
//! one `=` is an attribute. Both sides of the `=` are concatenated
//! token-by-token with no separator, which is how a localized declaration
//! `Name (en-US) = ...;` ends up under the key `Name(en-US)` and a spaced
//! list `(a, b, c)` survives as `(a,b,c)`.

use crate::ast::{Entity, NodeType, Provenance, Registry};
use crate::error::ScpError;
use crate::lexer::{Spanned, Token};

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn cur_line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|s| s.line)
            .unwrap_or(0)
    }

    fn err(&self, line: u32, msg: impl Into<String>) -> ScpError {
        ScpError::parse(&self.filename, line, msg)
    }

    /// One `NodeType Name <body> End` block.
    fn parse_entity(&mut self) -> Result<Entity, ScpError> {
        let head = match self.advance().cloned() {
            Some(s) => s,
            None => return Err(self.err(0, "expected node type, got end of input")),
        };
        let line = head.line;
        let node_type = match &head.token {
            Token::Word(w) => NodeType::from_keyword(w)
                .ok_or_else(|| self.err(line, format!("unknown node type '{}'", w)))?,
            other => {
                return Err(self.err(line, format!("expected node type, got {:?}", other)));
            }
        };

        let id = match self.advance().cloned() {
            Some(Spanned {
                token: Token::Word(w),
                ..
            }) if !w.is_empty() => w,
            Some(s) => {
                return Err(self.err(s.line, format!("expected entity name, got {:?}", s.token)));
            }
            None => return Err(self.err(line, "expected entity name, got end of input")),
        };

        let mut values = Vec::new();
        let mut attributes = std::collections::BTreeMap::new();

        loop {
            let at_end = matches!(
                self.peek(),
                Some(Spanned {
                    token: Token::Word(w),
                    ..
                }) if w == "End"
            );
            if at_end {
                self.advance();
                break;
            }
            if self.peek().is_none() {
                return Err(self.err(
                    self.cur_line(),
                    format!("entity '{}' not closed by End before end of input", id),
                ));
            }
            self.parse_statement(&id, &mut values, &mut attributes)?;
        }

        let file_refs = parse_ref_list(&attributes, "Files", &id, &self.filename, line)?;
        let unixlink_refs = parse_ref_list(&attributes, "Unixlinks", &id, &self.filename, line)?;

        Ok(Entity {
            id,
            node_type,
            values,
            attributes,
            file_refs,
            unixlink_refs,
            prov: Provenance {
                file: self.filename.clone(),
                line,
            },
        })
    }

    /// One statement: everything up to the next `;`.
    ///
    /// `=` only counts when it appears in an unquoted word, so quoted
    /// values may contain literal `=` characters. More than one unquoted
    /// `=` before the `;` is an error.
    fn parse_statement(
        &mut self,
        entity_id: &str,
        values: &mut Vec<String>,
        attributes: &mut std::collections::BTreeMap<String, String>,
    ) -> Result<(), ScpError> {
        let start_line = self.cur_line();
        let mut left: Vec<String> = Vec::new();
        let mut value = String::new();
        let mut seen_eq = false;

        loop {
            let s = match self.advance().cloned() {
                Some(s) => s,
                None => {
                    return Err(self.err(
                        start_line,
                        format!("statement in '{}' not closed by ';'", entity_id),
                    ));
                }
            };
            match &s.token {
                Token::Semi => break,
                Token::Str(text) => {
                    if seen_eq {
                        value.push_str(text);
                    } else {
                        left.push(text.clone());
                    }
                }
                Token::Word(w) => {
                    if seen_eq {
                        if w.contains('=') {
                            return Err(
                                self.err(s.line, "two '=' in one attribute statement")
                            );
                        }
                        value.push_str(w);
                    } else if let Some(i) = w.find('=') {
                        if w[i + 1..].contains('=') {
                            return Err(
                                self.err(s.line, "two '=' in one attribute statement")
                            );
                        }
                        seen_eq = true;
                        if !w[..i].is_empty() {
                            left.push(w[..i].to_owned());
                        }
                        value.push_str(&w[i + 1..]);
                    } else {
                        left.push(w.clone());
                    }
                }
            }
        }

        if !seen_eq {
            values.extend(left);
            return Ok(());
        }

        let key: String = left.concat();
        if key.is_empty() {
            return Err(self.err(start_line, "attribute name is empty"));
        }
        if attributes.contains_key(&key) {
            return Err(self.err(
                start_line,
                format!("duplicate attribute '{}' in entity '{}'", key, entity_id),
            ));
        }
        attributes.insert(key, value);
        Ok(())
    }
}

/// Parse all entity blocks of one source file into a per-file registry.
///
/// Grammar violations are recoverable (the caller skips this file);
/// a duplicate entity id is fatal.
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<Registry, ScpError> {
    let mut parser = Parser::new(tokens, filename);
    let mut registry = Registry::new();

    while parser.peek().is_some() {
        let entity = parser.parse_entity()?;
        if let Some(first) = registry.get(&entity.id) {
            return Err(ScpError::parse_fatal(
                filename,
                entity.prov.line,
                format!(
                    "duplicate entity '{}': first declared at line {}",
                    entity.id, first.prov.line
                ),
            ));
        }
        registry.insert(entity.id.clone(), entity);
    }

    Ok(registry)
}

/// Merge one file's entities into the global registry, re-checking id
/// uniqueness. A cross-file collision is the same fatal error as an
/// in-file one.
pub fn merge(global: &mut Registry, file_entities: Registry) -> Result<(), ScpError> {
    for (id, entity) in file_entities {
        if let Some(first) = global.get(&id) {
            return Err(ScpError::parse_fatal(
                &entity.prov.file,
                entity.prov.line,
                format!(
                    "duplicate entity '{}': first declared in {} line {}",
                    id, first.prov.file, first.prov.line
                ),
            ));
        }
        global.insert(id, entity);
    }
    Ok(())
}

/// Parse a `(a,b,c)` reference-list attribute into its members.
/// Missing attribute means an empty list; a present attribute that is not
/// wrapped in matching parentheses is a fatal link error.
fn parse_ref_list(
    attributes: &std::collections::BTreeMap<String, String>,
    key: &str,
    entity_id: &str,
    filename: &str,
    line: u32,
) -> Result<Vec<String>, ScpError> {
    let raw = match attributes.get(key) {
        Some(v) => v,
        None => return Ok(Vec::new()),
    };
    let inner = raw
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| {
            ScpError::link(
                filename,
                line,
                format!(
                    "malformed {} list '{}' in entity '{}': expected (a,b,c)",
                    key, raw, entity_id
                ),
            )
        })?;
    Ok(inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect())
}
