//! Variable store: scoped settings file -> flat `${VAR}` substitution map.
//!
//! The settings format is line oriented with brace-delimited nested
//! scopes:
//!
//! ```text
//! Globals
//! {
//!     Settings
//!     {
//!         PRODUCTNAME My Office
//!         WITHJRE
//!     }
//! }
//! ```
//!
//! The first word of a plain line is the key, the rest of the line the
//! value; a key alone stores no value. Namespace paths join the scope
//! stack with `::`.

use crate::error::ScpError;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct VariableStore {
    /// namespace path -> key -> optional value, in document order per scope
    scopes: Vec<(String, BTreeMap<String, Option<String>>)>,
}

impl VariableStore {
    /// Parse a settings file. Malformed nesting is a recoverable parse
    /// error of the same shape as the entity grammar's.
    pub fn load(text: &str, filename: &str) -> Result<VariableStore, ScpError> {
        let mut store = VariableStore::default();
        let mut stack: Vec<String> = Vec::new();
        // A lone word is ambiguous until the next line: a following `{`
        // makes it a scope name, anything else makes it a valueless key.
        let mut pending: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx as u32 + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let (line, opens) = match line.strip_suffix('{') {
                Some(rest) => (rest.trim(), true),
                None => (line, false),
            };

            if opens && line.is_empty() {
                // `{` alone: the scope name came from the previous line
                let name = pending.take().ok_or_else(|| {
                    ScpError::parse(filename, lineno, "'{' with no scope name")
                })?;
                Self::open_scope(&mut store, &mut stack, name);
                continue;
            }

            // Any non-`{` line resolves a pending lone word to a key.
            if let Some(key) = pending.take() {
                Self::insert_key(&mut store, &stack, key, None, filename, lineno)?;
            }

            if opens {
                // `Scope {` on one line
                let mut words = line.split_whitespace();
                let name = words.next().unwrap_or_default().to_owned();
                if words.next().is_some() {
                    return Err(ScpError::parse(
                        filename,
                        lineno,
                        format!("scope-open line carries more than one token: '{}'", line),
                    ));
                }
                Self::open_scope(&mut store, &mut stack, name);
                continue;
            }

            if line == "}" {
                if stack.pop().is_none() {
                    return Err(ScpError::parse(filename, lineno, "'}' with no open scope"));
                }
                continue;
            }

            let mut words = line.splitn(2, char::is_whitespace);
            let key = words.next().unwrap_or_default().to_owned();
            match words.next() {
                Some(value) => {
                    let value = Some(value.trim().to_owned());
                    Self::insert_key(&mut store, &stack, key, value, filename, lineno)?;
                }
                None => {
                    pending = Some(key);
                }
            }
        }

        if let Some(key) = pending.take() {
            let lineno = text.lines().count() as u32;
            Self::insert_key(&mut store, &stack, key, None, filename, lineno)?;
        }
        if !stack.is_empty() {
            return Err(ScpError::parse(
                filename,
                0,
                format!("unclosed scope '{}' at end of file", stack.join("::")),
            ));
        }

        store.synthesize_derived();
        Ok(store)
    }

    fn open_scope(store: &mut VariableStore, stack: &mut Vec<String>, name: String) {
        stack.push(name);
        let path = stack.join("::");
        if !store.scopes.iter().any(|(p, _)| p == &path) {
            store.scopes.push((path, BTreeMap::new()));
        }
    }

    fn insert_key(
        store: &mut VariableStore,
        stack: &[String],
        key: String,
        value: Option<String>,
        filename: &str,
        lineno: u32,
    ) -> Result<(), ScpError> {
        if stack.is_empty() {
            return Err(ScpError::parse(
                filename,
                lineno,
                format!("key '{}' outside any scope", key),
            ));
        }
        let path = stack.join("::");
        if let Some((_, map)) = store.scopes.iter_mut().find(|(p, _)| p == &path) {
            map.insert(key, value);
        }
        Ok(())
    }

    /// `LCPRODUCTNAME` is derived from `PRODUCTNAME` after loading; it is
    /// the only write after construction.
    fn synthesize_derived(&mut self) {
        let product = self.scopes.iter().find_map(|(_, map)| {
            map.get("PRODUCTNAME").and_then(|v| v.clone())
        });
        if let Some(p) = product {
            let lc = p.to_lowercase();
            for (_, map) in &mut self.scopes {
                if map.contains_key("PRODUCTNAME") {
                    map.insert("LCPRODUCTNAME".to_owned(), Some(lc.clone()));
                }
            }
        }
    }

    /// Look up one scope by its `::`-joined namespace path.
    pub fn scope(&self, path: &str) -> Option<&BTreeMap<String, Option<String>>> {
        self.scopes.iter().find(|(p, _)| p == path).map(|(_, m)| m)
    }

    /// The flat mapping used for `${VAR}` substitution: the union of all
    /// scopes' keyed values in document order, later scopes winning.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        for (_, map) in &self.scopes {
            for (k, v) in map {
                if let Some(v) = v {
                    flat.insert(k.clone(), v.clone());
                }
            }
        }
        flat
    }
}

/// Replace `${VAR}` placeholders left to right, non-recursively. An
/// unknown key drops the placeholder; an unclosed `${` is passed through
/// verbatim.
pub fn substitute(input: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                if let Some(v) = vars.get(&after[..end]) {
                    out.push_str(v);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
