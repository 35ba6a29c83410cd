//! JSON export: the stable read-only interface external consumers use
//! instead of reading scp text themselves.
//!
//! Canonical output: entities sorted by id, attribute keys sorted, all
//! fields always present.

use crate::ast::Registry;
use crate::SCP_EXPORT_VERSION;
use serde_json::{json, Map, Value};

pub fn to_json(registry: &Registry) -> Value {
    let mut entities: Vec<Value> = Vec::new();
    for entity in registry.values() {
        let mut attrs = Map::new();
        for (k, v) in &entity.attributes {
            attrs.insert(k.clone(), Value::String(v.clone()));
        }
        entities.push(json!({
            "id":         entity.id,
            "node_type":  entity.node_type.keyword(),
            "file":       entity.prov.file,
            "line":       entity.prov.line,
            "values":     entity.values,
            "attributes": Value::Object(attrs),
        }));
    }

    let mut root = Map::new();
    root.insert("entities".to_owned(), Value::Array(entities));
    root.insert("kind".to_owned(), Value::String("ScpRegistry".to_owned()));
    root.insert(
        "version".to_owned(),
        Value::String(SCP_EXPORT_VERSION.to_owned()),
    );
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn export_is_sorted_and_complete() {
        let src = "Module B End File A Dir = D1; Name = \"a\"; v1; End";
        let reg = parse(&lex(src, "t.scp").unwrap(), "t.scp").unwrap();
        let v = to_json(&reg);
        assert_eq!(v["kind"], "ScpRegistry");
        let entities = v["entities"].as_array().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0]["id"], "A");
        assert_eq!(entities[0]["node_type"], "File");
        assert_eq!(entities[0]["attributes"]["Dir"], "D1");
        assert_eq!(entities[0]["values"][0], "v1");
        assert_eq!(entities[1]["id"], "B");
        assert_eq!(entities[1]["file"], "t.scp");
    }
}
