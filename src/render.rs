//! Rust source emission for a [`UnionType`].
//!
//! For a union `Animal` the output declares:
//!
//! - `AnimalOneOf`, the tag enum, with each option's type name and field sets,
//! - `AnimalPayload`, one tuple variant per option type,
//! - `AnimalError`, returned when no option matches or decoding fails,
//! - `Animal`, the `(one_of, value)` wrapper with a `from_value` factory and
//!   serde impls that (de)serialize it as its payload.
//!
//! The option types themselves (`Dog`, `Cat`, ...) are expected to be emitted
//! by whatever compiled them.

use crate::error::GenerationError;
use crate::types::GenerateOptions;
use crate::union::UnionType;

/// Render `union` as Rust source.
///
/// # Errors
///
/// Returns `GenerationError::TagCollision` when two options share an enum tag,
/// since the tag enum could not declare both. Names made unique by appending
/// `_` (`Dog` and `Dog_`, or `a-b` and `a_b` as `AB` and `AB_`) always land
/// here: trailing underscores are dropped when tags are derived.
pub fn render_union(
    union: &UnionType,
    options: &GenerateOptions,
) -> Result<String, GenerationError> {
    if let Some((tag, variants)) = union.tag_collisions().into_iter().next() {
        return Err(GenerationError::TagCollision {
            union: union.name().to_string(),
            tag,
            variants,
        });
    }

    let names = Names::new(union);
    let mut out = Emitter::default();
    out.line(0, "// @generated by oneof-codegen. Do not edit.");
    out.blank();
    render_tag_enum(&mut out, union, &names);
    out.blank();
    render_payload(&mut out, union, &names, options);
    out.blank();
    render_error(&mut out, &names);
    out.blank();
    render_wrapper(&mut out, union, &names, options);
    Ok(out.finish())
}

struct Names {
    wrapper: String,
    tag: String,
    payload: String,
    error: String,
}

impl Names {
    fn new(union: &UnionType) -> Self {
        Self {
            wrapper: union.name().to_string(),
            tag: union.tag_type_name().to_string(),
            payload: format!("{}Payload", union.name()),
            error: format!("{}Error", union.name()),
        }
    }
}

#[derive(Default)]
struct Emitter {
    buf: String,
}

impl Emitter {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn value_derives(union: &UnionType, options: &GenerateOptions) -> String {
    let mut derives = vec!["Debug", "Clone"];
    if options.include_hash_and_equals {
        derives.push("PartialEq");
        if !(options.float_safe_equality && union.has_float_fields()) {
            derives.extend(["Eq", "Hash"]);
        }
    }
    derives.join(", ")
}

fn str_slice(fields: &[String]) -> String {
    let items: Vec<String> = fields.iter().map(|f| format!("{:?}", f)).collect();
    format!("&[{}]", items.join(", "))
}

fn render_tag_enum(out: &mut Emitter, union: &UnionType, names: &Names) {
    let tag = &names.tag;
    out.line(0, &format!("/// Options of the `{}` oneOf, in dispatch order.", names.wrapper));
    out.line(0, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
    out.line(0, "#[allow(non_camel_case_types)]");
    out.line(0, &format!("pub enum {} {{", tag));
    for variant in union.variants() {
        out.line(1, &format!("{},", variant.tag_name()));
    }
    out.line(0, "}");
    out.blank();

    let all: Vec<String> = union
        .variants()
        .iter()
        .map(|v| format!("{}::{}", tag, v.tag_name()))
        .collect();
    out.line(0, &format!("impl {} {{", tag));
    out.line(
        1,
        &format!("pub const ALL: [{}; {}] = [{}];", tag, all.len(), all.join(", ")),
    );
    out.blank();
    out.line(1, "pub fn type_name(self) -> &'static str {");
    out.line(2, "match self {");
    for variant in union.variants() {
        out.line(
            3,
            &format!("{}::{} => {:?},", tag, variant.tag_name(), variant.type_name()),
        );
    }
    out.line(2, "}");
    out.line(1, "}");
    for (method, required) in [("required_fields", true), ("optional_fields", false)] {
        out.blank();
        out.line(1, &format!("pub fn {}(self) -> &'static [&'static str] {{", method));
        out.line(2, "match self {");
        for variant in union.variants() {
            let fields = if required {
                variant.required_fields()
            } else {
                variant.optional_fields()
            };
            out.line(3, &format!("{}::{} => {},", tag, variant.tag_name(), str_slice(fields)));
        }
        out.line(2, "}");
        out.line(1, "}");
    }
    out.line(0, "}");
    out.blank();

    out.line(0, &format!("impl std::fmt::Display for {} {{", tag));
    out.line(1, "fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {");
    out.line(2, "f.write_str(self.type_name())");
    out.line(1, "}");
    out.line(0, "}");
}

fn render_payload(out: &mut Emitter, union: &UnionType, names: &Names, options: &GenerateOptions) {
    out.line(0, &format!("/// Decoded value of an `{}`.", names.wrapper));
    out.line(
        0,
        &format!("#[derive({}, serde::Serialize)]", value_derives(union, options)),
    );
    out.line(0, "#[serde(untagged)]");
    out.line(0, &format!("pub enum {} {{", names.payload));
    for variant in union.variants() {
        out.line(1, &format!("{0}({0}),", variant.type_name()));
    }
    out.line(0, "}");
}

fn render_error(out: &mut Emitter, names: &Names) {
    let error = &names.error;
    out.line(0, &format!("/// Failure to build an `{}` from a JSON object.", names.wrapper));
    out.line(0, "#[derive(Debug)]");
    out.line(0, &format!("pub enum {} {{", error));
    out.line(1, "/// No option accepts exactly these keys.");
    out.line(1, "NoMatch { keys: Vec<String> },");
    out.line(1, "/// The first matching option could not decode the object.");
    out.line(
        1,
        &format!("Decode {{ option: {}, source: serde_json::Error }},", names.tag),
    );
    out.line(0, "}");
    out.blank();
    out.line(0, &format!("impl std::fmt::Display for {} {{", error));
    out.line(1, "fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {");
    out.line(2, "match self {");
    out.line(
        3,
        &format!(
            "{}::NoMatch {{ keys }} => write!(f, \"no oneOf option matches keys {{:?}}\", keys),",
            error
        ),
    );
    out.line(
        3,
        &format!(
            "{}::Decode {{ option, source }} => write!(f, \"cannot decode {{}}: {{}}\", option, source),",
            error
        ),
    );
    out.line(2, "}");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();
    out.line(0, &format!("impl std::error::Error for {} {{", error));
    out.line(1, "fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {");
    out.line(2, "match self {");
    out.line(3, &format!("{}::NoMatch {{ .. }} => None,", error));
    out.line(3, &format!("{}::Decode {{ source, .. }} => Some(source),", error));
    out.line(2, "}");
    out.line(1, "}");
    out.line(0, "}");
}

fn render_wrapper(out: &mut Emitter, union: &UnionType, names: &Names, options: &GenerateOptions) {
    let Names {
        wrapper,
        tag,
        payload,
        error,
    } = names;

    out.line(0, &format!("#[derive({})]", value_derives(union, options)));
    out.line(0, &format!("pub struct {} {{", wrapper));
    out.line(1, &format!("one_of: {},", tag));
    out.line(1, &format!("value: {},", payload));
    out.line(0, "}");
    out.blank();

    out.line(0, &format!("impl {} {{", wrapper));
    out.line(1, &format!("pub fn new(one_of: {}, value: {}) -> Self {{", tag, payload));
    out.line(2, "Self { one_of, value }");
    out.line(1, "}");
    out.blank();
    out.line(1, &format!("pub fn one_of(&self) -> {} {{", tag));
    out.line(2, "self.one_of");
    out.line(1, "}");
    out.blank();
    out.line(1, &format!("pub fn value(&self) -> &{} {{", payload));
    out.line(2, "&self.value");
    out.line(1, "}");
    out.blank();
    out.line(1, "/// Decode into the first option whose required and optional fields cover");
    out.line(1, "/// exactly the keys of `value`.");
    out.line(
        1,
        &format!(
            "pub fn from_value(value: &serde_json::Map<String, serde_json::Value>) -> Result<Self, {}> {{",
            error
        ),
    );
    out.line(2, &format!("for option in {}::ALL {{", tag));
    out.line(3, "let required = option.required_fields();");
    out.line(3, "let optional = option.optional_fields();");
    out.line(3, "if !required.iter().all(|f| value.contains_key(*f)) {");
    out.line(4, "continue;");
    out.line(3, "}");
    out.line(
        3,
        "if !value.keys().all(|k| required.contains(&k.as_str()) || optional.contains(&k.as_str())) {",
    );
    out.line(4, "continue;");
    out.line(3, "}");
    out.line(3, "let json = serde_json::Value::Object(value.clone());");
    out.line(3, "let decoded = match option {");
    for variant in union.variants() {
        out.line(
            4,
            &format!(
                "{}::{} => serde_json::from_value(json).map({}::{}),",
                tag,
                variant.tag_name(),
                payload,
                variant.type_name()
            ),
        );
    }
    out.line(3, "};");
    out.line(3, "return decoded");
    out.line(4, &format!(".map(|value| {}::new(option, value))", wrapper));
    out.line(4, &format!(".map_err(|source| {}::Decode {{ option, source }});", error));
    out.line(2, "}");
    out.line(2, &format!("Err({}::NoMatch {{", error));
    out.line(3, "keys: value.keys().cloned().collect(),");
    out.line(2, "})");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();

    out.line(0, &format!("impl serde::Serialize for {} {{", wrapper));
    out.line(
        1,
        "fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {",
    );
    out.line(2, "serde::Serialize::serialize(&self.value, serializer)");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();

    out.line(0, &format!("impl<'de> serde::Deserialize<'de> for {} {{", wrapper));
    out.line(
        1,
        "fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {",
    );
    out.line(
        2,
        "let map = <serde_json::Map<String, serde_json::Value> as serde::Deserialize>::deserialize(deserializer)?;",
    );
    out.line(2, &format!("{}::from_value(&map).map_err(serde::de::Error::custom)", wrapper));
    out.line(1, "}");
    out.line(0, "}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{FieldDecl, FieldKind, Materializer, TypeHandle};
    use crate::descriptor::VariantDescriptor;
    use crate::error::DecodeError;
    use crate::naming::DefaultNamingPolicy;
    use serde_json::{Map, Value};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Echo;

    impl Materializer for Echo {
        fn materialize(&self, _: &str, fields: &Map<String, Value>) -> Result<Value, DecodeError> {
            Ok(Value::Object(fields.clone()))
        }
    }

    fn variant(name: &str, fields: &[(&str, bool, FieldKind)]) -> VariantDescriptor {
        let fields = fields
            .iter()
            .map(|(name, required, kind)| FieldDecl {
                name: name.to_string(),
                required: *required,
                kind: *kind,
            })
            .collect();
        VariantDescriptor::from_handle(
            TypeHandle::new(name, fields, Arc::new(Echo)),
            &DefaultNamingPolicy::default(),
        )
    }

    fn animal() -> UnionType {
        UnionType::new(
            "Animal",
            vec![
                variant(
                    "Dog",
                    &[
                        ("name", true, FieldKind::String),
                        ("gender", true, FieldKind::String),
                        ("bark", false, FieldKind::Boolean),
                    ],
                ),
                variant(
                    "Cat",
                    &[
                        ("name", true, FieldKind::String),
                        ("gender", true, FieldKind::String),
                        ("meow", false, FieldKind::Boolean),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn renders_tag_enum_with_fingerprints() {
        let source = render_union(&animal(), &GenerateOptions::new()).unwrap();
        assert!(source.contains("pub enum AnimalOneOf {\n    DOG,\n    CAT,\n}"));
        assert!(source
            .contains("pub const ALL: [AnimalOneOf; 2] = [AnimalOneOf::DOG, AnimalOneOf::CAT];"));
        assert!(source.contains(r#"AnimalOneOf::DOG => "Dog","#));
        assert!(source.contains(r#"AnimalOneOf::DOG => &["gender", "name"],"#));
        assert!(source.contains(r#"AnimalOneOf::CAT => &["meow"],"#));
    }

    #[test]
    fn renders_wrapper_and_factory() {
        let source = render_union(&animal(), &GenerateOptions::new()).unwrap();
        assert!(source.contains(
            "pub struct Animal {\n    one_of: AnimalOneOf,\n    value: AnimalPayload,\n}"
        ));
        assert!(source.contains("pub enum AnimalPayload {\n    Dog(Dog),\n    Cat(Cat),\n}"));
        assert!(source.contains(
            "AnimalOneOf::CAT => serde_json::from_value(json).map(AnimalPayload::Cat),"
        ));
        assert!(source.contains("impl serde::Serialize for Animal {"));
        assert!(source.contains("impl<'de> serde::Deserialize<'de> for Animal {"));
    }

    #[test]
    fn equality_derives_follow_options() {
        let with = render_union(&animal(), &GenerateOptions::new()).unwrap();
        assert!(with.contains("#[derive(Debug, Clone, PartialEq, Eq, Hash)]\npub struct Animal"));

        let without =
            render_union(&animal(), &GenerateOptions::new().hash_and_equals(false)).unwrap();
        assert!(without.contains("#[derive(Debug, Clone)]\npub struct Animal"));
    }

    #[test]
    fn float_fields_withhold_eq_and_hash() {
        let union = UnionType::new(
            "Reading",
            vec![variant("Scale", &[("weight", true, FieldKind::Number)])],
        );
        let safe = render_union(&union, &GenerateOptions::new()).unwrap();
        assert!(safe.contains("#[derive(Debug, Clone, PartialEq)]\npub struct Reading"));

        let unsafe_floats =
            render_union(&union, &GenerateOptions::new().float_safe(false)).unwrap();
        assert!(unsafe_floats
            .contains("#[derive(Debug, Clone, PartialEq, Eq, Hash)]\npub struct Reading"));
    }

    #[test]
    fn tag_collision_is_rejected() {
        let union = UnionType::new(
            "Animal",
            vec![
                variant("Dog", &[("bark", true, FieldKind::Boolean)]),
                variant("Dog_", &[("woof", true, FieldKind::Boolean)]),
            ],
        );
        match render_union(&union, &GenerateOptions::new()) {
            Err(GenerationError::TagCollision { tag, variants, .. }) => {
                assert_eq!(tag, "DOG");
                assert_eq!(variants, ["Dog", "Dog_"]);
            }
            other => panic!("expected tag collision, got {:?}", other),
        }
    }
}
