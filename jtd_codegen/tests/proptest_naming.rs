//! Property-based tests for name resolution and output determinism.
//!
//! Names are drawn from a small alphabet of words joined by separators in
//! mixed case, so distinct JSON names frequently collapse to the same
//! identifier (`foo_bar`, `fooBar`, `FOO-BAR`). They are used as property
//! names, optional property names, definition names and discriminator tags.

use jtd_codegen::expand::expand;
use jtd_codegen::naming::{NamingConvention, ResolvedNames, resolve};
use jtd_codegen::parse::parse_schema;
use jtd_codegen::registry::Registry;
use jtd_codegen::target::{go, java, rust, typescript};
use jtd_codegen::{GenerateSettings, RenderedTarget, TargetConfig, render};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("foo".to_string()),
        Just("bar".to_string()),
        Just("id".to_string()),
        Just("type".to_string()),
        Just("self".to_string()),
        Just("string".to_string()),
    ]
}

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("_"), Just("-"), Just(" ")]
}

/// A JSON property name of one or two words, randomly upper-cased.
fn arb_prop_name() -> impl Strategy<Value = String> {
    (arb_word(), arb_separator(), prop::option::of(arb_word()), any::<bool>()).prop_map(
        |(first, separator, second, upper)| {
            let name: String = second.map_or_else(
                || first.clone(),
                |second| format!("{first}{separator}{second}"),
            );
            if upper { name.to_uppercase() } else { name }
        },
    )
}

fn arb_prop_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(arb_prop_name(), 1..=8)
}

/// Names spread over `properties`, `optionalProperties`, `definitions` and
/// the `mapping` of a discriminator, in that order.
#[derive(Debug, Clone)]
struct SchemaKeys {
    buckets: [Vec<String>; 4],
}

fn arb_schema_keys() -> impl Strategy<Value = SchemaKeys> {
    arb_prop_names()
        .prop_flat_map(|names| {
            let len: usize = names.len();
            (Just(names), prop::collection::vec(0..4usize, len))
        })
        .prop_map(|(names, slots)| {
            let mut buckets: [Vec<String>; 4] = std::array::from_fn(|_| Vec::new());
            for (name, slot) in names.into_iter().zip(slots) {
                buckets[slot].push(name);
            }
            SchemaKeys { buckets }
        })
}

/// An enum whose values collapse to the same constant, so constants
/// collide too.
const ENUM: &str = r#"{ "enum": ["a-b", "A_B", "ab"] }"#;

/// JSON object text with `entries` in the given order, or reversed.
fn object(entries: Vec<(String, String)>, reversed: bool) -> String {
    let mut fields: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| {
            let key: String = serde_json::to_string(&key).expect("string key");
            format!("{key}: {value}")
        })
        .collect();
    if reversed {
        fields.reverse();
    }
    format!("{{ {} }}", fields.join(", "))
}

fn enums(names: &[String]) -> Vec<(String, String)> {
    names
        .iter()
        .map(|name| (name.clone(), ENUM.to_string()))
        .collect()
}

/// Schema text for `keys`, with every object's keys reversed if `reversed`.
/// Each kind of key holds an enum so nested type names collide as well.
fn schema_text(keys: &SchemaKeys, reversed: bool) -> String {
    let [required, optional, definitions, tags] = &keys.buckets;

    let variant: String = object(
        vec![(
            "properties".to_string(),
            object(vec![("value".to_string(), ENUM.to_string())], reversed),
        )],
        reversed,
    );
    let mut mapping: Vec<(String, String)> = tags
        .iter()
        .map(|tag| (tag.clone(), variant.clone()))
        .collect();
    mapping.push(("other".to_string(), variant.clone()));
    let union: String = object(
        vec![
            ("discriminator".to_string(), r#""kind""#.to_string()),
            ("mapping".to_string(), object(mapping, reversed)),
        ],
        reversed,
    );

    let mut definition_entries: Vec<(String, String)> = enums(definitions);
    definition_entries.push(("union".to_string(), union));
    let mut property_entries: Vec<(String, String)> = enums(required);
    property_entries.push(("union".to_string(), r#"{ "ref": "union" }"#.to_string()));

    object(
        vec![
            ("definitions".to_string(), object(definition_entries, reversed)),
            ("properties".to_string(), object(property_entries, reversed)),
            ("optionalProperties".to_string(), object(enums(optional), reversed)),
        ],
        reversed,
    )
}

fn settings() -> GenerateSettings {
    GenerateSettings::new("root")
        .with_target(TargetConfig::JavaJackson {
            out_dir: PathBuf::from("java"),
            package: "com.example".to_string(),
        })
        .with_target(TargetConfig::Rust {
            out_dir: PathBuf::from("rust"),
        })
        .with_target(TargetConfig::Go {
            out_dir: PathBuf::from("go"),
            package: "example".to_string(),
        })
        .with_target(TargetConfig::TypeScript {
            out_dir: PathBuf::from("ts"),
        })
}

fn rendered_text(schema_json: &str) -> Vec<(PathBuf, String)> {
    let rendered: Vec<RenderedTarget> = render(schema_json, &settings()).expect("valid schema");
    rendered
        .into_iter()
        .flat_map(|target| target.outcome.expect("rendered").files)
        .map(|file| (file.path, file.contents))
        .collect()
}

fn assert_unique(names: &[String], what: &str) {
    let unique: BTreeSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "duplicate {what} in {names:?}");
}

fn check_convention(registry: &Registry, convention: &NamingConvention) {
    let names: ResolvedNames = resolve(registry, convention);
    let type_names: Vec<String> = registry
        .iter()
        .map(|definition| names.type_name(definition.id).to_string())
        .collect();
    assert_unique(&type_names, "type names");
    for definition in registry.iter() {
        let resolved = names.get(definition.id);
        assert_unique(&resolved.members, "members");
        assert_unique(&resolved.constants, "constants");
        for identifier in resolved.members.iter().chain(&resolved.constants) {
            assert!(!identifier.is_empty(), "empty identifier");
            assert!(
                !convention.keywords.contains(&identifier.as_str()),
                "keyword {identifier} used as identifier"
            );
        }
    }
    for name in &type_names {
        assert!(
            !convention.reserved_type_names.contains(&name.as_str()),
            "reserved type name {name} used"
        );
    }
}

proptest! {
    #[test]
    fn output_does_not_depend_on_key_order(keys in arb_schema_keys()) {
        let forward: String = schema_text(&keys, false);
        let backward: String = schema_text(&keys, true);
        prop_assert_eq!(rendered_text(&forward), rendered_text(&backward));
    }

    #[test]
    fn identifiers_are_unique_per_scope(keys in arb_schema_keys()) {
        let schema = parse_schema(&schema_text(&keys, false)).expect("valid schema");
        let registry: Registry = expand(&schema, "root");
        check_convention(&registry, &java::NAMING);
        check_convention(&registry, &rust::NAMING);
        check_convention(&registry, &go::NAMING);
        check_convention(&registry, &typescript::NAMING);
    }
}
