//! CLI integration tests for oneof-codegen binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("oneof-codegen"))
}

// Helper to create a temp schema file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const ANIMAL_SCHEMA: &str = r##"{
    "definitions": {
        "dog": {
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "gender": { "type": "string" },
                "bark": { "type": "boolean" }
            },
            "required": ["name", "gender"]
        },
        "cat": {
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "gender": { "type": "string" },
                "meow": { "type": "boolean" }
            },
            "required": ["name", "gender"]
        }
    },
    "oneOf": [
        { "$ref": "#/definitions/dog" },
        { "$ref": "#/definitions/cat" }
    ]
}"##;

mod generate_command {
    use super::*;

    #[test]
    fn basic_generate() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);

        cmd()
            .args(["generate", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("pub enum AnimalOneOf {"))
            .stdout(predicate::str::contains("pub struct Animal {"))
            .stdout(predicate::str::contains("Dog(Dog),"));
    }

    #[test]
    fn generate_with_name_and_affixes() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", ANIMAL_SCHEMA);

        cmd()
            .args([
                "generate",
                schema.to_str().unwrap(),
                "--name",
                "pet",
                "--prefix",
                "Api",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("pub struct ApiPet {"))
            .stdout(predicate::str::contains("API_DOG,"));
    }

    #[test]
    fn generate_no_equals() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);

        cmd()
            .args(["generate", schema.to_str().unwrap(), "--no-equals"])
            .assert()
            .success()
            .stdout(predicate::str::contains("#[derive(Debug, Clone)]\npub struct Animal {"));
    }

    #[test]
    fn generate_with_output_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let output = dir.path().join("animal.rs");

        cmd()
            .args([
                "generate",
                schema.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("// @generated by oneof-codegen"));
        assert!(content.contains("pub enum AnimalOneOf"));
    }

    #[test]
    fn generate_at_pointer() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "order.json",
            r#"{
                "type": "object",
                "properties": {
                    "payment": {
                        "oneOf": [
                            { "type": "object", "required": ["card"] },
                            { "type": "object", "required": ["iban"] }
                        ]
                    }
                }
            }"#,
        );

        cmd()
            .args([
                "generate",
                schema.to_str().unwrap(),
                "--pointer",
                "#/properties/payment",
                "--name",
                "payment",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("PAYMENT_1,"))
            .stdout(predicate::str::contains("PAYMENT_2,"));
    }

    #[test]
    fn generate_tag_collision_fails() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "pair.json",
            r##"{
                "definitions": {
                    "a-b": { "type": "object" },
                    "a_b": { "type": "object" }
                },
                "oneOf": [
                    { "$ref": "#/definitions/a-b" },
                    { "$ref": "#/definitions/a_b" }
                ]
            }"##,
        );

        cmd()
            .args(["generate", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("AB"));
    }
}

mod describe_command {
    use super::*;

    #[test]
    fn basic_describe() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""tag":"DOG""#))
            .stdout(predicate::str::contains(r#""required":["gender","name"]"#))
            .stdout(predicate::str::contains(r#""optional":["meow"]"#));
    }

    #[test]
    fn describe_pretty() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);

        cmd()
            .args(["describe", schema.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn describe_external_ref() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "dog.json",
            r#"{"type":"object","required":["bark"]}"#,
        );
        let schema = write_temp_file(&dir, "pet.json", r#"{"oneOf":[{"$ref":"dog.json"}]}"#);

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type":"Dog""#))
            .stdout(predicate::str::contains(r#""required":["bark"]"#));
    }
}

mod decode_command {
    use super::*;

    #[test]
    fn decode_dog() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(
            &dir,
            "rex.json",
            r#"{"name":"Rex","gender":"M","bark":true}"#,
        );

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("DOG (Dog)"));
    }

    #[test]
    fn decode_json_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(
            &dir,
            "tom.json",
            r#"{"name":"Tom","gender":"M","meow":true}"#,
        );

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""matched":true"#))
            .stdout(predicate::str::contains(r#""tag":"CAT""#));
    }

    #[test]
    fn decode_no_match() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(&dir, "odd.json", r#"{"name":"Rex","wings":2}"#);

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No match"))
            .stderr(predicate::str::contains("missing [gender]"));
    }

    #[test]
    fn decode_no_match_json() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(&dir, "odd.json", r#"{"wings":2}"#);

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""matched":false"#))
            .stdout(predicate::str::contains(r#""keys":["wings"]"#));
    }

    #[test]
    fn decode_invalid_payload_value() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(&dir, "bad.json", r#"{"name":7,"gender":"M"}"#);

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/name"));
    }

    #[test]
    fn decode_non_object_payload() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);
        let payload = write_temp_file(&dir, "list.json", "[1, 2]");

        cmd()
            .args([
                "decode",
                schema.to_str().unwrap(),
                payload.to_str().unwrap(),
            ])
            .assert()
            .code(1);
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_schema_file() {
        cmd()
            .args(["generate", "/nonexistent/animal.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn invalid_json_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "broken.json", "{ not json");

        cmd()
            .args(["generate", schema.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn schema_without_one_of() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "plain.json", r#"{"type":"object"}"#);

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("oneOf"));
    }

    #[test]
    fn pointer_not_found() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "animal.json", ANIMAL_SCHEMA);

        cmd()
            .args([
                "describe",
                schema.to_str().unwrap(),
                "--pointer",
                "#/properties/nope",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no value at"));
    }

    #[test]
    fn non_object_branch() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "mixed.json",
            r#"{"oneOf":[{"type":"object"},{"type":"string"}]}"#,
        );

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn missing_reference_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "pet.json", r#"{"oneOf":[{"$ref":"ghost.json"}]}"#);

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .code(3);
    }

    #[test]
    fn reference_cycle_through_parent_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("defs")).unwrap();
        write_temp_file(&dir, "defs/loop.json", r#"{"$ref":"../defs/loop.json"}"#);
        let schema = write_temp_file(&dir, "pet.json", r#"{"oneOf":[{"$ref":"defs/loop.json"}]}"#);

        cmd()
            .args(["describe", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("circular reference"));
    }
}
