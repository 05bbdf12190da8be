//! Integration tests for recipe sampling.

use arbitrary_core::{Key, Value};
use arbitrary_factory::{compile_recipe, run_check, run_sample, write_documents, CheckArgs, SampleArgs};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

fn parse_lines(output: &str) -> Vec<Value> {
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_sample_profiles_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("profiles.jsonl");
    let args = SampleArgs {
        recipe: demo("profiles.yaml"),
        count: 25,
        seed: None,
        output: Some(output.clone()),
    };

    let metrics = run_sample(&args).unwrap();
    assert_eq!(metrics.documents_written, 25);
    assert_eq!(metrics.seed, 1234);

    let documents = parse_lines(&fs::read_to_string(&output).unwrap());
    assert_eq!(documents.len(), 25);

    for doc in &documents {
        let profile = doc.project(&Key::from("profile"));
        let name = profile.project(&Key::from("name"));
        let age = profile.project(&Key::from("age")).as_i64().unwrap();
        let hobbies = profile.project(&Key::from("hobbies"));

        assert!((18..80).contains(&age));
        assert!((1..4).contains(&hobbies.len().unwrap()));
        assert!(doc.project(&Key::from("visits_per_week")).as_f64().unwrap() >= 0.0);

        // The summary projects from the same person draw as `profile`
        let expected = format!("{name} is {age} years old and likes {hobbies}");
        assert_eq!(doc.project(&Key::from("summary")), Value::from(expected));
    }
}

#[test]
fn test_sample_cards_deals_distinct_cards() {
    let compiled = compile_recipe(&demo("cards.yaml"), None).unwrap();
    let mut buffer = Vec::new();
    write_documents(&compiled, 20, &mut buffer).unwrap();

    let documents = parse_lines(&String::from_utf8(buffer).unwrap());
    assert_eq!(documents.len(), 20);

    for doc in documents {
        let hand = doc.as_str().unwrap();
        let cards: HashSet<&str> = hand
            .trim_start_matches("Your hand is ")
            .split(", ")
            .collect();
        assert_eq!(cards.len(), 5);
    }
}

#[test]
fn test_seed_override_is_reproducible() {
    let first = compile_recipe(&demo("profiles.yaml"), Some(42)).unwrap();
    let second = compile_recipe(&demo("profiles.yaml"), Some(42)).unwrap();
    let other = compile_recipe(&demo("profiles.yaml"), Some(43)).unwrap();

    assert_eq!(first.seed(), 42);
    let (a, b, c) = (first.sample(10), second.sample(10), other.sample(10));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_check_lists_named_generators() {
    let args = CheckArgs {
        recipe: demo("profiles.yaml"),
    };
    let mut buffer = Vec::new();
    run_check(&args, &mut buffer).unwrap();

    let report = String::from_utf8(buffer).unwrap();
    assert!(report.contains("is valid"));
    assert!(report.contains("Named generators: person"));
}

#[test]
fn test_check_reports_cycle() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"
generators:
  a: { type: ref, name: a }
output: { type: ref, name: a }
"#,
    )
    .unwrap();

    let args = CheckArgs {
        recipe: file.path().to_path_buf(),
    };
    let error = run_check(&args, Vec::new()).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("Failed to compile recipe"));
    assert!(message.contains("reference cycle"));
}

#[test]
fn test_missing_recipe_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = SampleArgs {
        recipe: dir.path().join("missing.yaml"),
        count: 1,
        seed: None,
        output: None,
    };

    let error = run_sample(&args).unwrap_err();
    assert!(format!("{error:#}").contains("Failed to load recipe"));
}
