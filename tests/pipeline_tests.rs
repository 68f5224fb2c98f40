//! End-to-end tests for the analysis pipeline
//!
//! Drives `analyze` over small in-memory projects and checks the parsed
//! units, both graphs and the synthesized diagrams together.

use pretty_assertions::assert_eq;
use vespucci::{
    analyze, AnalysisConfig, DiagramType, Language, ParseStrategy, ParserRegistry, SourceInput,
    UnitType,
};

fn typescript_project() -> Vec<SourceInput> {
    vec![
        SourceInput::new(
            "a.ts",
            "import { baz } from './b';\n\nclass Foo {\n  bar() { baz() }\n}\n\nclass Qux extends Foo {\n  run() { this.bar(); }\n}\n",
        ),
        SourceInput::new("b.ts", "export function baz() {}\n"),
    ]
}

#[test]
fn test_typescript_cross_file_links() {
    let analysis = analyze(&typescript_project(), &ParserRegistry::new(), &AnalysisConfig::default());

    let a = analysis.file("a.ts").unwrap();
    assert_eq!(a.strategy, ParseStrategy::Grammar);
    assert_eq!(a.imports.len(), 1);
    let classes: Vec<&str> = a.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(classes, vec!["Foo", "Qux"]);
    assert_eq!(a.classes[0].children[0].qualified_name, "Foo.bar");
    assert_eq!(a.classes[0].children[0].unit_type, UnitType::Method);

    assert_eq!(analysis.call_graph.callees("a.ts:Foo.bar"), ["b.ts:baz"]);
    assert_eq!(analysis.call_graph.callees("a.ts:Qux.run"), ["a.ts:Foo.bar"]);
    assert_eq!(analysis.import_graph.dependencies("a.ts"), ["b.ts"]);
    assert!(analysis.import_graph.dependencies("b.ts").is_empty());

    let class_diagram = analysis
        .diagrams
        .iter()
        .find(|d| d.diagram_type == DiagramType::ClassHierarchy)
        .expect("class diagram for two classes");
    assert!(class_diagram.body.starts_with("classDiagram\n"));
    assert!(class_diagram.body.contains("    class Foo {\n        +bar()\n    }\n"));
    assert!(class_diagram.body.contains("    Foo <|-- Qux\n"));
}

#[test]
fn test_analysis_is_deterministic() {
    let registry = ParserRegistry::new();
    let config = AnalysisConfig::default();
    let first = analyze(&typescript_project(), &registry, &config);
    let second = analyze(&typescript_project(), &registry, &config);
    assert_eq!(first, second);

    let single = AnalysisConfig {
        workers: Some(1),
        ..AnalysisConfig::default()
    };
    assert_eq!(first, analyze(&typescript_project(), &registry, &single));
}

#[test]
fn test_unit_ids_stable_and_path_scoped() {
    let registry = ParserRegistry::new();
    let config = AnalysisConfig::default();
    let source = "def f():\n    pass\n";

    let one = analyze(&[SourceInput::new("x/m.py", source)], &registry, &config);
    let two = analyze(&[SourceInput::new("x/m.py", source)], &registry, &config);
    let moved = analyze(&[SourceInput::new("y/m.py", source)], &registry, &config);

    let id = |a: &vespucci::Analysis| a.files[0].functions[0].unit_id.clone();
    assert_eq!(id(&one), id(&two));
    assert_ne!(id(&one), id(&moved));
}

#[test]
fn test_forced_fallback_keeps_structure() {
    let inputs = vec![SourceInput::new(
        "svc.py",
        "class Service:\n    def start(self):\n        self.load()\n\n    def load(self):\n        pass\n\ndef main():\n    Service().start()\n",
    )];
    let config = AnalysisConfig::default();

    let grammar = analyze(&inputs, &ParserRegistry::new(), &config);
    let fallback = analyze(&inputs, &ParserRegistry::new().without(Language::Python), &config);

    assert_eq!(grammar.files[0].strategy, ParseStrategy::Grammar);
    assert_eq!(fallback.files[0].strategy, ParseStrategy::Indentation);
    assert!(fallback.files[0].parse_success);

    let names = |a: &vespucci::Analysis| -> Vec<String> {
        a.files[0].units().map(|u| u.qualified_name.clone()).collect()
    };
    assert_eq!(names(&grammar), names(&fallback));
    assert_eq!(
        fallback.call_graph.callees("svc.py:Service.start"),
        ["svc.py:Service.load"]
    );
}

#[test]
fn test_empty_registry_still_yields_units() {
    let inputs = vec![
        SourceInput::new("lib.rs", "fn alpha() {}\n\nfn beta() {\n    alpha();\n}\n"),
        SourceInput::new("notes.md", "# Notes\n"),
    ];
    let analysis = analyze(&inputs, &ParserRegistry::empty(), &AnalysisConfig::default());

    assert_eq!(analysis.files[0].strategy, ParseStrategy::Brace);
    let names: Vec<&str> = analysis.files[0].functions.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(analysis.call_graph.callees("lib.rs:beta"), ["lib.rs:alpha"]);

    assert_eq!(analysis.files[1].strategy, ParseStrategy::WholeFile);
    assert_eq!(analysis.files[1].total_units(), 1);
}

#[test]
fn test_multi_language_summary() {
    let inputs = vec![
        SourceInput::new("src/main.rs", "fn main() {\n    run();\n}\n\nfn run() {}\n"),
        SourceInput::new("tools/gen.py", "def gen():\n    pass\n"),
        SourceInput::new("App.java", "public class App {\n    void go() {}\n}\n"),
        SourceInput::new("cmd/server.go", "package main\n\nfunc Serve() {\n}\n"),
        SourceInput::new("lib/tasks.rb", "def task\n  1\nend\n"),
        SourceInput::new("script", "def hinted():\n    pass\n").with_hint("python"),
    ];
    let analysis = analyze(&inputs, &ParserRegistry::new(), &AnalysisConfig::default());
    let summary = analysis.summary();

    assert_eq!(summary.files, 6);
    assert_eq!(summary.languages.get("rust"), Some(&1));
    assert_eq!(summary.languages.get("python"), Some(&2));
    assert_eq!(summary.languages.get("java"), Some(&1));
    assert_eq!(summary.languages.get("go"), Some(&1));
    assert_eq!(summary.languages.get("ruby"), Some(&1));
    assert_eq!(summary.failed_parses, 0);

    assert_eq!(analysis.file("script").unwrap().strategy, ParseStrategy::Grammar);
    assert_eq!(analysis.file("cmd/server.go").unwrap().strategy, ParseStrategy::Brace);
    assert_eq!(analysis.file("lib/tasks.rb").unwrap().strategy, ParseStrategy::WholeFile);
    assert!(analysis.files.iter().all(|f| f.total_units() >= 1));
}

#[test]
fn test_json_round_trip_of_analysis() {
    let analysis = analyze(&typescript_project(), &ParserRegistry::new(), &AnalysisConfig::default());
    let json = serde_json::to_string(&analysis).unwrap();
    let back: vespucci::Analysis = serde_json::from_str(&json).unwrap();
    assert_eq!(analysis, back);
}
