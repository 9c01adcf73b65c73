use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use revdoc::config::Config;
use revdoc::core::{Category, Engine};

const C_SOURCE: &str = "int main() {\n    for (int i = 0; i < 3; i++) {\n        printf(\"%d\", i);\n    }\n    return 0;\n}\n";

fn engine() -> Engine {
    Engine::from_config(Config::default()).unwrap()
}

#[tokio::test]
async fn test_generate_single_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.child("main.c");
    source.write_str(C_SOURCE).unwrap();
    let out = temp.child("out");

    let written = engine()
        .generate(source.path(), None, Some(out.path().to_path_buf()), false)
        .await
        .unwrap();
    assert_eq!(written.len(), 1);

    out.child("pseudocode.txt").assert(predicate::str::starts_with("BEGIN\n"));
    out.child("pseudocode.txt").assert(predicate::str::contains("PROCEDURE main(...)"));
    out.child("pseudocode.txt").assert(predicate::str::contains("END FOR"));
    out.child("pseudocode.txt").assert(predicate::str::contains("RETURN 0"));
    out.child("flowchart.mmd").assert(predicate::str::starts_with("flowchart TD\n"));
    out.child("flowchart.mmd").assert(predicate::str::contains("\r").not());
    out.child("flowchart.html").assert(predicate::str::contains("mermaid@10"));
    out.child("manifest.json").assert(predicate::str::contains("\"language\": \"c\""));

    temp.close().unwrap();
}

#[tokio::test]
async fn test_generate_without_html() {
    let temp = TempDir::new().unwrap();
    let source = temp.child("app.py");
    source.write_str("def run():\n    print('hi')\n").unwrap();
    let out = temp.child("out");

    engine()
        .generate(source.path(), None, Some(out.path().to_path_buf()), true)
        .await
        .unwrap();

    out.child("pseudocode.txt").assert(predicate::path::exists());
    out.child("flowchart.html").assert(predicate::path::missing());
}

#[tokio::test]
async fn test_generate_directory() {
    let temp = TempDir::new().unwrap();
    let project = temp.child("project");
    project.child("src/main.c").write_str(C_SOURCE).unwrap();
    project.child("tools/build.py").write_str("x = input()\nprint(x)\n").unwrap();
    project.child("notes.txt").write_str("not code\n").unwrap();
    project.child("vendor/skip.go").write_str("func main() {\n}\n").unwrap();
    project.child(".gitignore").write_str("vendor/\n").unwrap();
    let out = temp.child("out");

    let written = engine()
        .generate(project.path(), None, Some(out.path().to_path_buf()), false)
        .await
        .unwrap();
    assert_eq!(written.len(), 2);

    out.child("src/main_c/pseudocode.txt").assert(predicate::path::exists());
    out.child("tools/build_py/flowchart.mmd").assert(predicate::str::contains("[/x = input/]"));
    out.child("notes_txt").assert(predicate::path::missing());
    out.child("vendor").assert(predicate::path::missing());
}

#[tokio::test]
async fn test_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let result = engine()
        .generate(&temp.path().join("nope.c"), None, Some(temp.path().to_path_buf()), false)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_language_selection() {
    let temp = TempDir::new().unwrap();
    let source = temp.child("snippet.txt");
    source.write_str("if x {\n    y();\n}\n").unwrap();

    let steps = engine().steps(source.path(), Some("golang")).await.unwrap();
    assert_eq!(steps[1].category, Category::If);
    assert_eq!(steps[2].depth, 1);

    // Unknown selectors fall back to the configured default
    let steps = engine().steps(source.path(), Some("cobol")).await.unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[3].text, "}");
}

#[tokio::test]
async fn test_steps_are_bracketed() {
    let temp = TempDir::new().unwrap();
    let source = temp.child("main.c");
    source.write_str(C_SOURCE).unwrap();

    let steps = engine().steps(source.path(), None).await.unwrap();
    let categories: Vec<Category> = steps.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Start,
            Category::Function,
            Category::For,
            Category::IoOut,
            Category::Return,
            Category::End,
        ]
    );

    let json = serde_json::to_string(&steps).unwrap();
    assert!(json.contains("\"category\":\"io_out\""));
}

#[tokio::test]
async fn test_config_file_changes_rendering() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("revdoc.toml");
    config
        .write_str("[generation]\niso_shapes = false\n\n[output]\ninclude_metadata = false\n")
        .unwrap();
    let source = temp.child("main.c");
    source.write_str(C_SOURCE).unwrap();
    let out = temp.child("out");

    let engine = Engine::new(Some(config.path())).await.unwrap();
    assert!(!engine.config().generation.iso_shapes);

    engine
        .generate(source.path(), None, Some(out.path().to_path_buf()), false)
        .await
        .unwrap();

    out.child("flowchart.mmd").assert(predicate::str::contains("[OUTPUT: printf%d, i；]"));
    out.child("manifest.json").assert(predicate::path::missing());
}

#[tokio::test]
async fn test_init_refuses_overwrite() {
    let temp = TempDir::new().unwrap();
    let engine = engine();

    let path = engine.init(Some(temp.path().to_path_buf()), false).await.unwrap();
    temp.child("revdoc.toml").assert(predicate::str::contains("[generation]"));
    assert_eq!(Config::load(&path).unwrap(), Config::default());

    assert!(engine.init(Some(temp.path().to_path_buf()), false).await.is_err());
    assert!(engine.init(Some(temp.path().to_path_buf()), true).await.is_ok());
}
