/*!
 * End-to-end tests for the compiler and the elixir binary
 */

use std::fs::{self, File};
use std::io::Write;
use std::process::Command;

use elixir::{Compiler, Config, ElixirError, Strategy};
use tempfile::tempdir;

fn elixir() -> Command {
    Command::new(env!("CARGO_BIN_EXE_elixir"))
}

fn write_file(path: &std::path::Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

#[test]
fn test_cli_compiles_project() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("game");
    write_file(&src.join("Main.lua"), "print('Hello, World!')\n");
    write_file(&src.join("lib").join("Util.lua"), "return {}\n");
    let output = temp_dir.path().join("out").join("game");

    let status = elixir()
        .args([
            "-q",
            "--no-syntax-check",
            "--sort",
            "-m",
            "SampleProject",
            &src.to_string_lossy(),
            &output.to_string_lossy(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let xml = fs::read_to_string(temp_dir.path().join("out").join("game.rbxmx")).unwrap();
    assert!(xml.starts_with("<roblox "));
    assert!(xml.contains("<string name=\"Name\">SampleProject</string>"));
    assert!(xml.contains("<Item class=\"ModuleScript\" referent=\"RBX4\">"));
    assert!(xml.trim_end().ends_with("</roblox>"));
}

#[test]
fn test_cli_nevermore_processor() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    write_file(&src.join("Maid.lua"), "local Maid = {}\n");
    let output = temp_dir.path().join("model.rbxmx");

    let status = elixir()
        .args([
            "-q",
            "--no-syntax-check",
            "-p",
            "NevermoreProcessor",
            &src.to_string_lossy(),
            &output.to_string_lossy(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<Item class=\"ModuleScript\" referent=\"RBX2\">"));
}

#[test]
fn test_cli_missing_source_fails_without_output() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("model.rbxmx");

    let result = elixir()
        .args([
            "-q",
            &temp_dir.path().join("nope").to_string_lossy(),
            &output.to_string_lossy(),
        ])
        .output()
        .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("not found"));
}

#[test]
fn test_cli_unknown_processor_fails() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    write_file(&src.join("Main.lua"), "print(1)\n");
    let output = temp_dir.path().join("model.rbxmx");

    let result = elixir()
        .args([
            "-p",
            "RojoProcessor",
            &src.to_string_lossy(),
            &output.to_string_lossy(),
        ])
        .output()
        .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("RojoProcessor"));
}

#[test]
fn test_cli_generates_completions() {
    let result = elixir().args(["--generate", "bash"]).output().unwrap();
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("elixir"));
}

#[test]
fn test_missing_source_keeps_existing_output() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("model.rbxmx");
    fs::write(&output, "previous build").unwrap();

    let config = Config::new(temp_dir.path().join("missing"), &output);
    let err = Compiler::new(config).compile().unwrap_err();

    assert!(matches!(err, ElixirError::PathNotFound(_)));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous build");
}

#[test]
fn test_strategy_names() {
    assert_eq!(Strategy::from_name("BaseProcessor").unwrap(), Strategy::Default);
    assert_eq!(Strategy::from_name("nevermore").unwrap(), Strategy::Nevermore);
    assert!(matches!(
        Strategy::from_name("Rojo"),
        Err(ElixirError::UnknownStrategy(_))
    ));
}

#[test]
fn test_cli_extension_warning_printed_once() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    write_file(&src.join("Main.lua"), "print(1)\n");
    let output = temp_dir.path().join("model.txt");

    let result = elixir()
        .args([
            "--no-syntax-check",
            &src.to_string_lossy(),
            &output.to_string_lossy(),
        ])
        .env_remove("ELIXIR_LOG")
        .output()
        .unwrap();

    assert!(result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert_eq!(stderr.matches("does not end in .rbxmx").count(), 1);
}
