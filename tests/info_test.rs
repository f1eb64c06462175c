//! Integration tests for `pkgrecipe info` command
//!
//! - Resolves requirements from options (test framework only with testing)
//! - Shows the planned configure/build/test commands as argument lists
//! - Reports which artifact rules apply under the settings
//! - Applies profiles below CLI overrides
//! - Rejects undeclared options and out-of-domain values before planning

mod common;

use common::{describe, TestProject, GCC_SETTINGS, VISUAL_STUDIO_SETTINGS};
use serde_json::Value;

fn info_json(project: &TestProject, args: &[&str]) -> Value {
    let mut full = vec!["--json", "info"];
    full.extend_from_slice(args);
    let output = project.run(&full);
    assert!(output.status.success(), "{}", describe(&output));
    serde_json::from_slice(&output.stdout).expect("info prints JSON")
}

fn with_settings<'a>(settings: &[&'a str], extra: &[&'a str]) -> Vec<&'a str> {
    settings.iter().chain(extra).copied().collect()
}

fn pdb_rule_applies(info: &Value) -> bool {
    info["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|rule| rule["pattern"] == "*.pdb")
        .map(|rule| rule["applies"].as_bool().unwrap())
        .unwrap()
}

#[test]
fn test_info_release_without_testing() {
    let project = TestProject::with_sources();

    let info = info_json(&project, &with_settings(GCC_SETTINGS, &["-s", "build_type=Release"]));

    assert_eq!(info["name"], "oomuse-flags");
    assert_eq!(
        info["requirements"],
        serde_json::json!(["oomuse-core/0.1.1@lindurion/stable"])
    );
    assert_eq!(info["steps"].as_array().unwrap().len(), 2);
    assert_eq!(info["link_name"], "oomuse-flags");
    assert_eq!(info["options"]["testing"]["value"], "False");
    assert_eq!(info["options"]["testing"]["source"], "recipe");
}

#[test]
fn test_info_debug_with_testing() {
    let project = TestProject::with_sources();

    let info = info_json(
        &project,
        &with_settings(GCC_SETTINGS, &["-s", "build_type=Debug", "-o", "testing=True"]),
    );

    let requirements = info["requirements"].as_array().unwrap();
    assert_eq!(requirements.len(), 2);
    assert!(requirements[1].as_str().unwrap().starts_with("gtest/1.8.0@lasote/stable"));
    assert!(requirements[1].as_str().unwrap().contains("gtest:shared=False"));

    let steps = info["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    let configure: Vec<&str> = steps[0]["command"]["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_str().unwrap())
        .collect();
    assert!(configure.contains(&"-DCMAKE_BUILD_TYPE=Debug"));
    assert_eq!(configure.last(), Some(&"-DOOMUSE_FLAGS_TESTING=1"));
    assert_eq!(steps[2]["command"]["program"], "ctest");
    assert_eq!(
        steps[2]["command"]["args"],
        serde_json::json!(["-C", "Debug", "--output-on-failure"])
    );
    assert_eq!(info["link_name"], "oomuse-flags-debug");
    assert_eq!(info["options"]["testing"]["source"], "cli");
}

#[test]
fn test_info_debug_symbols_need_visual_studio_and_option() {
    let project = TestProject::with_sources();

    let vs_with = info_json(
        &project,
        &with_settings(VISUAL_STUDIO_SETTINGS, &["-o", "include_pdbs=True"]),
    );
    let vs_without = info_json(&project, VISUAL_STUDIO_SETTINGS);
    let gcc_with = info_json(&project, &with_settings(GCC_SETTINGS, &["-o", "include_pdbs=True"]));

    assert!(pdb_rule_applies(&vs_with));
    assert!(!pdb_rule_applies(&vs_without));
    assert!(!pdb_rule_applies(&gcc_with));

    let configure = &vs_with["steps"][0]["command"]["args"];
    assert_eq!(configure[2], "Visual Studio 15 2017 Win64");
    assert_eq!(
        vs_with["steps"][1]["command"]["args"].as_array().unwrap()[..4],
        [
            Value::from("--build"),
            Value::from("."),
            Value::from("--config"),
            Value::from("Release")
        ]
    );
}

#[test]
fn test_info_profile_below_cli() {
    let project = TestProject::with_sources();
    project.create_file(
        "ci.toml",
        r#"
[settings]
os = "Linux"
compiler = "clang"
"compiler.version" = 14
arch = "armv8"
build_type = "Debug"

[options]
testing = true
"#,
    );

    let info = info_json(&project, &["--profile", "ci.toml", "-s", "build_type=Release"]);

    assert_eq!(info["settings"]["compiler"], "clang");
    assert_eq!(info["settings"]["compiler.version"], "14");
    assert_eq!(info["settings"]["build_type"], "Release");
    assert_eq!(info["options"]["testing"]["value"], "True");
    assert_eq!(info["options"]["testing"]["source"], "profile");
}

#[test]
fn test_info_text_output() {
    let project = TestProject::with_sources();

    let mut args = vec!["info"];
    args.extend_from_slice(GCC_SETTINGS);
    let output = project.run(&args);

    assert!(output.status.success(), "{}", describe(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("oomuse-flags/0.1.0"));
    assert!(stdout.contains("oomuse-core/0.1.1@lindurion/stable"));
    assert!(!stdout.contains("gtest"));
    assert!(stdout.contains("link name: oomuse-flags"));
    assert!(stdout.contains("*.pdb -> lib/ [flatten] (skipped)"));
}

#[test]
fn test_info_rejects_undeclared_option() {
    let project = TestProject::with_sources();

    let output = project.run(&["info", "-o", "shared=True"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'shared' is not declared"));
}

#[test]
fn test_info_rejects_out_of_domain_value() {
    let project = TestProject::with_sources();

    let output = project.run(&["info", "-o", "testing=maybe"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid value 'maybe'"));
}

#[test]
fn test_info_rejects_unknown_dependency_scope() {
    let project = TestProject::with_sources();

    let output = project.run(&["info", "-o", "boost:shared=True"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("boost"));
}

#[test]
fn test_info_without_recipe_suggests_init() {
    let project = TestProject::new();

    let output = project.run(&["info"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pkgrecipe init"));
}
