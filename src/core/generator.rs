//! Build-info generator
//!
//! Renders `buildinfo.cmake`, which the package's CMakeLists includes to
//! find the include directories, library directories and link names of
//! every installed dependency.

use crate::core::cmake::DEFINE_PREFIX;
use crate::core::resolver::ResolvedDependency;

fn cmake_path(path: &std::path::Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('\\', "/"))
}

fn variable_suffix(name: &str) -> String {
    name.to_uppercase().replace(['-', '.', '+'], "_")
}

fn join_all<F>(dependencies: &[ResolvedDependency], f: F) -> String
where
    F: Fn(&ResolvedDependency) -> String,
{
    dependencies.iter().map(f).collect::<Vec<_>>().join(" ")
}

/// Render the build-info file for a set of installed dependencies
pub fn render_buildinfo(dependencies: &[ResolvedDependency]) -> String {
    let p = DEFINE_PREFIX;
    let mut out = String::from("# Generated by pkgrecipe. Do not edit.\n\n");

    for dep in dependencies {
        let suffix = variable_suffix(&dep.reference.name);
        out.push_str(&format!("# {}\n", dep.reference));
        out.push_str(&format!("set({p}_ROOT_{suffix} {})\n", cmake_path(&dep.root)));
        out.push_str(&format!(
            "set({p}_INCLUDE_DIRS_{suffix} {})\n",
            cmake_path(&dep.include_dir())
        ));
        out.push_str(&format!("set({p}_LIB_DIRS_{suffix} {})\n", cmake_path(&dep.lib_dir())));
        out.push_str(&format!("set({p}_BIN_DIRS_{suffix} {})\n", cmake_path(&dep.bin_dir())));
        out.push_str(&format!("set({p}_LIBS_{suffix} {})\n", dep.libs.join(" ")));
        out.push('\n');
    }

    let include_dirs = join_all(dependencies, |d| cmake_path(&d.include_dir()));
    let lib_dirs = join_all(dependencies, |d| cmake_path(&d.lib_dir()));
    let libs = join_all(dependencies, |d| d.libs.join(" "));
    let names = join_all(dependencies, |d| d.reference.name.clone());
    out.push_str(&format!("set({p}_INCLUDE_DIRS {include_dirs})\n"));
    out.push_str(&format!("set({p}_LIB_DIRS {lib_dirs})\n"));
    out.push_str(&format!("set({p}_LIBS {libs})\n"));
    out.push_str(&format!("set({p}_DEPENDENCIES {names})\n"));
    out.push('\n');

    out.push_str(&format!("macro({}_basic_setup)\n", p.to_lowercase()));
    out.push_str(&format!("    include_directories(${{{p}_INCLUDE_DIRS}})\n"));
    out.push_str(&format!("    link_directories(${{{p}_LIB_DIRS}})\n"));
    out.push_str("endmacro()\n");
    out
}
