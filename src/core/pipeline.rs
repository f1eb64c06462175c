//! End-to-end build pipeline
//!
//! Runs one recipe evaluation in order:
//!
//! 1. resolve requirements and plan the build (no side effects yet)
//! 2. install requirements through the dependency manager
//! 3. export sources into a fresh build directory
//! 4. import runtime libraries from dependencies and write `buildinfo.cmake`
//! 5. configure, build and optionally test
//! 6. copy artifacts and write the package metadata
//!
//! Every configuration error surfaces in step 1, before any dependency is
//! installed or any process starts. A failing step ends the run; the
//! package directory is only touched once the build is ready.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults::{
    BUILDINFO_FILE, DEFAULT_BUILD_DIR, DEFAULT_PACKAGE_DIR, EXPORT_EXCLUDES, MANIFEST_FILE,
    PACKAGE_INFO_FILE,
};
use crate::core::builder::{BuildInvocation, BuildOrchestrator, BuildResult, CommandRunner, Tools};
use crate::core::generator::render_buildinfo;
use crate::core::options::OptionSet;
use crate::core::packaging::{
    copy_artifacts, select_matches, write_manifest, ArtifactCopy, PackageInfo, PackageMetadata,
    PackagingSelector,
};
use crate::core::recipe::Recipe;
use crate::core::resolver::{
    DependencyManager, Requirement, RequirementResolver, ResolvedDependency,
};
use crate::core::settings::PlatformSettings;
use crate::error::{FilesystemError, PkgRecipeError};
use crate::infra::filesystem;

/// Directories and tools for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the recipe and its sources
    pub recipe_dir: PathBuf,
    /// Working directory for configure/build/test; recreated every run
    pub build_dir: PathBuf,
    /// Package output directory; recreated once the build is ready
    pub package_dir: PathBuf,
    pub tools: Tools,
    pub jobs: Option<usize>,
}

impl PipelineConfig {
    /// Default layout: `build/` and `package/` next to the recipe
    pub fn new(recipe_dir: PathBuf) -> Self {
        Self {
            build_dir: recipe_dir.join(DEFAULT_BUILD_DIR),
            package_dir: recipe_dir.join(DEFAULT_PACKAGE_DIR),
            recipe_dir,
            tools: Tools::default(),
            jobs: None,
        }
    }

    #[must_use]
    pub fn with_build_dir(mut self, build_dir: PathBuf) -> Self {
        self.build_dir = build_dir;
        self
    }

    #[must_use]
    pub fn with_package_dir(mut self, package_dir: PathBuf) -> Self {
        self.package_dir = package_dir;
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Resolve the directories and reject outputs that would wipe sources
    ///
    /// Paths are compared after resolving `..` and symlinks. An existing
    /// output directory is only accepted when it is empty or carries the
    /// marker file a previous run left in it.
    pub fn resolve_dirs(&self) -> Result<Self, FilesystemError> {
        let resolved = Self {
            recipe_dir: filesystem::normalize_path(&self.recipe_dir),
            build_dir: filesystem::normalize_path(&self.build_dir),
            package_dir: filesystem::normalize_path(&self.package_dir),
            tools: self.tools.clone(),
            jobs: self.jobs,
        };
        let unsafe_target = |path: &Path, reason: &str| FilesystemError::UnsafeTarget {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        for dir in [&resolved.build_dir, &resolved.package_dir] {
            if resolved.recipe_dir.starts_with(dir) {
                return Err(unsafe_target(dir, "it contains the recipe directory"));
            }
        }
        if resolved.build_dir.starts_with(&resolved.package_dir)
            || resolved.package_dir.starts_with(&resolved.build_dir)
        {
            return Err(unsafe_target(
                &resolved.package_dir,
                "build and package directories must not nest",
            ));
        }
        if is_foreign(&resolved.build_dir, &[BUILDINFO_FILE]) {
            return Err(unsafe_target(
                &resolved.build_dir,
                "it is not empty and holds no previous build",
            ));
        }
        if is_foreign(&resolved.package_dir, &[PACKAGE_INFO_FILE, MANIFEST_FILE]) {
            return Err(unsafe_target(
                &resolved.package_dir,
                "it is not empty and holds no previous package",
            ));
        }
        Ok(resolved)
    }

    /// Sibling directory a package is assembled in before it replaces
    /// `package_dir`
    pub fn staging_dir(&self) -> PathBuf {
        let name = self
            .package_dir
            .file_name()
            .map_or_else(|| DEFAULT_PACKAGE_DIR.into(), |n| n.to_string_lossy());
        self.package_dir.with_file_name(format!(".{name}.partial"))
    }
}

/// Existing, non-empty directory without any of the given marker files
fn is_foreign(dir: &Path, markers: &[&str]) -> bool {
    filesystem::has_entries(dir) && !markers.iter().any(|marker| dir.join(marker).is_file())
}

/// What a run would do, computed without side effects
#[derive(Debug, Clone, Serialize)]
pub struct PipelinePlan {
    pub requirements: Vec<Requirement>,
    pub invocation: BuildInvocation,
    pub metadata: PackageMetadata,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub requirements: Vec<Requirement>,
    pub dependencies: Vec<ResolvedDependency>,
    pub build: BuildResult,
    /// Packaged files relative to `package_dir`, in copy order
    pub packaged: Vec<PathBuf>,
    pub metadata: PackageMetadata,
    pub package_dir: PathBuf,
}

/// One recipe evaluation under fixed options and settings
#[derive(Debug)]
pub struct Pipeline<'a> {
    recipe: &'a Recipe,
    options: &'a OptionSet,
    settings: &'a PlatformSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(recipe: &'a Recipe, options: &'a OptionSet, settings: &'a PlatformSettings) -> Self {
        Self {
            recipe,
            options,
            settings,
        }
    }

    fn orchestrator(&self, config: &PipelineConfig) -> BuildOrchestrator {
        BuildOrchestrator::new(&self.recipe.package.testing_define())
            .with_tools(config.tools.clone())
            .with_jobs(config.jobs)
    }

    /// Resolve requirements and plan the build commands
    pub fn plan(&self, config: &PipelineConfig) -> Result<PipelinePlan, PkgRecipeError> {
        let requirements = RequirementResolver::new(self.recipe).resolve(self.options)?;
        let invocation = self
            .orchestrator(config)
            .plan(self.options, self.settings, &config.build_dir)?;
        for rule in self.recipe.imports.iter().chain(&self.recipe.artifacts) {
            rule.applies(self.settings, self.options)?;
        }
        let metadata = PackagingSelector::new(self.recipe).compute_metadata(self.settings);
        Ok(PipelinePlan {
            requirements,
            invocation,
            metadata,
        })
    }

    /// Run every stage, stopping at the first failure
    pub fn run<D, R>(
        &self,
        config: &PipelineConfig,
        dependencies: &D,
        runner: &R,
    ) -> Result<PipelineReport, PkgRecipeError>
    where
        D: DependencyManager + ?Sized,
        R: CommandRunner + ?Sized,
    {
        let config = &config.resolve_dirs()?;
        let plan = self.plan(config)?;
        tracing::info!(
            "Building {}/{} ({})",
            self.recipe.package.name,
            self.recipe.package.version,
            self.settings
        );

        let installed =
            dependencies.install(&plan.requirements, self.recipe.package.build_policy)?;

        self.prepare_build_dir(config, &installed)?;

        let build = self.orchestrator(config).execute(&plan.invocation, runner)?;

        let selector = PackagingSelector::new(self.recipe);
        let copies = selector.select_artifacts(&build.output_dir, self.settings, self.options)?;

        let staging = config.staging_dir();
        filesystem::remove_dir_all(&staging)?;
        filesystem::create_dir_all(&staging)?;
        let packaged = match self.assemble_package(&plan, &copies, &staging) {
            Ok(packaged) => packaged,
            Err(e) => {
                if let Err(cleanup) = filesystem::remove_dir_all(&staging) {
                    tracing::warn!("{cleanup}");
                }
                return Err(e);
            }
        };
        filesystem::remove_dir_all(&config.package_dir)?;
        filesystem::rename(&staging, &config.package_dir)?;
        tracing::info!(
            "Packaged {} file(s) into {}",
            packaged.len(),
            config.package_dir.display()
        );

        Ok(PipelineReport {
            requirements: plan.requirements,
            dependencies: installed,
            build,
            packaged,
            metadata: plan.metadata,
            package_dir: config.package_dir.clone(),
        })
    }

    /// Copy artifacts and write the package metadata into `target`
    fn assemble_package(
        &self,
        plan: &PipelinePlan,
        copies: &[ArtifactCopy],
        target: &Path,
    ) -> Result<Vec<PathBuf>, PkgRecipeError> {
        let packaged = copy_artifacts(copies, target)?;
        let requires = plan
            .requirements
            .iter()
            .map(|r| r.reference.to_string())
            .collect();
        PackageInfo::new(
            self.recipe,
            self.settings,
            self.options,
            requires,
            plan.metadata.clone(),
        )
        .write(target)?;
        write_manifest(target, &packaged)?;
        Ok(packaged)
    }

    /// Fresh build directory holding sources, imports and build info
    fn prepare_build_dir(
        &self,
        config: &PipelineConfig,
        installed: &[ResolvedDependency],
    ) -> Result<(), PkgRecipeError> {
        filesystem::remove_dir_all(&config.build_dir)?;

        let mut exclude = vec![
            config.build_dir.clone(),
            config.package_dir.clone(),
            config.staging_dir(),
        ];
        exclude.extend(EXPORT_EXCLUDES.iter().map(PathBuf::from));
        let exported = filesystem::copy_tree(&config.recipe_dir, &config.build_dir, &exclude)?;
        tracing::debug!("Exported {exported} source file(s) into {}", config.build_dir.display());

        for dependency in installed {
            let copies = select_matches(
                &self.recipe.imports,
                &dependency.root,
                self.settings,
                self.options,
            )?;
            let imported = copy_artifacts(&copies, &config.build_dir)?;
            if !imported.is_empty() {
                tracing::debug!(
                    "Imported {} file(s) from {}",
                    imported.len(),
                    dependency.reference
                );
            }
        }

        let buildinfo = render_buildinfo(installed);
        filesystem::write_file(&config.build_dir.join(BUILDINFO_FILE), &buildinfo)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::DEFAULT_RECIPE;
    use crate::core::builder::tests::{gcc, ScriptedRunner};
    use crate::core::builder::{StepExit, StepKind};
    use crate::core::resolver::BuildPolicy;
    use crate::core::settings::{Arch, BuildType, Compiler, CompilerName, Os};
    use crate::error::{BuildError, OptionError, RequirementError};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Serves every requirement from a directory with a runtime library
    struct FakeDependencies {
        root: TempDir,
        installed: RefCell<Vec<(String, BuildPolicy)>>,
    }

    impl FakeDependencies {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            touch(root.path(), "oomuse-core/bin/oomuse-core.dll");
            touch(root.path(), "oomuse-core/lib/liboomuse-core.dylib.1");
            touch(root.path(), "oomuse-core/lib/liboomuse-core.a");
            Self {
                root,
                installed: RefCell::new(Vec::new()),
            }
        }

        fn names(&self) -> Vec<String> {
            self.installed.borrow().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    impl DependencyManager for FakeDependencies {
        fn install(
            &self,
            requirements: &[Requirement],
            policy: BuildPolicy,
        ) -> Result<Vec<ResolvedDependency>, RequirementError> {
            Ok(requirements
                .iter()
                .map(|r| {
                    self.installed.borrow_mut().push((r.reference.name.clone(), policy));
                    ResolvedDependency {
                        reference: r.reference.clone(),
                        root: self.root.path().join(&r.reference.name),
                        libs: vec![r.reference.name.clone()],
                    }
                })
                .collect())
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    /// A recipe directory with sources and prebuilt outputs
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("recipe.toml"), DEFAULT_RECIPE).unwrap();
        touch(dir.path(), "CMakeLists.txt");
        touch(dir.path(), "include/oomuse/flags/flags.h");
        touch(dir.path(), "src/oomuse/flags/flags.cpp");
        touch(dir.path(), "out/liboomuse-flags.a");
        touch(dir.path(), "Release/oomuse-flags.lib");
        touch(dir.path(), "Release/oomuse-flags.pdb");
        touch(dir.path(), ".git/HEAD");
        dir
    }

    fn visual_studio() -> PlatformSettings {
        PlatformSettings {
            os: Os::Windows,
            compiler: Compiler {
                name: CompilerName::VisualStudio,
                version: Some("15".to_string()),
            },
            build_type: BuildType::Release,
            arch: Arch::X86_64,
        }
    }

    fn recipe() -> Recipe {
        Recipe::from_toml(DEFAULT_RECIPE).unwrap()
    }

    // ============================================
    // Scenario Tests
    // ============================================

    #[test]
    fn test_release_build_without_tests_packages_headers_and_library() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());
        let deps = FakeDependencies::new();
        let runner = ScriptedRunner::default();

        let report = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &deps, &runner)
            .unwrap();

        assert_eq!(runner.kinds(), vec![StepKind::Configure, StepKind::Build]);
        assert_eq!(report.metadata.link_name(), Some("oomuse-flags"));
        assert_eq!(deps.names(), vec!["oomuse-core"]);

        let package = project.path().join("package");
        assert!(package.join("include/oomuse/flags/flags.h").is_file());
        assert!(package.join("lib/liboomuse-flags.a").is_file());
        assert!(!package.join("lib/oomuse-flags.pdb").exists());
        assert!(package.join(PACKAGE_INFO_FILE).is_file());
        assert!(package.join(MANIFEST_FILE).is_file());

        let info = PackageInfo::load(&package).unwrap();
        assert_eq!(info.cpp_info.libs, vec!["oomuse-flags"]);
        assert_eq!(info.requires, vec!["oomuse-core/0.1.1@lindurion/stable"]);
    }

    #[test]
    fn test_build_dir_holds_exported_sources_imports_and_buildinfo() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());

        Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap();

        let build = project.path().join("build");
        assert!(build.join("CMakeLists.txt").is_file());
        assert!(build.join("bin/oomuse-core.dll").is_file());
        assert!(build.join("bin/liboomuse-core.dylib.1").is_file());
        assert!(!build.join("bin/liboomuse-core.a").exists());
        assert!(!build.join(".git").exists());
        assert!(!build.join("package").exists());
        let buildinfo = fs::read_to_string(build.join(BUILDINFO_FILE)).unwrap();
        assert!(buildinfo.contains("RECIPE_LIBS_OOMUSE_CORE oomuse-core"));
    }

    #[test]
    fn test_failed_tests_copy_nothing() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, true);
        let settings = gcc(BuildType::Debug);
        let config = PipelineConfig::new(project.path().to_path_buf());
        let deps = FakeDependencies::new();
        let runner = ScriptedRunner::failing(StepKind::Test, StepExit::Code(1));

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &deps, &runner)
            .unwrap_err();

        assert!(matches!(
            err,
            PkgRecipeError::Build(BuildError::TestFailure { .. })
        ));
        assert_eq!(
            runner.kinds(),
            vec![StepKind::Configure, StepKind::Build, StepKind::Test]
        );
        assert_eq!(deps.names(), vec!["oomuse-core", "gtest"]);
        assert!(!project.path().join("package").exists());
    }

    #[test]
    fn test_passing_tests_debug_link_name() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, true);
        let settings = gcc(BuildType::Debug);
        let config = PipelineConfig::new(project.path().to_path_buf());

        let report = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap();

        assert_eq!(report.metadata.link_name(), Some("oomuse-flags-debug"));
        assert_eq!(report.build.steps_run.len(), 3);
        let configure = &report.build.steps_run[0];
        assert_eq!(*configure, StepKind::Configure);
    }

    #[test]
    fn test_visual_studio_pdbs_flattened_into_lib() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(true, false);
        let settings = visual_studio();
        let config = PipelineConfig::new(project.path().to_path_buf());

        let report = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap();

        assert!(report.packaged.contains(&PathBuf::from("lib/oomuse-flags.pdb")));
        assert!(report.packaged.contains(&PathBuf::from("lib/oomuse-flags.lib")));
        assert!(project.path().join("package/lib/oomuse-flags.pdb").is_file());
    }

    // ============================================
    // Unit Tests - Failure ordering
    // ============================================

    #[test]
    fn test_configuration_error_precedes_any_side_effect() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let mut settings = visual_studio();
        settings.compiler.version = None;
        let config = PipelineConfig::new(project.path().to_path_buf());
        let deps = FakeDependencies::new();
        let runner = ScriptedRunner::default();

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &deps, &runner)
            .unwrap_err();

        assert!(matches!(
            err,
            PkgRecipeError::Option(OptionError::MissingSetting { .. })
        ));
        assert!(err.is_configuration_error());
        assert!(deps.names().is_empty());
        assert!(runner.kinds().is_empty());
        assert!(!project.path().join("build").exists());
    }

    #[test]
    fn test_build_failure_leaves_previous_package_untouched() {
        let project = project();
        touch(project.path(), "package/lib/stale.a");
        touch(project.path(), "package/package_info.toml");
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());
        let runner = ScriptedRunner::failing(StepKind::Build, StepExit::Code(2));

        let result = Pipeline::new(&recipe, &options, &settings).run(
            &config,
            &FakeDependencies::new(),
            &runner,
        );

        assert!(result.is_err());
        assert!(project.path().join("package/lib/stale.a").is_file());
    }

    #[test]
    fn test_missing_required_headers_fail_packaging() {
        let project = project();
        fs::remove_dir_all(project.path().join("include")).unwrap();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap_err();
        assert!(err.to_string().contains("*.h"));
    }

    #[test]
    fn test_packaging_failure_keeps_previous_package() {
        let project = project();
        touch(project.path(), "package/lib/stale.a");
        touch(project.path(), "package/package_info.toml");
        // Second rule needs a directory where the first one put a file
        let extra_rule = r#"
[[artifacts]]
pattern = "*.lib"
dst = "lib/liboomuse-flags.a"
keep_path = false
"#;
        let recipe = Recipe::from_toml(&format!("{DEFAULT_RECIPE}{extra_rule}")).unwrap();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap_err();

        assert!(matches!(err, PkgRecipeError::Packaging(_)));
        assert!(project.path().join("package/lib/stale.a").is_file());
        assert!(project.path().join("package/package_info.toml").is_file());
        assert!(!project.path().join(".package.partial").exists());
    }

    #[test]
    fn test_rebuild_replaces_previous_package() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf());
        let pipeline = Pipeline::new(&recipe, &options, &settings);

        pipeline
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap();
        touch(project.path(), "package/lib/stale.a");
        pipeline
            .run(&config, &FakeDependencies::new(), &ScriptedRunner::default())
            .unwrap();

        assert!(!project.path().join("package/lib/stale.a").exists());
        assert!(project.path().join("package/lib/liboomuse-flags.a").is_file());
    }

    // ============================================
    // Unit Tests - Output directory safety
    // ============================================

    #[test]
    fn test_build_dir_containing_recipe_rejected() {
        let project = project();
        let config = PipelineConfig::new(project.path().join("src"))
            .with_build_dir(project.path().to_path_buf());
        assert!(matches!(
            config.resolve_dirs(),
            Err(FilesystemError::UnsafeTarget { .. })
        ));
    }

    #[test]
    fn test_parent_component_build_dir_rejected() {
        let outer = TempDir::new().unwrap();
        let recipe_dir = outer.path().join("proj");
        fs::create_dir_all(&recipe_dir).unwrap();
        fs::write(recipe_dir.join("recipe.toml"), DEFAULT_RECIPE).unwrap();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(recipe_dir.clone()).with_build_dir(recipe_dir.join(".."));
        let deps = FakeDependencies::new();

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &deps, &ScriptedRunner::default())
            .unwrap_err();

        assert!(matches!(
            err,
            PkgRecipeError::Filesystem(FilesystemError::UnsafeTarget { .. })
        ));
        assert!(deps.names().is_empty());
        assert!(recipe_dir.join("recipe.toml").is_file());
    }

    #[test]
    fn test_parent_component_package_dir_rejected() {
        let project = project();
        let config = PipelineConfig::new(project.path().to_path_buf())
            .with_package_dir(project.path().join("src/.."));
        assert!(matches!(
            config.resolve_dirs(),
            Err(FilesystemError::UnsafeTarget { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_recipe_dir_rejected() {
        let outer = TempDir::new().unwrap();
        let recipe_dir = outer.path().join("proj");
        fs::create_dir_all(&recipe_dir).unwrap();
        let link = outer.path().join("out");
        std::os::unix::fs::symlink(&recipe_dir, &link).unwrap();

        let config = PipelineConfig::new(recipe_dir).with_build_dir(link);
        assert!(matches!(
            config.resolve_dirs(),
            Err(FilesystemError::UnsafeTarget { .. })
        ));
    }

    #[test]
    fn test_source_subdir_as_package_dir_rejected() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, false);
        let settings = gcc(BuildType::Release);
        let config = PipelineConfig::new(project.path().to_path_buf())
            .with_package_dir(project.path().join("src"));
        let runner = ScriptedRunner::default();

        let err = Pipeline::new(&recipe, &options, &settings)
            .run(&config, &FakeDependencies::new(), &runner)
            .unwrap_err();

        assert!(err.to_string().contains("holds no previous package"));
        assert!(runner.kinds().is_empty());
        assert!(project.path().join("src/oomuse/flags/flags.cpp").is_file());
    }

    #[test]
    fn test_source_subdir_as_build_dir_rejected() {
        let project = project();
        let config = PipelineConfig::new(project.path().to_path_buf())
            .with_build_dir(project.path().join("include"));

        let err = config.resolve_dirs().unwrap_err();

        assert!(err.to_string().contains("holds no previous build"));
        assert!(project.path().join("include/oomuse/flags/flags.h").is_file());
    }

    #[test]
    fn test_empty_or_previous_output_dirs_accepted() {
        let project = project();
        fs::create_dir_all(project.path().join("build")).unwrap();
        touch(project.path(), "package/manifest.txt");
        let config = PipelineConfig::new(project.path().to_path_buf());

        let resolved = config.resolve_dirs().unwrap();
        assert_eq!(
            resolved.staging_dir(),
            resolved.package_dir.with_file_name(".package.partial")
        );
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let project = project();
        let recipe = recipe();
        let options = OptionSet::new(false, true);
        let settings = gcc(BuildType::Debug);
        let config = PipelineConfig::new(project.path().to_path_buf()).with_jobs(Some(8));

        let plan = Pipeline::new(&recipe, &options, &settings).plan(&config).unwrap();
        assert_eq!(plan.requirements.len(), 2);
        assert!(plan.invocation.has_test_step());
        assert!(plan.invocation.steps()[1]
            .command
            .args
            .ends_with(&["--parallel".to_string(), "8".to_string()]));
        assert!(!project.path().join("build").exists());
    }
}
