//! Local package cache
//!
//! Dependency manager backed by a directory of installed packages laid out
//! as `<root>/<name>/<version>/<user>/<channel>/package`. Each package root
//! carries the `package_info.toml` written when it was packaged.
//!
//! The cache never fetches or builds; an absent package is reported with the
//! recipe's build policy so the caller can act on it.

use std::path::{Path, PathBuf};

use crate::core::packaging::PackageInfo;
use crate::core::resolver::{
    BuildPolicy, DependencyManager, PackageReference, Requirement, ResolvedDependency,
};
use crate::error::RequirementError;

const PACKAGE_SUBDIR: &str = "package";

/// Dependency manager over a local cache directory
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package root of a reference in this cache
    pub fn package_dir(&self, reference: &PackageReference) -> PathBuf {
        self.root.join(reference.cache_path()).join(PACKAGE_SUBDIR)
    }

    fn lookup(
        &self,
        requirement: &Requirement,
        policy: BuildPolicy,
    ) -> Result<ResolvedDependency, RequirementError> {
        let reference = &requirement.reference;
        let dir = self.package_dir(reference);
        if !dir.is_dir() {
            return Err(RequirementError::NotFound {
                reference: reference.to_string(),
                path: dir,
                policy: policy.to_string(),
            });
        }

        let info = PackageInfo::load(&dir).map_err(|error| RequirementError::PackageInfo {
            reference: reference.to_string(),
            error,
        })?;
        for (name, wanted) in &requirement.options {
            match info.options.get(name) {
                Some(built) if built != wanted => tracing::warn!(
                    "{reference} was packaged with {name}={built}, requested {name}={wanted}"
                ),
                _ => {}
            }
        }

        let libs = if info.cpp_info.libs.is_empty() {
            vec![reference.name.clone()]
        } else {
            info.cpp_info.libs
        };
        tracing::info!("Using {reference} from {}", dir.display());
        Ok(ResolvedDependency {
            reference: reference.clone(),
            root: dir,
            libs,
        })
    }
}

impl DependencyManager for LocalCache {
    fn install(
        &self,
        requirements: &[Requirement],
        policy: BuildPolicy,
    ) -> Result<Vec<ResolvedDependency>, RequirementError> {
        requirements
            .iter()
            .map(|requirement| self.lookup(requirement, policy))
            .collect()
    }
}
