use crate::common::CallsightError;
use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use std::fs;
use std::path::{Path, PathBuf};

/// Build configuration provider: turns a build path (a package/workspace
/// directory or a `Cargo.toml` path) into the list of source files the
/// configuration covers.
pub struct ProjectLoader;

impl ProjectLoader {
    /// Load all source files covered by the build path's configuration.
    /// Returns a vector of (crate_name, file_path, file_content).
    pub fn load_build_path(build_path: &str) -> Result<Vec<(String, String, String)>> {
        let manifest = Self::locate_manifest(build_path)?;
        let metadata = MetadataCommand::new()
            .manifest_path(&manifest)
            .no_deps()
            .exec()
            .map_err(|e| CallsightError::ConfigurationNotFound {
                path: manifest.clone(),
                detail: e.to_string(),
            })?;

        let mut files = Vec::new();

        for package_id in &metadata.workspace_members {
            if let Some(package) = metadata.packages.iter().find(|p| &p.id == package_id) {
                let crate_name = &package.name;

                for target in &package.targets {
                    if !target
                        .kind
                        .iter()
                        .any(|k| k == "lib" || k == "bin" || k == "proc-macro")
                    {
                        continue;
                    }

                    let src_path = &target.src_path;
                    let src_dir = src_path.parent().unwrap_or(src_path);
                    Self::collect_rs_recursive(src_dir.as_std_path(), crate_name, &mut files)?;
                }
            }
        }

        // Dedup files if multiple targets point to the same sources.
        files.sort_by(|a, b| a.1.cmp(&b.1));
        files.dedup_by(|a, b| a.1 == b.1);

        Ok(files)
    }

    /// Select the requested files out of the configuration.
    ///
    /// A request matches by exact path or by path suffix, with a leading
    /// `./` stripped, so both absolute configuration paths and paths relative
    /// to the source tree work. A request matching nothing is fatal.
    pub fn select_requested(
        all: &[(String, String, String)],
        requested: &[String],
    ) -> Result<Vec<(String, String, String)>> {
        if requested.is_empty() {
            return Ok(all.to_vec());
        }

        let mut selected = Vec::new();
        for request in requested {
            let wanted = request.strip_prefix("./").unwrap_or(request);
            let found = all.iter().find(|(_, path, _)| {
                path == wanted || path.ends_with(&format!("/{}", wanted))
            });
            match found {
                Some(entry) => {
                    if !selected.iter().any(|(_, p, _): &(String, String, String)| p == &entry.1) {
                        selected.push(entry.clone());
                    }
                }
                None => {
                    return Err(CallsightError::SourceFileNotFound {
                        path: request.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(selected)
    }

    fn locate_manifest(build_path: &str) -> Result<PathBuf> {
        let path = Path::new(build_path);
        let manifest = if path.is_dir() {
            path.join("Cargo.toml")
        } else {
            path.to_path_buf()
        };
        if manifest.is_file() && manifest.file_name() == Some("Cargo.toml".as_ref()) {
            Ok(manifest)
        } else {
            Err(CallsightError::ConfigurationNotFound {
                path: path.to_path_buf(),
                detail: "no Cargo.toml at this path".to_string(),
            }
            .into())
        }
    }

    fn collect_rs_recursive(
        dir: &Path,
        crate_name: &str,
        out: &mut Vec<(String, String, String)>,
    ) -> Result<()> {
        if dir.ends_with("target") || dir.ends_with(".git") {
            return Ok(());
        }
        if !dir.exists() {
            return Ok(());
        }

        if dir.is_file() {
            // Single-file target such as main.rs.
            if dir.extension().is_some_and(|ext| ext == "rs") {
                let content = fs::read_to_string(dir)
                    .with_context(|| format!("Failed to read file {}", dir.display()))?;
                out.push((crate_name.to_string(), dir.display().to_string(), content));
            }
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::collect_rs_recursive(&path, crate_name, out)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read file {}", path.display()))?;
                out.push((crate_name.to_string(), path.display().to_string(), content));
            }
        }
        Ok(())
    }
}
