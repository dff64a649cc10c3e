//! Reference resolver
//!
//! Expands a root kustomization unit into one flattened `ResourceSet`:
//! depth-first over `resources` entries in declared order, recursing into
//! nested units. A nested unit is fully resolved - its own patches and
//! transformations applied - before the parent sees its output, so
//! overlays always modify the resolved output of their base, never the
//! base's raw declarations.

use std::path::{Component, Path, PathBuf};

use crate::error::{KovlError, KovlResult};
use crate::kustomization::{parse_kustomization, UnitWarning};
use crate::loader::{kustomization_file, load_documents, ContentSource};
use crate::model::ResourceSet;
use crate::patch::{apply_patch, Patch};
use crate::transform::apply_transformations;

/// Recursion limit guarding reference chains too long for cycle detection
/// to catch
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// How `bases:` (the legacy alias for unit references) is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyBases {
    /// Accept with a deprecation warning
    #[default]
    Warn,
    /// Reject with an error
    Deny,
}

/// Non-fatal findings collected during resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveWarning {
    UnknownField(UnitWarning),
    LegacyBases { unit: PathBuf },
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::UnknownField(w) => write!(f, "{}", w),
            ResolveWarning::LegacyBases { unit } => write!(
                f,
                "{}: 'bases' is deprecated, list the entries under 'resources'",
                unit.display()
            ),
        }
    }
}

/// Result of resolving a root unit
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub set: ResourceSet,
    pub warnings: Vec<ResolveWarning>,
}

/// Resolves kustomization units against a content source
pub struct Resolver<'a> {
    source: &'a dyn ContentSource,
    legacy_bases: LegacyBases,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn ContentSource) -> Self {
        Self {
            source,
            legacy_bases: LegacyBases::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_legacy_bases(mut self, mode: LegacyBases) -> Self {
        self.legacy_bases = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the unit at `root` (a directory or a kustomization file)
    /// into a flattened set. All-or-nothing: any error discards the run.
    pub fn resolve(&self, root: &Path) -> KovlResult<Resolution> {
        let mut stack: Vec<PathBuf> = Vec::new();
        let mut warnings = Vec::new();
        let set = self.resolve_unit(root, &mut stack, &mut warnings, 0)?;
        Ok(Resolution { set, warnings })
    }

    fn resolve_unit(
        &self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        warnings: &mut Vec<ResolveWarning>,
        depth: usize,
    ) -> KovlResult<ResourceSet> {
        let unit_file = kustomization_file(self.source, path).ok_or_else(|| {
            if self.source.exists(path) {
                KovlError::NotFound {
                    path: path.join("kustomization.yaml"),
                }
            } else {
                KovlError::NotFound {
                    path: path.to_path_buf(),
                }
            }
        })?;
        let unit_dir = unit_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let unit_key = normalize_path(&unit_dir);

        // Refuse the cycle before doing any work on the repeated unit.
        if stack.contains(&unit_key) {
            let trail = stack
                .iter()
                .map(|p| p.display().to_string())
                .chain(std::iter::once(unit_key.display().to_string()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(KovlError::CyclicReference {
                unit: unit_key,
                stack: trail,
            });
        }
        if depth >= self.max_depth {
            return Err(KovlError::MaxDepthExceeded {
                unit: unit_key,
                limit: self.max_depth,
            });
        }
        stack.push(unit_key);

        let content = self.source.read(&unit_file)?;
        let (unit, unit_warnings) = parse_kustomization(&content, &unit_file)?;
        warnings.extend(unit_warnings.into_iter().map(ResolveWarning::UnknownField));

        if !unit.bases.is_empty() {
            match self.legacy_bases {
                LegacyBases::Deny => {
                    return Err(KovlError::LegacyBasesRejected {
                        unit: unit_file.clone(),
                    })
                }
                LegacyBases::Warn => warnings.push(ResolveWarning::LegacyBases {
                    unit: unit_file.clone(),
                }),
            }
        }

        let mut set = ResourceSet::new();
        for entry in unit.resources.iter().chain(unit.bases.iter()) {
            let entry_path = normalize_path(&unit_dir.join(entry));
            if kustomization_file(self.source, &entry_path).is_some() {
                let nested = self.resolve_unit(&entry_path, stack, warnings, depth + 1)?;
                set.extend(nested, &unit_file)?;
            } else {
                for doc in load_documents(self.source, &entry_path)? {
                    set.push(doc, &unit_file)?;
                }
            }
        }

        // Pure aggregation units yield exactly their resources as loaded
        if !unit.is_pass_through() {
            for spec in &unit.patches {
                let patch = Patch::resolve(spec, self.source, &unit_dir, &unit_file)?;
                apply_patch(&mut set, &patch, &unit_file)?;
            }

            apply_transformations(&unit, &mut set, self.source, &unit_dir, &unit_file)?;
        }

        stack.pop();
        Ok(set)
    }
}

/// Lexical path normalization (no filesystem access), so cycle keys and
/// in-memory lookups agree regardless of how a unit was referenced.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
