//! Transformer pipeline
//!
//! Applies a unit's cross-cutting transformations in a fixed order. The
//! order is part of the contract - reordering changes results:
//!
//! 1. generators (ConfigMap/Secret materialization, hashed names)
//! 2. name prefix/suffix
//! 3. namespace injection
//! 4. common labels/annotations (with selector propagation)
//! 5. name-reference fixups from the rename map built in steps 1-2

pub mod generator;
pub mod labels;
pub mod name;
pub mod namespace;
pub mod refs;

use std::collections::HashMap;
use std::path::Path;

use crate::error::KovlResult;
use crate::kustomization::Kustomization;
use crate::loader::ContentSource;
use crate::model::ResourceSet;

pub use generator::{generate, Generated, GeneratedKind};
pub use labels::{apply_common_labels, apply_common_annotations};
pub use name::apply_name_prefix_suffix;
pub use namespace::{apply_namespace, is_cluster_scoped};
pub use refs::apply_name_reference_fixups;

/// `(kind, original name) -> final name`, accumulated across generator
/// hashing and prefix/suffix renaming
pub type RenameMap = HashMap<(String, String), String>;

/// Run the full pipeline for one unit over its resolved set.
pub fn apply_transformations(
    unit: &Kustomization,
    set: &mut ResourceSet,
    source: &dyn ContentSource,
    unit_dir: &Path,
    unit_file: &Path,
) -> KovlResult<()> {
    let mut renames = RenameMap::new();

    for spec in &unit.config_map_generator {
        let generated = generator::generate(spec, GeneratedKind::ConfigMap, source, unit_dir)?;
        renames.insert(
            (GeneratedKind::ConfigMap.as_str().to_string(), generated.declared_name),
            generated.hashed_name,
        );
        set.push(generated.doc, unit_file)?;
    }
    for spec in &unit.secret_generator {
        let generated = generator::generate(spec, GeneratedKind::Secret, source, unit_dir)?;
        renames.insert(
            (GeneratedKind::Secret.as_str().to_string(), generated.declared_name),
            generated.hashed_name,
        );
        set.push(generated.doc, unit_file)?;
    }

    name::apply_name_prefix_suffix(
        set,
        unit.name_prefix.as_deref(),
        unit.name_suffix.as_deref(),
        &mut renames,
    );

    if let Some(namespace) = &unit.namespace {
        namespace::apply_namespace(set, namespace);
    }

    labels::apply_common_labels(set, &unit.common_labels);
    labels::apply_common_annotations(set, &unit.common_annotations);

    refs::apply_name_reference_fixups(set, &renames);

    Ok(())
}
