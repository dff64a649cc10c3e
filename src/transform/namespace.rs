//! Namespace injection

use crate::model::ResourceSet;

/// Kinds that exist outside any namespace and must not receive one
const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "Namespace",
    "Node",
    "PersistentVolume",
    "ClusterRole",
    "ClusterRoleBinding",
    "CustomResourceDefinition",
    "StorageClass",
    "PriorityClass",
    "ValidatingWebhookConfiguration",
    "MutatingWebhookConfiguration",
];

pub fn is_cluster_scoped(kind: &str) -> bool {
    CLUSTER_SCOPED_KINDS.contains(&kind)
}

/// Set `metadata.namespace` on every namespace-scoped document that does
/// not already declare one. Existing namespaces are left alone.
pub fn apply_namespace(set: &mut ResourceSet, namespace: &str) {
    for doc in set.iter_mut() {
        if is_cluster_scoped(doc.kind()) {
            continue;
        }
        if doc.namespace().is_none() {
            doc.set_namespace(namespace);
        }
    }
}
