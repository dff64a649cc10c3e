//! Name prefix/suffix transformer

use crate::model::ResourceSet;

use super::RenameMap;

/// Rewrite `metadata.name` on every document, recording each rename so
/// name references can be fixed up later.
pub fn apply_name_prefix_suffix(
    set: &mut ResourceSet,
    prefix: Option<&str>,
    suffix: Option<&str>,
    renames: &mut RenameMap,
) {
    if prefix.is_none() && suffix.is_none() {
        return;
    }

    for doc in set.iter_mut() {
        let old = doc.name().to_string();
        let new = format!(
            "{}{}{}",
            prefix.unwrap_or(""),
            old,
            suffix.unwrap_or("")
        );
        doc.set_name(&new);

        let kind = doc.kind().to_string();
        // Generated documents already map declared -> hashed; chase the
        // chain so declared names land on the final prefixed form.
        for ((entry_kind, _), final_name) in renames.iter_mut() {
            if *entry_kind == kind && *final_name == old {
                *final_name = new.clone();
            }
        }
        renames.insert((kind, old), new);
    }
}
