//! PersistentVolumeClaim naming for StatefulSet volume claim templates.
//!
//! The StatefulSet controller names the claim for pod `ordinal` as
//! `{template}-{statefulset}-{ordinal}`. Claims are never listed; they are
//! derived from the snapshot taken before scale-down.

/// Name of the claim created from `template` for pod `ordinal` of `workload`.
pub fn claim_name(template: &str, workload: &str, ordinal: i32) -> String {
    format!("{template}-{workload}-{ordinal}")
}

/// Claims to delete, in deletion order: templates in declared order, and
/// within a template the highest ordinal first.
pub fn sweep_order(templates: &[String], workload: &str, replicas: i32) -> Vec<String> {
    templates
        .iter()
        .flat_map(|template| {
            (0..replicas.max(0))
                .rev()
                .map(move |ordinal| claim_name(template, workload, ordinal))
        })
        .collect()
}
