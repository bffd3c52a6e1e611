use crate::model::ColumnPair;

/// Default pairing: each reference column maps to the first target column
/// that is equal after trimming and lowercasing. Unmatched columns are skipped.
pub fn suggest_pairs(reference_columns: &[String], target_columns: &[String]) -> Vec<ColumnPair> {
    reference_columns
        .iter()
        .filter_map(|reference| {
            let key = reference.trim().to_lowercase();
            target_columns
                .iter()
                .find(|target| target.trim().to_lowercase() == key)
                .map(|target| ColumnPair::new(reference.clone(), target.clone()))
        })
        .collect()
}

/// One-to-one pairs over the same column names (template mode).
pub fn identity_pairs(columns: &[String]) -> Vec<ColumnPair> {
    columns.iter().map(|c| ColumnPair::new(c.clone(), c.clone())).collect()
}

/// Distinct column names of one side, in first-seen order.
pub fn side_columns<'a>(pairs: &'a [ColumnPair], pick: impl Fn(&'a ColumnPair) -> &'a str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for pair in pairs {
        let name = pick(pair);
        if !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    }
    out
}
