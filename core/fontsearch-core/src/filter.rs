//! Case-insensitive name filter (made by FontLab https://www.fontlab.com/)

/// Return the names containing `query`, ignoring case, in their input order.
///
/// An empty query keeps every name. There is no ranking: a name either
/// contains the query or it does not.
pub fn filter_names<'a, S: AsRef<str>>(names: &'a [S], query: &str) -> Vec<&'a S> {
    filter_indices(names, query)
        .into_iter()
        .map(|idx| &names[idx])
        .collect()
}

/// Like [`filter_names`], but returns positions into `names`.
pub fn filter_indices<S: AsRef<str>>(names: &[S], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..names.len()).collect();
    }

    let needle = query.to_lowercase();
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| matches_query(name.as_ref(), &needle))
        .map(|(idx, _)| idx)
        .collect()
}

fn matches_query(name: &str, lowered_query: &str) -> bool {
    name.to_lowercase().contains(lowered_query)
}
