/// Strips the surrounding whitespace of every header of a table
///
/// Feeds are often edited by hand and ` stop_name` must still match `stop_name`.
/// Nothing else is renamed.
pub fn clean_column_names<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    headers.into_iter().map(|h| h.trim().to_owned()).collect()
}

#[test]
fn strips_surrounding_whitespace_only() {
    let cleaned = clean_column_names(vec![" stop_id", "stop_name ", "\tstop lat\t", "zone_id"]);
    assert_eq!(vec!["stop_id", "stop_name", "stop lat", "zone_id"], cleaned);
}
