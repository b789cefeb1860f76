/// Build an ILIKE pattern matching `keyword` anywhere in a column.
///
/// `%`, `_` and the escape character itself are matched literally; queries
/// using the pattern must declare `ESCAPE '\'`.
pub fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
