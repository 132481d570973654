use toml::{Table, Value};

use crate::ConfigError;

/// Walk `dotted_path` (e.g. `"plugins.sources"`) through nested tables,
/// returning the leaf value if every segment resolves.
pub(crate) fn traverse<'a>(table: &'a Table, dotted_path: &str) -> Option<&'a Value> {
    let mut segments = dotted_path.split('.');
    let first = segments.next()?;
    let mut current = table.get(first)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Walk `dotted_path`, creating intermediate tables as needed, and set the
/// leaf to `value`. Fails if an intermediate segment already holds a
/// non-table value.
pub(crate) fn set(table: &mut Table, dotted_path: &str, value: Value) -> Result<(), ConfigError> {
    let segments: Vec<&str> = dotted_path.split('.').collect();
    let (leaf, parents) = segments.split_last().expect("dotted_path is never empty");

    let mut current = table;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = entry.as_table_mut().ok_or_else(|| ConfigError::NotATable {
            path: dotted_path.to_string(),
            segment: segment.to_string(),
        })?;
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}
