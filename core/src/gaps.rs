use rusqlite::Connection;

use crate::error::CoreError;

/// Ids in `[1, MAX(id)]` with no stored message, ascending.
///
/// Walks a counter alongside the sorted id stream, so the cost grows with the
/// largest id rather than with the number of rows. Read failures are returned,
/// never reported as an archive without gaps.
pub fn missing_ids(conn: &Connection) -> Result<Vec<i64>, CoreError> {
    let max: Option<i64> =
        conn.query_row("SELECT MAX(id) FROM messages;", [], |row| row.get(0))?;
    let max = max.unwrap_or(0);
    if max <= 0 {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare("SELECT id FROM messages WHERE id >= 1 ORDER BY id ASC;")?;
    let mut rows = stmt.query([])?;
    let mut missing = Vec::new();
    let mut next_stored: Option<i64> = next_id(&mut rows)?;
    for candidate in 1..=max {
        match next_stored {
            Some(id) if id == candidate => next_stored = next_id(&mut rows)?,
            _ => missing.push(candidate),
        }
    }
    Ok(missing)
}

fn next_id(rows: &mut rusqlite::Rows<'_>) -> Result<Option<i64>, CoreError> {
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::apply_migrations;
    use proptest::prelude::*;

    fn store_with(ids: &[i64]) -> Connection {
        let conn = Connection::open_in_memory().expect("memory db");
        apply_migrations(&conn).expect("migrate");
        for id in ids {
            conn.execute(
                "INSERT INTO messages (id, type) VALUES (?1, 'empty_message');",
                [id],
            )
            .expect("insert");
        }
        conn
    }

    #[test]
    fn finds_holes_between_stored_ids() {
        let conn = store_with(&[1, 2, 4, 5, 7]);
        assert_eq!(missing_ids(&conn).expect("gaps"), vec![3, 6]);
    }

    #[test]
    fn empty_store_has_no_gaps() {
        let conn = store_with(&[]);
        assert!(missing_ids(&conn).expect("gaps").is_empty());
    }

    #[test]
    fn unreadable_store_is_an_error() {
        let conn = Connection::open_in_memory().expect("memory db");
        assert!(missing_ids(&conn).is_err());
    }

    #[test]
    fn leading_gap_is_reported() {
        let conn = store_with(&[4]);
        assert_eq!(missing_ids(&conn).expect("gaps"), vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn matches_set_difference(ids in proptest::collection::btree_set(1i64..300, 0..60)) {
            let stored: Vec<i64> = ids.iter().copied().collect();
            let conn = store_with(&stored);
            let max = stored.last().copied().unwrap_or(0);
            let expected: Vec<i64> = (1..=max).filter(|id| !ids.contains(id)).collect();
            prop_assert_eq!(missing_ids(&conn).expect("gaps"), expected);
        }
    }
}
