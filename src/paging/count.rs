//! Count query derivation for SQL text.

/// Column carrying the total in windowed-count and count queries.
pub const TOTAL_COLUMN: &str = "total";

/// Derive a count query from a select statement.
///
/// The projection is replaced by `count(*)` and any `ORDER BY` tail is
/// dropped. A `DISTINCT` select is wrapped as a subquery aliased `AS main`
/// instead. Text that is not a `SELECT … FROM …` statement is returned
/// unchanged.
pub fn count_sql(sql: &str) -> String {
    count_sql_as(sql, "AS main")
}

/// [`count_sql`] with an explicit derived-table alias clause. Oracle only
/// accepts a bare alias (`main`).
pub fn count_sql_as(sql: &str, derived: &str) -> String {
    // Keyword search runs on an ASCII-lowercased copy so byte offsets line up.
    let lower = sql.to_ascii_lowercase();

    let Some(select) = lower.find("select ") else {
        return sql.to_string();
    };
    let Some(from) = lower.find(" from ") else {
        return sql.to_string();
    };

    if lower.contains(" distinct ") || lower[select..].starts_with("select distinct ") {
        return format!(
            "SELECT count(*) AS {} FROM ({}) {}",
            TOTAL_COLUMN,
            sql[select..].trim_end(),
            derived
        );
    }

    let end = lower
        .rfind(" order by ")
        .filter(|&i| i > from)
        .unwrap_or(sql.len());
    format!(
        "SELECT count(*) AS {}{}",
        TOTAL_COLUMN,
        sql[from..end].trim_end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_projection_and_strips_order() {
        let sql = "SELECT id, name FROM users WHERE age >= $1 ORDER BY name ASC";
        assert_eq!(
            count_sql(sql),
            "SELECT count(*) AS total FROM users WHERE age >= $1"
        );
    }

    #[test]
    fn test_lower_case_keywords() {
        let sql = "select * from users where name like ? order by id";
        assert_eq!(count_sql(sql), "SELECT count(*) AS total from users where name like ?");
    }

    #[test]
    fn test_distinct_wraps_subquery() {
        let sql = "SELECT DISTINCT dept FROM users ORDER BY dept";
        assert_eq!(
            count_sql(sql),
            "SELECT count(*) AS total FROM (SELECT DISTINCT dept FROM users ORDER BY dept) AS main"
        );
    }

    #[test]
    fn test_bare_derived_alias() {
        let sql = "SELECT DISTINCT dept FROM users";
        assert_eq!(
            count_sql_as(sql, "main"),
            "SELECT count(*) AS total FROM (SELECT DISTINCT dept FROM users) main"
        );
    }

    #[test]
    fn test_non_select_unchanged() {
        assert_eq!(count_sql("DELETE FROM users"), "DELETE FROM users");
        assert_eq!(count_sql("SELECT 1"), "SELECT 1");
    }
}
