//! SQL statement builder
//!
//! Builds the single SELECT issued per structure query from a projection,
//! a predicate list and a row limit.

use super::types::{Predicate, SqlParams, SqlValue};
use crate::utils::sql::quote_identifier;

/// Alias of the window column carrying the unbounded match count
pub const TOTAL_COLUMN: &str = "__total";

/// Combine predicates with AND into a WHERE clause.
///
/// Returns an empty string when there are no predicates, so the query
/// selects every row.
pub fn build_where_clause(predicates: &[Predicate], params: &mut SqlParams) -> String {
    if predicates.is_empty() {
        return String::new();
    }

    let conditions: Vec<String> = predicates.iter().map(|p| p.to_sql(params)).collect();
    format!(" WHERE {}", conditions.join(" AND "))
}

/// Build the projected, filtered and limited SELECT.
///
/// The last selected column is `COUNT(*) OVER ()`, which reports the
/// unbounded match count on every returned row while the `LIMIT` bounds
/// how many rows are materialized.
pub fn build_select(
    table: &str,
    columns: &[String],
    predicates: &[Predicate],
    limit: usize,
    params: &mut SqlParams,
) -> String {
    let projected: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    let where_clause = build_where_clause(predicates, params);
    // A negative LIMIT means no limit in SQLite
    params
        .values
        .push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

    format!(
        "SELECT {}, COUNT(*) OVER () AS {} FROM {}{} LIMIT ?",
        projected.join(", "),
        TOTAL_COLUMN,
        quote_identifier(table),
        where_clause
    )
}

/// Build the lookup of every column of one structure by name
pub fn build_properties_select(table: &str, name_column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ? LIMIT 1",
        quote_identifier(table),
        quote_identifier(name_column)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_empty_without_predicates() {
        let mut params = SqlParams::default();
        assert_eq!(build_where_clause(&[], &mut params), "");
        assert!(params.values.is_empty());
    }

    #[test]
    fn where_clause_joins_with_and() {
        let predicates = vec![
            Predicate::between("pore_diameter", 5.0, 10.0),
            Predicate::any_of("group", vec!["MOFs".into()]),
        ];
        let mut params = SqlParams::default();
        let clause = build_where_clause(&predicates, &mut params);

        assert_eq!(
            clause,
            " WHERE \"pore_diameter\" BETWEEN ? AND ? AND \"group\" IN (?)"
        );
        assert_eq!(params.values.len(), 3);
    }

    #[test]
    fn select_projects_columns_and_limits() {
        let columns = vec![
            "pore_diameter".to_string(),
            "void_fraction".to_string(),
            "group".to_string(),
            "name".to_string(),
            "filename".to_string(),
        ];
        let mut params = SqlParams::default();
        let sql = build_select("structures", &columns, &[], 70_000, &mut params);

        assert_eq!(
            sql,
            "SELECT \"pore_diameter\", \"void_fraction\", \"group\", \"name\", \"filename\", \
             COUNT(*) OVER () AS __total FROM \"structures\" LIMIT ?"
        );
        assert_eq!(params.values, vec![SqlValue::Integer(70_000)]);
    }

    #[test]
    fn select_limit_param_comes_last() {
        let columns = vec!["a".to_string()];
        let predicates = vec![Predicate::between("a", 1.0, 2.0)];
        let mut params = SqlParams::default();
        let sql = build_select("t", &columns, &predicates, 5, &mut params);

        assert!(sql.contains("WHERE \"a\" BETWEEN ? AND ? LIMIT"));
        assert_eq!(
            params.values,
            vec![SqlValue::Real(1.0), SqlValue::Real(2.0), SqlValue::Integer(5)]
        );
    }

    #[test]
    fn select_limit_saturates() {
        let columns = vec!["a".to_string()];
        let mut params = SqlParams::default();
        build_select("t", &columns, &[], usize::MAX, &mut params);

        assert_eq!(params.values, vec![SqlValue::Integer(i64::MAX)]);
    }

    #[test]
    fn properties_select() {
        assert_eq!(
            build_properties_select("structures", "name"),
            "SELECT * FROM \"structures\" WHERE \"name\" = ? LIMIT 1"
        );
    }
}
