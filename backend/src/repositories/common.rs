//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Wraps a search term for `ILIKE`, escaping the pattern metacharacters.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_clause_switches_from_where_to_and() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM accounts");
        let mut has_clause = false;
        push_clause(&mut builder, &mut has_clause);
        builder.push("is_active = TRUE");
        push_clause(&mut builder, &mut has_clause);
        builder.push("kind = 'donor'");
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM accounts WHERE is_active = TRUE AND kind = 'donor'"
        );
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ab"), "%ab%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
