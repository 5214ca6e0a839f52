use regex::Regex;
use std::sync::OnceLock;

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// The users table carries a unique index on email and not-null constraints
/// on the identity columns; this parser turns the raw Postgres messages for
/// those violations into (entity, field, value) triples so the API can name
/// the offending field instead of echoing a database error.
pub struct ConstraintParser;

/// Compiled regex patterns for constraint parsing, cached for reuse
struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Matches "Key (field)=(value)" pattern in PostgreSQL messages
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").unwrap(),
            // Matches column names in quotes
            column_name: Regex::new(r#"column "([^"]+)""#).unwrap(),
            // Matches table/relation names in quotes
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).unwrap(),
        }
    }
}

/// Global regex patterns cache
static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique constraint violation message into (entity, field, value).
    ///
    /// The constraint name is tried first ("users_email_key" names the table
    /// and column directly); the message detail supplies the duplicate value.
    /// Falls back to the "Key (field)=(value)" detail line when the
    /// constraint name is absent or unparseable.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        if let Some(constraint) = constraint_name {
            if let Some((entity, field)) = Self::parse_constraint_name(constraint) {
                if let Some((_, value)) = Self::extract_key_value_from_message(message) {
                    return Some((entity, field, value));
                }
                // Constraint named the column but the detail line is missing
                return Some((entity, field, "duplicate_value".to_string()));
            }
        }

        if let Some((field, value)) = Self::extract_key_value_from_message(message) {
            let entity = Self::extract_table_from_message(message)
                .unwrap_or_else(|| "resource".to_string());
            return Some((entity, field, value));
        }

        None
    }

    /// Parses a not-null constraint violation message into (entity, field).
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(field) = Self::extract_column_from_message(message) {
            let entity = Self::extract_table_from_message(message)
                .or_else(|| {
                    constraint_name.and_then(|c| Self::parse_constraint_name(c).map(|(e, _)| e))
                })
                .unwrap_or_else(|| "resource".to_string());
            return Some((entity, field));
        }

        None
    }

    /// Splits a Postgres constraint name like "users_email_key" into
    /// ("users", "email"). Returns None for names that do not follow the
    /// `{table}_{column}_{suffix}` convention.
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let parts: Vec<&str> = constraint_name.split('_').collect();
        if parts.len() >= 3 {
            let entity = parts[0].to_string();
            let field = parts[1].to_string();
            return Some((entity, field));
        }
        None
    }

    /// Extracts a column name from patterns like `column "email"`.
    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts a table name from patterns like `table "users"` or
    /// `relation "users"`.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts the (field, value) pair from the `Key (field)=(value)`
    /// detail line Postgres appends to constraint violations.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_violation_with_constraint_name() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(jane@example.com) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, Some("users_email_key"));
        assert_eq!(
            result,
            Some((
                "users".to_string(),
                "email".to_string(),
                "jane@example.com".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint_name() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (email)=(jane@example.com) already exists.";
        let result = ConstraintParser::parse_unique_violation(message, None);
        assert_eq!(
            result,
            Some((
                "resource".to_string(),
                "email".to_string(),
                "jane@example.com".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_detail_line() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"";
        let result = ConstraintParser::parse_unique_violation(message, Some("users_email_key"));
        assert_eq!(
            result,
            Some((
                "users".to_string(),
                "email".to_string(),
                "duplicate_value".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_not_null_violation() {
        let message = "null value in column \"first_name\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(
            result,
            Some(("resource".to_string(), "first_name".to_string()))
        );
    }

    #[test]
    fn test_parse_not_null_violation_with_relation() {
        let message =
            "null value in column \"email\" of relation \"users\" violates not-null constraint";
        let result = ConstraintParser::parse_not_null_violation(message, None);
        assert_eq!(result, Some(("users".to_string(), "email".to_string())));
    }

    #[test]
    fn test_parse_constraint_name() {
        let result = ConstraintParser::parse_constraint_name("users_email_key");
        assert_eq!(result, Some(("users".to_string(), "email".to_string())));

        let result = ConstraintParser::parse_constraint_name("invalid");
        assert_eq!(result, None);
    }

    #[test]
    fn test_extract_column_from_message() {
        let message = "null value in column \"email\" violates not-null constraint";
        let result = ConstraintParser::extract_column_from_message(message);
        assert_eq!(result, Some("email".to_string()));

        let message = "no column found here";
        let result = ConstraintParser::extract_column_from_message(message);
        assert_eq!(result, None);
    }

    #[test]
    fn test_extract_table_from_message() {
        let message = "new row for relation \"users\" violates constraint";
        let result = ConstraintParser::extract_table_from_message(message);
        assert_eq!(result, Some("users".to_string()));

        let message = "no table found here";
        let result = ConstraintParser::extract_table_from_message(message);
        assert_eq!(result, None);
    }

    #[test]
    fn test_extract_key_value_from_message() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(jane@example.com) already exists.";
        let result = ConstraintParser::extract_key_value_from_message(message);
        assert_eq!(
            result,
            Some(("email".to_string(), "jane@example.com".to_string()))
        );
    }

    #[test]
    fn test_regex_patterns_are_cached() {
        let patterns1 = ConstraintParser::patterns();
        let patterns2 = ConstraintParser::patterns();
        assert!(std::ptr::eq(patterns1, patterns2));
    }

    #[test]
    fn test_graceful_parsing_failures() {
        let message = "completely unrelated error message";
        assert_eq!(ConstraintParser::parse_unique_violation(message, None), None);
        assert_eq!(
            ConstraintParser::parse_not_null_violation(message, None),
            None
        );
    }
}
