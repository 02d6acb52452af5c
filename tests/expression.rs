#[cfg(test)]
mod tests {
    use quarry::query::{Operator, QueryExpression, SqlKeyword};

    fn placeholder_count(predicate: &str) -> usize {
        predicate.matches('?').count()
    }

    #[test]
    fn test_or_connective_between_clauses() {
        let mut expr = QueryExpression::new();
        expr.expr("title", Operator::Like, "A%").or().expr("title", Operator::Like, "B%");

        assert_eq!(expr.predicate(), "title LIKE ? OR title LIKE ?");
        assert_eq!(expr.arguments(), ["A%", "B%"]);
    }

    #[test]
    fn test_default_connective_is_and() {
        let mut expr = QueryExpression::new();
        expr.expr("plays", Operator::GreaterThan, 10).expr("rating", Operator::AtLeast, 4);

        assert_eq!(expr.predicate(), "plays > ? AND rating >= ?");
        assert_eq!(expr.arguments(), ["10", "4"]);
    }

    #[test]
    fn test_connective_resets_after_each_clause() {
        let mut expr = QueryExpression::new();
        expr.expr("a", Operator::Equals, 1)
            .or()
            .expr("b", Operator::Equals, 2)
            .expr("c", Operator::Equals, 3);

        // The OR applied to the second clause only.
        assert_eq!(expr.predicate(), "a = ? OR b = ? AND c = ?");
    }

    #[test]
    fn test_connective_before_first_clause_is_inert() {
        let mut expr = QueryExpression::new();
        expr.or().expr("a", Operator::Equals, 1).expr("b", Operator::Equals, 2);

        assert_eq!(expr.predicate(), "a = ? AND b = ?");
    }

    #[test]
    fn test_consecutive_connectives_last_wins() {
        let mut expr = QueryExpression::new();
        expr.expr("a", Operator::Equals, 1).or().and().expr("b", Operator::Equals, 2);
        assert_eq!(expr.predicate(), "a = ? AND b = ?");

        let mut expr = QueryExpression::new();
        expr.expr("a", Operator::Equals, 1).and().or().expr("b", Operator::Equals, 2);
        assert_eq!(expr.predicate(), "a = ? OR b = ?");
    }

    #[test]
    fn test_arguments_match_placeholders() {
        let mut expr = QueryExpression::new();
        expr.expr("title", Operator::NotEquals, "x")
            .optional("plays", Operator::GreaterThan, 0)
            .optional("plays", Operator::GreaterThan, 3)
            .or()
            .expr("rating", Operator::Is, 5)
            .is_null("comment")
            .expr_keyword("updated_at", Operator::LessThan, SqlKeyword::CurrentTimestamp)
            .append_raw("plays % 2 = ?", &["0"]);

        assert_eq!(placeholder_count(expr.predicate()), expr.arguments().len());
    }

    #[test]
    fn test_optional_skips_zero_values() {
        let mut expr = QueryExpression::new();
        expr.optional("plays", Operator::Equals, 0)
            .optional("done", Operator::Equals, false)
            .optional("title", Operator::Equals, None::<&str>);

        assert!(expr.is_empty());
        assert_eq!(expr.arguments().len(), 0);
    }

    #[test]
    fn test_optional_appends_nonzero_value() {
        let mut expr = QueryExpression::new();
        expr.optional("plays", Operator::Equals, 5);

        assert_eq!(expr.predicate(), "plays = ?");
        assert_eq!(expr.arguments(), ["5"]);
    }

    #[test]
    fn test_keyword_clause_binds_no_argument() {
        let mut expr = QueryExpression::new();
        expr.expr_keyword("deleted_at", Operator::Is, SqlKeyword::Null);

        assert_eq!(expr.predicate(), "deleted_at IS NULL");
        assert!(expr.arguments().is_empty());
    }

    #[test]
    fn test_null_tests() {
        let mut expr = QueryExpression::new();
        expr.is_null("comment").not_null("title");

        assert_eq!(expr.predicate(), "comment ISNULL AND title NOTNULL");
    }

    #[test]
    fn test_nested_with_arguments_parenthesized_in_order() {
        let mut sub = QueryExpression::new();
        sub.expr("rating", Operator::AtLeast, 4).or().expr("rating", Operator::Is, 0);

        let mut expr = QueryExpression::new();
        expr.expr("title", Operator::Like, "A%").nested(&sub);

        assert_eq!(expr.predicate(), "title LIKE ? AND (rating >= ? OR rating IS ?)");
        assert_eq!(expr.arguments(), ["A%", "4", "0"]);
    }

    #[test]
    fn test_nested_without_arguments_contributes_nothing() {
        // Even a text-carrying sub vanishes when it binds no arguments.
        let mut sub = QueryExpression::new();
        sub.is_null("comment");

        let mut expr = QueryExpression::new();
        expr.expr("title", Operator::Like, "A%").nested(&sub);

        assert_eq!(expr.predicate(), "title LIKE ?");
        assert_eq!(expr.arguments(), ["A%"]);

        let mut expr = QueryExpression::new();
        expr.nested(&QueryExpression::new());
        assert!(expr.is_empty());
    }

    #[test]
    fn test_append_raw_blank_fragment_is_ignored() {
        let mut expr = QueryExpression::new();
        expr.append_raw("", &[]).append_raw("   ", &["lost"]);

        assert!(expr.is_empty());
        assert!(expr.arguments().is_empty());
    }

    #[test]
    fn test_append_raw_joins_like_a_clause() {
        let mut expr = QueryExpression::new();
        expr.expr("a", Operator::Equals, 1).or().append_raw("b IN (?, ?)", &["2", "3"]);

        assert_eq!(expr.predicate(), "a = ? OR b IN (?, ?)");
        assert_eq!(expr.arguments(), ["1", "2", "3"]);
    }

    #[test]
    fn test_boolean_arguments_canonicalize_to_digits() {
        let mut expr = QueryExpression::new();
        expr.expr("done", Operator::Equals, true).expr("archived", Operator::Equals, false);

        assert_eq!(expr.arguments(), ["1", "0"]);
    }

    #[test]
    fn test_clear_resets_for_reuse() {
        let mut expr = QueryExpression::new();
        expr.expr("a", Operator::Equals, 1).or();
        expr.clear();

        assert!(expr.is_empty());
        expr.expr("b", Operator::Equals, 2).expr("c", Operator::Equals, 3);
        // The pending OR did not survive the clear.
        assert_eq!(expr.predicate(), "b = ? AND c = ?");
    }
}
