#[cfg(test)]
mod tests {
    use quarry::provider::{Address, AddressMatcher};
    use quarry::StoreError;

    #[test]
    fn test_parse_display_round_trip() {
        for raw in ["tracks", "tracks/42", "tracks/42?notify=0&sync=1"] {
            let address = Address::parse(raw).unwrap();
            assert_eq!(address.to_string(), raw);
        }
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        for raw in ["", "/tracks", "tracks//42", "tracks?=1", "tracks?notify"] {
            assert!(
                matches!(Address::parse(raw), Err(StoreError::BadAddress(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_row_identity_requires_numeric_tail() {
        assert_eq!(Address::parse("tracks/42").unwrap().row_identity(), Some(42));
        assert_eq!(Address::parse("tracks").unwrap().row_identity(), None);
        assert_eq!(Address::parse("tracks/latest").unwrap().row_identity(), None);
        assert_eq!(Address::parse("tracks/-1").unwrap().row_identity(), None);
    }

    #[test]
    fn test_joined_extends_path() {
        let address = Address::parse("tracks").unwrap().joined(7);
        assert_eq!(address.to_string(), "tracks/7");
        assert_eq!(address.row_identity(), Some(7));
    }

    #[test]
    fn test_with_param_replaces_existing_value() {
        let address = Address::parse("tracks?notify=1").unwrap().with_param("notify", "0");
        assert_eq!(address.param("notify"), Some("0"));
        assert_eq!(address.to_string(), "tracks?notify=0");
    }

    #[test]
    fn test_matcher_numeric_wildcard() {
        let mut matcher = AddressMatcher::new();
        matcher.route("tracks", 1);
        matcher.route("tracks/#", 2);

        assert_eq!(matcher.resolve(&Address::parse("tracks").unwrap()), Some(1));
        assert_eq!(matcher.resolve(&Address::parse("tracks/42").unwrap()), Some(2));
        // `#` matches digits only.
        assert_eq!(matcher.resolve(&Address::parse("tracks/latest").unwrap()), None);
        assert_eq!(matcher.resolve(&Address::parse("albums/1").unwrap()), None);
    }

    #[test]
    fn test_matcher_any_wildcard_and_first_match_wins() {
        let mut matcher = AddressMatcher::new();
        matcher.route("tracks/#", 1);
        matcher.route("tracks/*", 2);

        assert_eq!(matcher.resolve(&Address::parse("tracks/42").unwrap()), Some(1));
        assert_eq!(matcher.resolve(&Address::parse("tracks/latest").unwrap()), Some(2));
    }

    #[test]
    fn test_segment_count_must_match() {
        let mut matcher = AddressMatcher::new();
        matcher.route("tracks/#", 1);

        assert_eq!(matcher.resolve(&Address::parse("tracks").unwrap()), None);
        assert_eq!(matcher.resolve(&Address::parse("tracks/1/plays").unwrap()), None);
    }
}
