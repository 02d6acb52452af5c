#[cfg(test)]
mod tests {
    use quarry::config::StoreConfig;
    use quarry::db::migrations::MigrationRunner;
    use quarry::db::store::open_store_in_memory;
    use quarry::provider::address::Address;
    use quarry::provider::router::{ResourceRouter, RouterBuilder};
    use quarry::query::ValueSet;
    use quarry::StoreError;

    fn tracks_router() -> ResourceRouter {
        let mut runner = MigrationRunner::new();
        runner.step(1, "create_tracks", |tx| {
            tx.execute("CREATE TABLE tracks (id INTEGER PRIMARY KEY, title TEXT NOT NULL)", [])?;
            Ok(())
        });
        let conn = open_store_in_memory(&StoreConfig::default(), &runner).unwrap();
        RouterBuilder::new(conn)
            .collection("tracks", 1, "tracks")
            .row("tracks/#", 2, "tracks")
            .build()
    }

    fn count_tracks(router: &ResourceRouter) -> usize {
        router.query(&Address::parse("tracks").unwrap(), None, None, None).unwrap().len()
    }

    fn titled(title: &str) -> ValueSet {
        let mut values = ValueSet::new();
        values.put("title", title);
        values
    }

    #[test]
    fn test_bulk_insert_commits_whole_batch() {
        let router = tracks_router();
        let rows: Vec<ValueSet> = ["Peg", "Aja", "Josie"].iter().map(|t| titled(t)).collect();

        let inserted = router.bulk_insert(&Address::parse("tracks").unwrap(), &rows).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(count_tracks(&router), 3);
    }

    #[test]
    fn test_bulk_insert_aborts_on_any_bad_row() {
        let router = tracks_router();
        let mut bad = ValueSet::new();
        bad.put("no_such_column", 1);
        let rows = vec![titled("Peg"), bad, titled("Josie")];

        assert!(router.bulk_insert(&Address::parse("tracks").unwrap(), &rows).is_err());
        // Nothing from the batch is visible, including rows before the bad one.
        assert_eq!(count_tracks(&router), 0);
    }

    #[test]
    fn test_bulk_insert_into_row_binding_is_rejected() {
        let router = tracks_router();
        let err = router
            .bulk_insert(&Address::parse("tracks/5").unwrap(), &[titled("Peg")])
            .unwrap_err();
        assert!(matches!(err, StoreError::IdentityInsert(_)));
    }

    #[test]
    fn test_marked_transaction_commits() {
        let router = tracks_router();

        router.begin_transaction().unwrap();
        router.insert(&Address::parse("tracks").unwrap(), &titled("Peg")).unwrap();
        router.set_transaction_successful().unwrap();
        router.end_transaction().unwrap();

        assert_eq!(count_tracks(&router), 1);
    }

    #[test]
    fn test_unmarked_transaction_rolls_back() {
        let router = tracks_router();

        router.begin_transaction().unwrap();
        router.insert(&Address::parse("tracks").unwrap(), &titled("Peg")).unwrap();
        router.end_transaction().unwrap();

        assert_eq!(count_tracks(&router), 0);
    }

    #[test]
    fn test_unmarked_inner_frame_poisons_outer() {
        let router = tracks_router();

        router.begin_transaction().unwrap();
        router.insert(&Address::parse("tracks").unwrap(), &titled("Peg")).unwrap();

        router.begin_transaction().unwrap();
        router.insert(&Address::parse("tracks").unwrap(), &titled("Aja")).unwrap();
        router.end_transaction().unwrap(); // inner frame never marked

        router.set_transaction_successful().unwrap();
        router.end_transaction().unwrap();

        assert_eq!(count_tracks(&router), 0);
    }

    #[test]
    fn test_nested_marked_frames_commit_once() {
        let router = tracks_router();

        router.begin_transaction().unwrap();
        router.begin_transaction().unwrap();
        router.insert(&Address::parse("tracks").unwrap(), &titled("Peg")).unwrap();
        router.set_transaction_successful().unwrap();
        router.end_transaction().unwrap();

        // Still inside the outer frame: nothing committed yet, but the data
        // is visible on this connection.
        assert_eq!(count_tracks(&router), 1);

        router.set_transaction_successful().unwrap();
        router.end_transaction().unwrap();
        assert_eq!(count_tracks(&router), 1);
    }

    #[test]
    fn test_end_without_begin_fails_loudly() {
        let router = tracks_router();
        assert!(matches!(router.end_transaction().unwrap_err(), StoreError::NoActiveTransaction));
        assert!(matches!(
            router.set_transaction_successful().unwrap_err(),
            StoreError::NoActiveTransaction
        ));
    }

    #[test]
    fn test_marking_twice_is_reported() {
        let router = tracks_router();
        router.begin_transaction().unwrap();
        router.set_transaction_successful().unwrap();
        assert!(matches!(
            router.set_transaction_successful().unwrap_err(),
            StoreError::TransactionMarkedTwice
        ));
        router.end_transaction().unwrap();
    }

    #[test]
    fn test_bulk_insert_after_rollback_starts_clean() {
        let router = tracks_router();
        let mut bad = ValueSet::new();
        bad.put("no_such_column", 1);
        assert!(router.bulk_insert(&Address::parse("tracks").unwrap(), &[bad]).is_err());

        // The failed batch left no open transaction behind.
        let inserted = router.bulk_insert(&Address::parse("tracks").unwrap(), &[titled("Peg")]).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(count_tracks(&router), 1);
    }
}
