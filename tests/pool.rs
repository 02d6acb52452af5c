#[cfg(test)]
mod tests {
    use quarry::config::AcquireMode;
    use quarry::pool::Pool;
    use quarry::query::QueryExpression;
    use quarry::StoreError;
    use std::time::Duration;

    #[test]
    fn test_fail_fast_exhaustion() {
        let pool: Pool<QueryExpression> = Pool::new(2, AcquireMode::FailFast);
        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();

        let err = pool.acquire().unwrap_err();
        assert!(matches!(err, StoreError::PoolExhausted { capacity: 2 }));
    }

    #[test]
    fn test_drop_returns_slot() {
        let pool: Pool<QueryExpression> = Pool::new(1, AcquireMode::FailFast);
        assert_eq!(pool.available(), 1);

        let guard = pool.acquire().unwrap();
        assert_eq!(pool.available(), 0);
        drop(guard);

        assert_eq!(pool.available(), 1);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn test_release_resets_object() {
        let pool: Pool<QueryExpression> = Pool::new(1, AcquireMode::FailFast);
        {
            let mut expr = pool.acquire().unwrap();
            expr.expr("title", quarry::query::Operator::Equals, "Peg");
            assert!(!expr.is_empty());
        }
        let expr = pool.acquire().unwrap();
        assert!(expr.is_empty());
        assert!(expr.arguments().is_empty());
    }

    #[test]
    fn test_capacity_is_fixed() {
        let pool: Pool<QueryExpression> = Pool::new(4, AcquireMode::FailFast);
        let _a = pool.acquire().unwrap();
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn test_block_mode_waits_for_release() {
        let pool: Pool<QueryExpression> = Pool::new(1, AcquireMode::Block);

        std::thread::scope(|scope| {
            let guard = pool.acquire().unwrap();
            let waiter = scope.spawn(|| {
                // Blocks until the main thread releases its guard.
                let expr = pool.acquire().unwrap();
                assert!(expr.is_empty());
            });
            std::thread::sleep(Duration::from_millis(50));
            drop(guard);
            waiter.join().unwrap();
        });

        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_concurrent_checkouts_round_trip() {
        let pool: Pool<QueryExpression> = Pool::new(4, AcquireMode::Block);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        let mut expr = pool.acquire().unwrap();
                        expr.expr("plays", quarry::query::Operator::GreaterThan, 10);
                        assert_eq!(expr.arguments().len(), 1);
                    }
                });
            }
        });

        assert_eq!(pool.available(), 4);
    }
}
