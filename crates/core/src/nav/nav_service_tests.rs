#[cfg(test)]
mod tests {
    use crate::clubs::ClubRepositoryTrait;
    use crate::config::LedgerConfig;
    use crate::errors::ErrorKind;
    use crate::market_data::MarketPriceProviderTrait;
    use crate::nav::{NavService, NavServiceTrait};
    use crate::testing::{date, InMemoryStore, MockPriceProvider};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const CLUB: &str = "club-1";

    fn service(store: &Arc<InMemoryStore>, provider: Arc<dyn MarketPriceProviderTrait>) -> NavService {
        NavService::new(
            store.clone(),
            store.clone(),
            provider,
            LedgerConfig::default(),
        )
    }

    /// $1,000 bank, $2,495 brokerage cash, 50 AAPL and 20 MSFT, 1,500 units.
    fn setup() -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        store.seed_club(CLUB, dec!(1000));
        store.seed_fund(CLUB, "fund-a", dec!(2495));
        store.seed_stock("aapl", "AAPL");
        store.seed_stock("msft", "MSFT");
        store.seed_position("fund-a", "aapl", dec!(50), dec!(150));
        store.seed_position("fund-a", "msft", dec!(20), dec!(250));
        store.seed_membership(CLUB, "m-1");
        store.seed_membership(CLUB, "m-2");
        store.seed_member_units(CLUB, "m-1", dec!(1000));
        store.seed_member_units(CLUB, "m-2", dec!(500));
        store
    }

    fn prices() -> Arc<MockPriceProvider> {
        MockPriceProvider::with_prices(&[("aapl", dec!(175)), ("msft", dec!(287.5))])
    }

    #[tokio::test]
    async fn values_positions_and_cash() {
        let store = setup();
        let nav = service(&store, prices())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();

        assert_eq!(nav.market_value, dec!(14500));
        assert_eq!(nav.bank_cash, dec!(1000));
        assert_eq!(nav.brokerage_cash, dec!(2495));
        assert_eq!(nav.total_cash, dec!(3495));
        assert_eq!(nav.total_club_value, dec!(17995));
        assert_eq!(nav.total_units_outstanding, dec!(1500));
        assert_eq!(nav.unit_value, dec!(11.99666667));
        assert!(nav.unpriced_asset_ids.is_empty());
        assert_eq!(nav.positions.len(), 2);
    }

    #[tokio::test]
    async fn deposit_committed_during_price_lookup_is_not_half_counted() {
        let store = setup();
        let provider = prices();
        let concurrent = store.clone();
        provider.run_during_fetch(move || {
            concurrent.record_deposit(CLUB, "m-1", dec!(1200), dec!(100));
        });

        let nav = service(&store, provider)
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();

        // Bank and units both come from before the deposit.
        assert_eq!(nav.bank_cash, dec!(1000));
        assert_eq!(nav.total_units_outstanding, dec!(1500));
        assert_eq!(nav.unit_value, dec!(11.99666667));

        let after = service(&store, prices())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(after.bank_cash, dec!(2200));
        assert_eq!(after.total_units_outstanding, dec!(1600));
    }

    #[tokio::test]
    async fn preview_stores_nothing() {
        let store = setup();
        let svc = service(&store, prices());
        svc.preview_nav(CLUB, date(2024, 3, 31)).await.unwrap();
        assert_eq!(
            svc.get_latest_unit_value(CLUB).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn stored_snapshot_is_unique_per_date() {
        let store = setup();
        let svc = service(&store, prices());
        let snapshot = svc
            .calculate_and_store_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(snapshot.unit_value, dec!(11.99666667));
        assert_eq!(snapshot.total_club_value, dec!(17995));

        let err = svc
            .calculate_and_store_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn missing_price_values_asset_at_zero() {
        let store = setup();
        let provider = MockPriceProvider::with_prices(&[("aapl", dec!(175)), ("msft", dec!(0))]);
        let nav = service(&store, provider)
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(nav.market_value, dec!(8750));
        assert_eq!(nav.unpriced_asset_ids, vec!["msft".to_string()]);
        assert_eq!(nav.total_club_value, dec!(12245));
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable() {
        let store = setup();
        let err = service(&store, MockPriceProvider::failing())
            .calculate_and_store_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(service(&store, prices())
            .list_unit_value_history(CLUB, None, None)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn cash_only_club_skips_price_lookup() {
        let store = InMemoryStore::new();
        store.seed_club(CLUB, dec!(500));
        store.seed_fund(CLUB, "fund-a", dec!(500));
        store.seed_membership(CLUB, "m-1");
        store.seed_member_units(CLUB, "m-1", dec!(100));
        let provider = MockPriceProvider::failing();

        let nav = service(&store, provider.clone())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(nav.unit_value, dec!(10));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn closed_positions_are_not_priced() {
        let store = setup();
        store.seed_stock("ibm", "IBM");
        store.seed_position("fund-a", "ibm", dec!(0), dec!(100));
        let nav = service(&store, prices())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert!(nav.positions.iter().all(|p| p.asset_id != "ibm"));
        assert!(nav.unpriced_asset_ids.is_empty());
    }

    #[tokio::test]
    async fn inactive_funds_still_count() {
        let store = setup();
        store.seed_fund(CLUB, "fund-old", dec!(5));
        store.set_fund_active("fund-old", false).await.unwrap();
        let nav = service(&store, prices())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(nav.brokerage_cash, dec!(2500));
    }

    #[tokio::test]
    async fn zero_units_give_zero_unit_value() {
        let store = InMemoryStore::new();
        store.seed_club(CLUB, dec!(250));
        let nav = service(&store, prices())
            .preview_nav(CLUB, date(2024, 3, 31))
            .await
            .unwrap();
        assert_eq!(nav.total_club_value, dec!(250));
        assert_eq!(nav.unit_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn history_queries() {
        let store = setup();
        store.seed_unit_value(CLUB, date(2024, 1, 31), dec!(1500), dec!(10.5));
        store.seed_unit_value(CLUB, date(2024, 3, 31), dec!(1500), dec!(12));
        store.seed_unit_value(CLUB, date(2024, 2, 29), dec!(1500), dec!(11));
        let svc = service(&store, prices());

        assert_eq!(
            svc.get_latest_unit_value(CLUB).unwrap().valuation_date,
            date(2024, 3, 31)
        );
        assert_eq!(
            svc.get_unit_value_on(CLUB, date(2024, 2, 29))
                .unwrap()
                .unit_value,
            dec!(11)
        );
        assert_eq!(
            svc.get_unit_value_on(CLUB, date(2024, 2, 28))
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );

        let range = svc
            .list_unit_value_history(CLUB, Some(date(2024, 2, 1)), None)
            .unwrap();
        let values: Vec<Decimal> = range.iter().map(|s| s.unit_value).collect();
        assert_eq!(values, vec![dec!(11), dec!(12)]);
    }

    #[tokio::test]
    async fn unknown_club_is_not_found() {
        let store = InMemoryStore::new();
        let err = service(&store, prices())
            .preview_nav("nope", date(2024, 3, 31))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
