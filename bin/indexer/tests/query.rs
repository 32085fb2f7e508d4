//! Integration tests for query triggers, refusals and failures.


use indexer::{view, QueryRejected, Validity};
use setup::{app_without_wallet, balances, token_address, MockBalances, MockMetadata, OWNER};
use token::{fetch_result_set, AddressError, QueryError};

#[tokio::test]
async fn test_short_address_is_refused_without_request() {
    let service = MockBalances::new(balances(3));
    let metadata = MockMetadata::new();
    let mut app = app_without_wallet();

    let short = &OWNER[..41];
    assert_eq!(
        *app.set_address_text(short),
        Validity::Invalid(AddressError::InvalidLength(39))
    );

    let err = app
        .run_query(service.as_ref(), metadata.as_ref())
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<QueryRejected>(),
        Some(&QueryRejected::InvalidAddress(AddressError::InvalidLength(39)))
    );
    assert_eq!(service.calls(), 0);
    assert!(!app.is_loading());
    assert!(!app.has_queried());
}

#[tokio::test]
async fn test_invalid_edit_after_valid_address_is_refused() {
    let service = MockBalances::new(balances(3));
    let mut app = app_without_wallet();

    app.set_address_text(OWNER);
    app.set_address_text("0xzz");
    assert!(app.input().active().is_some());

    assert_eq!(app.begin_query(), Err(QueryRejected::InvalidAddress(AddressError::InvalidHex)));
    assert_eq!(service.calls(), 0);
    assert!(view::render(&app).contains("invalid address"));
}

#[tokio::test]
async fn test_second_trigger_while_loading() {
    let service = MockBalances::new(balances(3));
    let metadata = MockMetadata::new();
    let mut app = app_without_wallet();

    app.set_address_text(OWNER);
    let owner = app.begin_query().unwrap();
    assert!(view::render(&app).contains(view::LOADING));
    assert_eq!(app.begin_query(), Err(QueryRejected::InFlight));

    let outcome = fetch_result_set(service.as_ref(), metadata.as_ref(), owner).await;
    assert_eq!(app.finish_query(outcome).unwrap(), 3);
    assert_eq!(service.calls(), 1);
    assert!(!app.is_loading());
}

#[tokio::test]
async fn test_failure_keeps_previous_results() {
    let service = MockBalances::new(balances(20));
    let metadata = MockMetadata::new();
    let mut app = app_without_wallet();

    app.set_address_text(OWNER);
    app.run_query(service.as_ref(), metadata.as_ref()).await.unwrap();
    app.load_more();

    service.set_failing(true);
    let err = app
        .run_query(service.as_ref(), metadata.as_ref())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QueryError>(),
        Some(QueryError::Service(_))
    ));

    assert!(!app.is_loading());
    assert!(app.has_queried());
    let listing = app.listing().unwrap();
    assert_eq!(listing.displayed().len(), 20);
    assert_eq!(listing.current_page(), 2);
    assert!(app.last_error().is_some());
    assert!(view::render(&app).contains("Error: "));

    service.set_failing(false);
    app.run_query(service.as_ref(), metadata.as_ref()).await.unwrap();
    assert!(app.last_error().is_none());
}

#[tokio::test]
async fn test_single_metadata_failure_fails_cycle() {
    let service = MockBalances::new(balances(10));
    let metadata = MockMetadata::new();
    metadata.fail_for(token_address(7));
    let mut app = app_without_wallet();

    app.set_address_text(OWNER);
    let err = app
        .run_query(service.as_ref(), metadata.as_ref())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<QueryError>(),
        Some(QueryError::Metadata { contract, .. }) if *contract == token_address(7)
    ));
    assert!(!app.has_queried());
    assert!(!app.is_loading());
}
