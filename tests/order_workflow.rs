mod common;

use common::{add_product, input, login_as, setup};
use opensase_supermarket::domain::aggregates::{OrderStatus, Role};
use opensase_supermarket::domain::value_objects::Money;
use opensase_supermarket::services::SearchRequest;
use opensase_supermarket::StorefrontError;

#[tokio::test]
async fn test_place_order_scenario() {
    let (state, notifier) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let a = add_product(&state, &admin, "Product A", 1000, 10).await;
    let b = add_product(&state, &admin, "Product B", 500, 10).await;

    state.shopping.add_to_cart(&alice, a.id(), 2).await.unwrap();
    state.shopping.add_to_cart(&alice, b.id(), 1).await.unwrap();

    let order = state.orders.place_order(&alice).await.unwrap();
    assert_eq!(order.total(), Money::from_minor(2500));
    assert_eq!(order.status(), OrderStatus::Processing);
    assert_eq!(order.lines().len(), 2);
    assert_eq!(order.lines_total(), Some(order.total()));

    assert_eq!(state.catalog.get_product(a.id()).await.unwrap().stock(), 8);
    assert_eq!(state.catalog.get_product(b.id()).await.unwrap().stock(), 9);
    assert!(state.shopping.view_cart(&alice).await.unwrap().lines.is_empty());

    let history = state.orders.history(&alice).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id(), order.id());
    assert_eq!(history[0].lines().len(), 2);

    let sent = notifier.sent();
    assert!(sent.iter().any(|n| n.recipient == "alice" && n.subject == format!("Order #{} confirmed", order.id())));
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let (state, _) = setup().await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    assert!(matches!(state.orders.place_order(&alice).await, Err(StorefrontError::EmptyCart)));
    assert!(state.orders.history(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insufficient_stock_leaves_everything_unchanged() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let a = add_product(&state, &admin, "Rice", 1000, 10).await;
    let b = add_product(&state, &admin, "Beans", 500, 5).await;

    state.shopping.add_to_cart(&alice, a.id(), 2).await.unwrap();
    state.shopping.add_to_cart(&alice, b.id(), 4).await.unwrap();
    // Stock drops below the cart after it was filled.
    state.catalog.update_product(&admin, b.id(), input("Beans", "groceries", 500, 3)).await.unwrap();

    let err = state.orders.place_order(&alice).await.unwrap_err();
    match err {
        StorefrontError::InsufficientStock { product_id, product, available, requested } => {
            assert_eq!(product_id, b.id());
            assert_eq!(product, "Beans");
            assert_eq!(available, 3);
            assert_eq!(requested, 4);
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(state.catalog.get_product(a.id()).await.unwrap().stock(), 10);
    assert_eq!(state.catalog.get_product(b.id()).await.unwrap().stock(), 3);
    assert_eq!(state.shopping.view_cart(&alice).await.unwrap().lines.len(), 2);
    assert!(state.orders.history(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_total_ignores_later_price_changes() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Milk", 1200, 10).await;

    state.shopping.add_to_cart(&alice, p.id(), 3).await.unwrap();
    let order = state.orders.place_order(&alice).await.unwrap();
    state.catalog.update_product(&admin, p.id(), input("Milk", "drinks", 99_999, 7)).await.unwrap();

    let stored = state.orders.get_order(&alice, order.id()).await.unwrap();
    assert_eq!(stored.total(), Money::from_minor(3600));
    assert_eq!(stored.lines()[0].unit_price, Money::from_minor(1200));
    assert_eq!(stored.lines_total(), Some(stored.total()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_for_last_unit() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let bob = login_as(&state, "bob", Role::Customer).await;
    let p = add_product(&state, &admin, "Last Loaf", 800, 1).await;

    state.shopping.add_to_cart(&alice, p.id(), 1).await.unwrap();
    state.shopping.add_to_cart(&bob, p.id(), 1).await.unwrap();

    let (sa, sb) = (state.clone(), state.clone());
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { sa.orders.place_order(&alice).await }),
        tokio::spawn(async move { sb.orders.place_order(&bob).await }),
    );
    let results = [ra.unwrap(), rb.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| matches!(r, Err(StorefrontError::InsufficientStock { available: 0, requested: 1, .. }))).count(), 1);
    assert_eq!(state.catalog.get_product(p.id()).await.unwrap().stock(), 0);
}

#[tokio::test]
async fn test_cart_merges_and_removes_lines() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Eggs", 300, 10).await;

    state.shopping.add_to_cart(&alice, p.id(), 2).await.unwrap();
    let line = state.shopping.add_to_cart(&alice, p.id(), 3).await.unwrap();
    assert_eq!(line.quantity.value(), 5);

    let cart = state.shopping.view_cart(&alice).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.total, Money::from_minor(1500));

    // Merged quantity is checked against stock and the line stays as it was.
    assert!(matches!(
        state.shopping.add_to_cart(&alice, p.id(), 6).await,
        Err(StorefrontError::InsufficientStock { available: 10, requested: 11, .. })
    ));
    assert_eq!(state.shopping.view_cart(&alice).await.unwrap().lines[0].quantity.value(), 5);

    state.shopping.remove_from_cart(&alice, p.id()).await.unwrap();
    assert!(state.shopping.view_cart(&alice).await.unwrap().lines.is_empty());
    assert!(matches!(state.shopping.remove_from_cart(&alice, p.id()).await, Err(StorefrontError::NotFound { .. })));
    assert_eq!(state.catalog.get_product(p.id()).await.unwrap().stock(), 10);
}

#[tokio::test]
async fn test_add_to_cart_validation() {
    let (state, _) = setup().await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    assert!(matches!(state.shopping.add_to_cart(&alice, 1, 0).await, Err(StorefrontError::Validation(_))));
    assert!(matches!(state.shopping.add_to_cart(&alice, 999, 1).await, Err(StorefrontError::NotFound { .. })));
}

#[tokio::test]
async fn test_duplicate_username_keeps_first_account() {
    let (state, _) = setup().await;
    state.auth.register("alice", "first-password", Role::Customer).await.unwrap();
    let err = state.auth.register("alice", "second-password", Role::Admin).await.unwrap_err();
    assert!(matches!(err, StorefrontError::DuplicateUsername(ref name) if name == "alice"));

    let session = state.auth.login("alice", "first-password").await.unwrap();
    assert_eq!(session.role, Role::Customer);
    assert!(matches!(state.auth.login("alice", "second-password").await, Err(StorefrontError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_logout() {
    let (state, notifier) = setup().await;
    let session = login_as(&state, "carol", Role::Customer).await;
    assert_eq!(state.auth.session(&session.token).await.unwrap().username, "carol");
    assert!(matches!(state.auth.login("nobody", "x").await, Err(StorefrontError::InvalidCredentials)));
    assert!(matches!(state.auth.register("  ", "x", Role::Customer).await, Err(StorefrontError::Validation(_))));
    assert!(matches!(state.auth.register("dave", "", Role::Customer).await, Err(StorefrontError::Validation(_))));

    assert!(state.auth.logout(&session.token).await);
    assert!(!state.auth.logout(&session.token).await);
    assert!(matches!(state.auth.session(&session.token).await, Err(StorefrontError::Unauthenticated)));
    assert!(notifier.sent().iter().any(|n| n.recipient == "carol" && n.subject.starts_with("Welcome")));
}

#[tokio::test]
async fn test_catalog_mutations_require_admin() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Soap", 250, 4).await;

    assert!(matches!(state.catalog.add_product(&alice, input("Soap", "other", 1, 1)).await, Err(StorefrontError::PermissionDenied)));
    assert!(matches!(state.catalog.update_product(&alice, p.id(), input("Soap", "other", 1, 1)).await, Err(StorefrontError::PermissionDenied)));
    assert!(matches!(state.catalog.remove_product(&alice, p.id()).await, Err(StorefrontError::PermissionDenied)));
    assert!(matches!(state.orders.list_all(&alice).await, Err(StorefrontError::PermissionDenied)));

    assert!(matches!(state.catalog.add_product(&admin, input("Soap", "furniture", 1, 1)).await, Err(StorefrontError::Validation(_))));
    assert!(matches!(state.catalog.add_product(&admin, input("Soap", "other", 0, 1)).await, Err(StorefrontError::Validation(_))));
    assert!(matches!(state.catalog.update_product(&admin, 999, input("Soap", "other", 1, 1)).await, Err(StorefrontError::NotFound { .. })));
    assert!(matches!(state.catalog.remove_product(&admin, 999).await, Err(StorefrontError::NotFound { .. })));
}

#[tokio::test]
async fn test_removed_product_stays_in_history() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Seasonal Cake", 5000, 2).await;
    state.shopping.add_to_cart(&alice, p.id(), 1).await.unwrap();
    state.shopping.add_to_wishlist(&alice, p.id()).await.unwrap();
    let order = state.orders.place_order(&alice).await.unwrap();

    state.catalog.remove_product(&admin, p.id()).await.unwrap();

    let history = state.orders.history(&alice).await.unwrap();
    assert_eq!(history[0].id(), order.id());
    assert_eq!(history[0].lines()[0].product_id, p.id());
    assert_eq!(history[0].lines()[0].product_name, None);
    assert_eq!(history[0].total(), Money::from_minor(5000));
    assert!(state.shopping.view_wishlist(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_visibility() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let bob = login_as(&state, "bob", Role::Customer).await;
    let p = add_product(&state, &admin, "Tea", 700, 5).await;
    state.shopping.add_to_cart(&alice, p.id(), 1).await.unwrap();
    let order = state.orders.place_order(&alice).await.unwrap();

    assert!(matches!(state.orders.get_order(&bob, order.id()).await, Err(StorefrontError::NotFound { .. })));
    assert_eq!(state.orders.get_order(&admin, order.id()).await.unwrap().user_id(), alice.user_id);
    assert_eq!(state.orders.list_all(&admin).await.unwrap().len(), 1);
    assert!(state.orders.history(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_history_is_newest_first() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Bread", 400, 10).await;

    state.shopping.add_to_cart(&alice, p.id(), 1).await.unwrap();
    let first = state.orders.place_order(&alice).await.unwrap();
    state.shopping.add_to_cart(&alice, p.id(), 2).await.unwrap();
    let second = state.orders.place_order(&alice).await.unwrap();

    let history = state.orders.history(&alice).await.unwrap();
    assert_eq!(history.iter().map(|o| o.id()).collect::<Vec<_>>(), vec![second.id(), first.id()]);
    assert_eq!(history[0].total(), Money::from_minor(800));
    assert!(history.iter().all(|o| o.lines_total() == Some(o.total())));
}

#[tokio::test]
async fn test_search_filters() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    state.catalog.add_product(&admin, input("Apple Juice", "drinks", 1500, 5)).await.unwrap();
    state.catalog.add_product(&admin, input("Pineapple", "foods", 900, 5)).await.unwrap();
    state.catalog.add_product(&admin, input("Phone Charger", "electronics", 8000, 5)).await.unwrap();

    let all = state.catalog.search(SearchRequest::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.data.len(), 3);

    let apples = state.catalog.search(SearchRequest { query: Some("APPLE".into()), ..Default::default() }).await.unwrap();
    assert_eq!(apples.data.iter().map(|p| p.name()).collect::<Vec<_>>(), vec!["Apple Juice", "Pineapple"]);

    let drinks = state.catalog.search(SearchRequest { query: Some("apple".into()), category: Some("drinks".into()), ..Default::default() }).await.unwrap();
    assert_eq!(drinks.data.len(), 1);

    let priced = state.catalog.search(SearchRequest { min_price: Some(900), max_price: Some(1500), ..Default::default() }).await.unwrap();
    assert_eq!(priced.total, 2);

    let paged = state.catalog.search(SearchRequest { page: Some(2), per_page: Some(2), ..Default::default() }).await.unwrap();
    assert_eq!(paged.total, 3);
    assert_eq!(paged.data.len(), 1);
    assert_eq!(paged.data[0].name(), "Phone Charger");

    assert!(matches!(
        state.catalog.search(SearchRequest { min_price: Some(10), max_price: Some(5), ..Default::default() }).await,
        Err(StorefrontError::Validation(_))
    ));
    assert!(matches!(
        state.catalog.search(SearchRequest { category: Some("furniture".into()), ..Default::default() }).await,
        Err(StorefrontError::Validation(_))
    ));
}

#[tokio::test]
async fn test_demo_catalog_seeding() {
    let (state, _) = setup().await;
    assert_eq!(state.catalog.seed_demo_catalog().await.unwrap(), 500);
    assert_eq!(state.catalog.seed_demo_catalog().await.unwrap(), 0);

    let all = state.catalog.search(SearchRequest::default()).await.unwrap();
    assert_eq!(all.total, 500);
    assert!(all.data.iter().all(|p| (5..=10).contains(&p.stock())));
    assert!(all.data.iter().all(|p| (Money::from_major(500)..=Money::from_major(100_000)).contains(&p.unit_price())));
}

#[tokio::test]
async fn test_wishlist() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Dog Food", 6000, 3).await;

    assert!(state.shopping.add_to_wishlist(&alice, p.id()).await.unwrap());
    assert!(!state.shopping.add_to_wishlist(&alice, p.id()).await.unwrap());
    let items = state.shopping.view_wishlist(&alice).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Dog Food");

    state.shopping.remove_from_wishlist(&alice, p.id()).await.unwrap();
    assert!(matches!(state.shopping.remove_from_wishlist(&alice, p.id()).await, Err(StorefrontError::NotFound { .. })));
    assert!(matches!(state.shopping.add_to_wishlist(&alice, 999).await, Err(StorefrontError::NotFound { .. })));
}

#[tokio::test]
async fn test_ratings() {
    let (state, _) = setup().await;
    let admin = login_as(&state, "admin", Role::Admin).await;
    let alice = login_as(&state, "alice", Role::Customer).await;
    let p = add_product(&state, &admin, "Headphones", 25_000, 3).await;

    state.reviews.rate_product(&alice, p.id(), 4, "Solid bass").await.unwrap();
    state.reviews.rate_product(&alice, p.id(), 5, "Still great").await.unwrap();
    assert!(matches!(state.reviews.rate_product(&alice, p.id(), 6, "").await, Err(StorefrontError::Validation(_))));
    assert!(matches!(state.reviews.rate_product(&alice, 999, 3, "").await, Err(StorefrontError::NotFound { .. })));

    let reviews = state.reviews.product_reviews(p.id()).await.unwrap();
    assert_eq!(reviews.summary.count, 2);
    assert_eq!(reviews.summary.average, Some(4.5));
    assert_eq!(reviews.reviews.len(), 2);
    assert_eq!(reviews.reviews[0].review, "Still great");
    assert_eq!(reviews.reviews[0].username, "alice");
}
