use super::steps::referral_bonus;
use super::*;
use crate::config::AdminAllowlist;
use crate::models::{NewProduct, NewPromo, User};
use crate::repositories::Repository;
use crate::store::{KeyNamespace, KeyValueStore, MemoryStore};
use std::sync::Arc;
use storefront_shared::OrderItem;
use tokio_test::assert_ok;

struct Harness {
    store: Arc<MemoryStore>,
    repos: Repositories,
    stats: StatsService,
    engine: SettlementEngine,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::new(
        store.clone(),
        &KeyNamespace::new("test_shop"),
        AdminAllowlist::default(),
    );
    let stats = StatsService::new(repos.clone());
    let users = UserService::new(repos.users.clone(), stats.clone());
    let engine = SettlementEngine::new(repos.clone(), users, stats.clone());
    Harness {
        store,
        repos,
        stats,
        engine,
    }
}

impl Harness {
    async fn product(&self, name: &str, stock: i64) -> i64 {
        self.repos
            .products
            .create(NewProduct {
                name: name.to_string(),
                category: "liquids".to_string(),
                price: 1000,
                stock,
                description: None,
                emoji: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn user_with_bonus(&self, id: i64, bonus: i64) -> User {
        let mut user = self.repos.users.create_default(id).await.unwrap();
        user.bonus = bonus;
        self.repos.users.save(user).await.unwrap()
    }

    async fn promo(&self, code: &str, discount: i64, uses: i64, used: i64) {
        self.repos
            .promos
            .create(NewPromo {
                code: code.to_string(),
                discount,
                uses,
                used,
            })
            .await
            .unwrap();
    }

    async fn user(&self, id: i64) -> User {
        self.repos.users.find_by_id(id).await.unwrap().unwrap()
    }
}

fn draft(user_id: i64, items: Vec<OrderItem>, total: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: Some(user_id),
        items: Some(items),
        total: Some(total),
        promo_code: None,
        referral_code: None,
    }
}

#[tokio::test]
async fn test_plain_order_decrements_stock_and_counts_in_stats() {
    let h = harness();
    let product_id = h.product("A", 10).await;
    let before = h.stats.get().await.unwrap();

    let order = h
        .engine
        .settle(draft(100, vec![OrderItem::new(product_id, 1)], 1000))
        .await
        .unwrap();

    assert_eq!(order.total, 1000);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, 100);

    let product = h.repos.products.find_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 9);

    let after = h.stats.get().await.unwrap();
    assert_eq!(after.total_orders, before.total_orders + 1);

    let stored = h.repos.orders.find_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn test_promo_discount_applies_and_consumes_a_use() {
    let h = harness();
    h.promo("SAVE10", 10, 5, 0).await;

    let mut request = draft(100, vec![OrderItem::new(1, 1)], 1000);
    request.promo_code = Some("SAVE10".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(order.total, 900);
    assert_eq!(order.promo_code.as_deref(), Some("SAVE10"));
    let promo = h.repos.promos.find_by_id("SAVE10".to_string()).await.unwrap().unwrap();
    assert_eq!(promo.used, 1);
}

#[tokio::test]
async fn test_promo_discount_rounds_down() {
    let h = harness();
    h.promo("ODD15", 15, 5, 0).await;

    let mut request = draft(100, vec![OrderItem::new(1, 1)], 999);
    request.promo_code = Some("ODD15".to_string());

    assert_eq!(h.engine.settle(request).await.unwrap().total, 849);
}

#[tokio::test]
async fn test_exhausted_promo_is_ignored() {
    let h = harness();
    h.promo("GONE", 50, 3, 3).await;

    let mut request = draft(100, vec![OrderItem::new(1, 1)], 1000);
    request.promo_code = Some("GONE".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(order.total, 1000);
    let promo = h.repos.promos.find_by_id("GONE".to_string()).await.unwrap().unwrap();
    assert_eq!(promo.used, 3);
}

#[tokio::test]
async fn test_unknown_promo_is_ignored() {
    let h = harness();
    let mut request = draft(100, vec![OrderItem::new(1, 1)], 1000);
    request.promo_code = Some("NOPE".to_string());

    let order = assert_ok!(h.engine.settle(request).await);
    assert_eq!(order.total, 1000);
}

#[tokio::test]
async fn test_bonus_is_redeemed_against_total() {
    let h = harness();
    h.user_with_bonus(100, 300).await;

    let order = h
        .engine
        .settle(draft(100, vec![OrderItem::new(1, 1)], 1000))
        .await
        .unwrap();

    assert_eq!(order.total, 700);
    assert_eq!(h.user(100).await.bonus, 0);
}

#[tokio::test]
async fn test_bonus_larger_than_total_leaves_remainder() {
    let h = harness();
    h.user_with_bonus(100, 1500).await;

    let order = h
        .engine
        .settle(draft(100, vec![OrderItem::new(1, 1)], 1000))
        .await
        .unwrap();

    assert_eq!(order.total, 0);
    assert_eq!(h.user(100).await.bonus, 500);
}

#[tokio::test]
async fn test_bonus_is_redeemed_after_promo() {
    let h = harness();
    h.promo("SAVE10", 10, 5, 0).await;
    h.user_with_bonus(100, 300).await;

    let mut request = draft(100, vec![OrderItem::new(1, 1)], 1000);
    request.promo_code = Some("SAVE10".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(order.total, 600);
    assert_eq!(h.user(100).await.bonus, 0);
}

#[tokio::test]
async fn test_referral_bonus_on_first_order() {
    let h = harness();
    h.user_with_bonus(5, 0).await;

    let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
    request.referral_code = Some("REF000005".to_string());
    let order = h.engine.settle(request).await.unwrap();

    let referrer = h.user(5).await;
    assert_eq!(referrer.bonus, 100);
    assert_eq!(referrer.referrals, vec![9]);

    // The invited user's fresh bonus is spent right away by the redemption step.
    assert_eq!(order.total, 900);
    assert_eq!(h.user(9).await.bonus, 0);
}

#[tokio::test]
async fn test_referral_bonus_uses_total_before_promo() {
    let h = harness();
    h.user_with_bonus(5, 0).await;
    h.promo("HALF", 50, 1, 0).await;

    let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
    request.referral_code = Some("REF000005".to_string());
    request.promo_code = Some("HALF".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(h.user(5).await.bonus, 100);
    assert_eq!(order.total, 400);
}

#[tokio::test]
async fn test_no_referral_bonus_after_first_order() {
    let h = harness();
    h.user_with_bonus(5, 0).await;
    h.engine
        .settle(draft(9, vec![OrderItem::new(1, 1)], 500))
        .await
        .unwrap();

    let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
    request.referral_code = Some("REF000005".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(order.total, 1000);
    let referrer = h.user(5).await;
    assert_eq!(referrer.bonus, 0);
    assert!(referrer.referrals.is_empty());
}

#[tokio::test]
async fn test_unknown_referral_code_is_ignored() {
    let h = harness();
    let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
    request.referral_code = Some("REF424242".to_string());

    let order = h.engine.settle(request).await.unwrap();
    assert_eq!(order.total, 1000);
    assert!(h.repos.users.find_by_id(9).await.unwrap().is_none());
}

#[tokio::test]
async fn test_retry_after_abort_credits_referral_twice() {
    let h = harness();
    h.user_with_bonus(5, 0).await;
    h.promo("BROKEN", 10, 5, 0).await;
    h.store
        .set(
            "test_shop:promos:BROKEN",
            &[("discount".to_string(), "ten".to_string())],
        )
        .await
        .unwrap();

    let request = || {
        let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
        request.referral_code = Some("REF000005".to_string());
        request.promo_code = Some("BROKEN".to_string());
        request
    };

    // The promo step fails after the referral step has already paid out, and
    // nothing is rolled back, so retrying the same request pays out again.
    for _ in 0..2 {
        let err = h.engine.settle(request()).await.unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    let referrer = h.user(5).await;
    assert_eq!(referrer.bonus, 200);
    assert_eq!(referrer.referrals, vec![9]);
    assert_eq!(h.user(9).await.bonus, 200);
    assert!(h.repos.orders.list().await.unwrap().is_empty());
    assert_eq!(h.repos.orders.next_id().await.unwrap(), 3);
}

#[tokio::test]
async fn test_stock_never_goes_negative_and_missing_products_are_skipped() {
    let h = harness();
    let scarce = h.product("Scarce", 2).await;

    let order = h
        .engine
        .settle(draft(
            100,
            vec![OrderItem::new(scarce, 5), OrderItem::new(404, 1)],
            1000,
        ))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    let product = h.repos.products.find_by_id(scarce).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
}

#[tokio::test]
async fn test_stock_failure_does_not_fail_the_order() {
    let h = harness();
    let broken = h.product("Broken", 4).await;
    let fine = h.product("Fine", 4).await;
    h.store
        .set(
            &format!("test_shop:products:{}", broken),
            &[("stock".to_string(), "many".to_string())],
        )
        .await
        .unwrap();

    let order = h
        .engine
        .settle(draft(
            100,
            vec![OrderItem::new(broken, 1), OrderItem::new(fine, 1)],
            1000,
        ))
        .await
        .unwrap();

    assert!(h.repos.orders.find_by_id(order.id).await.unwrap().is_some());
    let fine = h.repos.products.find_by_id(fine).await.unwrap().unwrap();
    assert_eq!(fine.stock, 3);
}

#[tokio::test]
async fn test_missing_fields_are_rejected_before_allocating_an_id() {
    let h = harness();
    let cases = [
        (
            CreateOrderRequest {
                user_id: None,
                ..draft(1, vec![OrderItem::new(1, 1)], 10)
            },
            "Missing field: userId",
        ),
        (
            CreateOrderRequest {
                items: None,
                ..draft(1, vec![], 10)
            },
            "Missing field: items",
        ),
        (
            CreateOrderRequest {
                total: None,
                ..draft(1, vec![OrderItem::new(1, 1)], 10)
            },
            "Missing field: total",
        ),
        (draft(1, vec![], 10), "Order must contain items"),
    ];

    for (request, expected) in cases {
        match h.engine.settle(request).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    assert!(!h.store.exists("test_shop:orders:counter").await.unwrap());
}

#[tokio::test]
async fn test_negative_total_and_quantity_are_rejected() {
    let h = harness();
    assert!(matches!(
        h.engine.settle(draft(1, vec![OrderItem::new(1, 1)], -1)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        h.engine.settle(draft(1, vec![OrderItem::new(1, 0)], 10)).await,
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_referral_bonus_rounds_down() {
    assert_eq!(referral_bonus(1000), 100);
    assert_eq!(referral_bonus(999), 99);
    assert_eq!(referral_bonus(5), 0);
}

#[test]
fn test_pipeline_order_and_policies() {
    let names: Vec<&str> = SETTLEMENT_PIPELINE.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "referral_bonus",
            "promo_discount",
            "bonus_redemption",
            "persist_order",
            "stock_decrement",
            "stats_refresh",
        ]
    );
    assert_eq!(
        SettlementStep::PersistOrder.failure_policy(),
        FailurePolicy::Abort
    );
    assert_eq!(
        SettlementStep::StockDecrement.failure_policy(),
        FailurePolicy::LogAndContinue
    );
}

#[test]
fn test_referral_bonus_handles_huge_totals() {
    assert_eq!(referral_bonus(i64::MAX), i64::MAX / 10);
    assert_eq!(referral_bonus(-50), 0);
}

#[tokio::test]
async fn test_huge_total_with_promo_settles() {
    let h = harness();
    h.promo("SAVE10", 10, 5, 0).await;
    let total = i64::MAX / 50;

    let mut request = draft(100, vec![OrderItem::new(1, 1)], total);
    request.promo_code = Some("SAVE10".to_string());
    let order = h.engine.settle(request).await.unwrap();

    assert_eq!(order.total, (total as i128 * 90 / 100) as i64);
}

#[tokio::test]
async fn test_huge_total_with_referral_credits_positive_bonus() {
    let h = harness();
    h.user_with_bonus(5, 0).await;
    let total = i64::MAX / 5;

    let mut request = draft(9, vec![OrderItem::new(1, 1)], total);
    request.referral_code = Some("REF000005".to_string());
    let order = h.engine.settle(request).await.unwrap();

    let bonus = (total as i128 * 10 / 100) as i64;
    assert!(bonus > 0);
    assert_eq!(h.user(5).await.bonus, bonus);
    assert_eq!(order.total, total - bonus);
}

#[tokio::test]
async fn test_bonus_balance_overflow_aborts_settlement() {
    let h = harness();
    h.user_with_bonus(5, i64::MAX).await;

    let mut request = draft(9, vec![OrderItem::new(1, 1)], 1000);
    request.referral_code = Some("REF000005".to_string());

    assert!(matches!(
        h.engine.settle(request).await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(h.user(5).await.bonus, i64::MAX);
    assert!(h.repos.orders.list().await.unwrap().is_empty());
}
