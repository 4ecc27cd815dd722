use chrono::{NaiveDate, NaiveDateTime};
use customs_clearance::{
    Cargo, CargoStatus, CustomsError, Declaration, DeclarationService, DeclarationStatus,
    Entity, FixedClock, Id, InMemoryStore, Order, OrderStatus, Page, RecordStore, Result,
    ResultCode, TransitionPolicy,
};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn service_at(store: InMemoryStore, now: NaiveDateTime) -> DeclarationService<InMemoryStore, FixedClock> {
    DeclarationService::with_clock(store, FixedClock(now))
}

async fn register(service: &DeclarationService<impl RecordStore, FixedClock>, name: &str) -> Id {
    service
        .create_goods(Cargo::new(name))
        .await
        .into_data()
        .and_then(|c| c.id)
        .expect("cargo registered")
}

/// Delegates to an in-memory store but fails every insert into `fail_table`.
///
/// With `rename_cargo` set, that cargo is renamed just before the failing
/// insert, standing in for a concurrent edit.
#[derive(Clone)]
struct FailingInsertStore {
    inner: InMemoryStore,
    fail_table: &'static str,
    rename_cargo: Option<Id>,
}

impl FailingInsertStore {
    fn new(inner: InMemoryStore, fail_table: &'static str) -> Self {
        Self {
            inner,
            fail_table,
            rename_cargo: None,
        }
    }
}

impl RecordStore for FailingInsertStore {
    async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
        if E::TABLE == self.fail_table {
            if let Some(cargo_id) = self.rename_cargo {
                if let Some(mut cargo) = self.inner.get_by_id::<Cargo>(cargo_id).await? {
                    cargo.name = "renamed".to_string();
                    self.inner.update_by_id(&cargo).await?;
                }
            }
            return Err(CustomsError::StoreError {
                message: format!("{} table is read-only", E::TABLE),
            });
        }
        self.inner.insert(entity).await
    }

    async fn get_by_id<E: Entity>(&self, id: Id) -> Result<Option<E>> {
        self.inner.get_by_id(id).await
    }

    async fn update_by_id<E: Entity>(&self, entity: &E) -> Result<()> {
        self.inner.update_by_id(entity).await
    }

    async fn find_one<E, P>(&self, predicate: P) -> Result<Option<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool + Send,
    {
        self.inner.find_one(predicate).await
    }

    async fn find_page<E: Entity>(&self, page: u64, size: u64) -> Result<Page<E>> {
        self.inner.find_page(page, size).await
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        self.inner.find_all().await
    }
}

/// Lookups never find anything, so only the unique index can catch a
/// second declaration. Same interleaving as two requests racing past the check.
#[derive(Clone)]
struct BlindLookupStore {
    inner: InMemoryStore,
}

impl RecordStore for BlindLookupStore {
    async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
        self.inner.insert(entity).await
    }

    async fn get_by_id<E: Entity>(&self, id: Id) -> Result<Option<E>> {
        self.inner.get_by_id(id).await
    }

    async fn update_by_id<E: Entity>(&self, entity: &E) -> Result<()> {
        self.inner.update_by_id(entity).await
    }

    async fn find_one<E, P>(&self, _predicate: P) -> Result<Option<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool + Send,
    {
        Ok(None)
    }

    async fn find_page<E: Entity>(&self, page: u64, size: u64) -> Result<Page<E>> {
        self.inner.find_page(page, size).await
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        self.inner.find_all().await
    }
}

#[tokio::test]
async fn test_create_goods_is_retrievable_by_generated_id() {
    let store = InMemoryStore::new();
    let service = DeclarationService::new(store.clone());

    let result = service.create_goods(Cargo::new("rice")).await;
    assert_eq!(result.code, ResultCode::Success);

    let cargo = result.into_data().unwrap();
    let fetched: Cargo = store.get_by_id(cargo.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(fetched, cargo);
    assert_eq!(fetched.status, CargoStatus::Created);
}

#[tokio::test]
async fn test_create_goods_keeps_any_status_verbatim() {
    let service = DeclarationService::new(InMemoryStore::new());
    let cargo = service
        .create_goods(Cargo::new("wine").with_status(CargoStatus::PendingCustomsClearance))
        .await
        .into_data()
        .unwrap();
    assert_eq!(cargo.status, CargoStatus::PendingCustomsClearance);
}

#[tokio::test]
async fn test_declare_goods_creates_declaration_and_updates_cargo() {
    let store = InMemoryStore::new();
    let service = service_at(store.clone(), at(2024, 3, 5, 10, 20, 30));
    let cargo_id = register(&service, "copper").await;

    let result = service.declare_goods(cargo_id).await;
    assert_eq!(result.code, ResultCode::Success);

    let declaration = result.into_data().unwrap();
    assert_eq!(declaration.cargo_id, cargo_id);
    assert_eq!(declaration.status, DeclarationStatus::Declared);
    assert!(declaration.declaration_no.starts_with(&cargo_id.to_string()));
    assert_eq!(declaration.declaration_time, at(2024, 3, 5, 10, 20, 30));
    assert!(declaration.id.is_some());

    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Declared);
}

#[tokio::test]
async fn test_declaration_number_for_cargo_42() {
    let service = service_at(InMemoryStore::new(), at(2024, 3, 5, 10, 20, 30));
    let mut cargo_id = 0;
    for i in 1..=42 {
        cargo_id = register(&service, &format!("cargo-{}", i)).await;
    }
    assert_eq!(cargo_id, 42);

    let declaration = service.declare_goods(42).await.into_data().unwrap();
    assert_eq!(declaration.declaration_no, "4220240305102030");
}

#[tokio::test]
async fn test_second_declaration_is_duplicate_and_changes_nothing() {
    let store = InMemoryStore::new();
    let first_clock = at(2024, 3, 5, 10, 20, 30);
    let service = service_at(store.clone(), first_clock);
    let cargo_id = register(&service, "tin").await;

    let first = service.declare_goods(cargo_id).await.into_data().unwrap();

    let later = service_at(store.clone(), at(2024, 3, 6, 9, 0, 0));
    let second = later.declare_goods(cargo_id).await;
    assert_eq!(second.code, ResultCode::DuplicateDeclaration);
    assert!(second.data.is_none());

    let all = later.find_all_declaration().await.into_data().unwrap();
    assert_eq!(all, vec![first]);
    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Declared);
}

#[tokio::test]
async fn test_create_order_sets_pending_customs_clearance() {
    let store = InMemoryStore::new();
    let service = service_at(store.clone(), at(2024, 3, 5, 11, 0, 0));
    let cargo_id = register(&service, "coffee").await;
    service.declare_goods(cargo_id).await;

    let result = service.create_order(cargo_id, 777).await;
    assert_eq!(result.code, ResultCode::Success);

    let order = result.into_data().unwrap();
    assert_eq!(order.order_no, "77720240305110000");
    assert_eq!(order.customer_id, 777);
    assert_eq!(order.cargo_id, cargo_id);
    assert_eq!(order.status, OrderStatus::PendingOutbound);
    assert_eq!(order.order_time, at(2024, 3, 5, 11, 0, 0));

    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::PendingCustomsClearance);
}

#[tokio::test]
async fn test_orders_are_not_deduplicated() {
    let store = InMemoryStore::new();
    let service = DeclarationService::new(store.clone());
    let cargo_id = register_plain(&service, "sugar").await;
    service.declare_goods(cargo_id).await;

    assert!(service.create_order(cargo_id, 1).await.is_success());
    assert!(service.create_order(cargo_id, 2).await.is_success());
    let orders: Vec<Order> = store.find_all().await.unwrap();
    assert_eq!(orders.len(), 2);
}

async fn register_plain(service: &DeclarationService<InMemoryStore>, name: &str) -> Id {
    service
        .create_goods(Cargo::new(name))
        .await
        .into_data()
        .and_then(|c| c.id)
        .expect("cargo registered")
}

#[tokio::test]
async fn test_repeat_order_allowed_under_strict_policy() {
    let store = InMemoryStore::new();
    let service = DeclarationService::new(store.clone())
        .with_transition_policy(TransitionPolicy::Strict);
    let cargo_id = register_plain(&service, "cocoa").await;
    assert!(service.declare_goods(cargo_id).await.is_success());

    let first = service.create_order(cargo_id, 1).await;
    assert_eq!(first.code, ResultCode::Success);
    let second = service.create_order(cargo_id, 2).await;
    assert_eq!(second.code, ResultCode::Success);

    let orders: Vec<Order> = store.find_all().await.unwrap();
    assert_eq!(orders.len(), 2);
    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::PendingCustomsClearance);
}

#[tokio::test]
async fn test_create_goods_rejects_non_finite_weight() {
    let store = InMemoryStore::new();
    let service = DeclarationService::new(store.clone());

    for weight in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut cargo = Cargo::new("mystery");
        cargo.weight_kg = weight;
        let result = service.create_goods(cargo).await;
        assert_eq!(result.code, ResultCode::Error);
        assert!(result.message.contains("weight_kg"));
        assert!(result.data.is_none());
    }

    assert_eq!(store.count("cargo").await, 0);
}

#[tokio::test]
async fn test_find_declaration_first_page_of_fifteen() {
    let service = DeclarationService::new(InMemoryStore::new());
    for i in 0..15 {
        let cargo_id = register_plain(&service, &format!("crate-{}", i)).await;
        assert!(service.declare_goods(cargo_id).await.is_success());
    }

    let page = service.find_declaration(1, 10).await.into_data().unwrap();
    assert_eq!(page.records.len(), 10);
    assert_eq!(page.total, 15);
    assert_eq!(page.pages, 2);
    assert_eq!(page.current, 1);
    assert_eq!(page.size, 10);

    let second = service.find_declaration(2, 10).await.into_data().unwrap();
    assert_eq!(second.records.len(), 5);
    assert_eq!(second.records[0].cargo_id, 11);

    let beyond = service.find_declaration(3, 10).await;
    assert!(beyond.is_success());
    assert!(beyond.into_data().unwrap().records.is_empty());
}

#[tokio::test]
async fn test_find_all_declaration_on_empty_store() {
    let service = DeclarationService::new(InMemoryStore::new());
    let result = service.find_all_declaration().await;
    assert_eq!(result.code, ResultCode::Success);
    assert_eq!(result.into_data(), Some(Vec::<Declaration>::new()));
}

#[tokio::test]
async fn test_missing_cargo_is_not_found() {
    let store = InMemoryStore::new();
    let service = DeclarationService::new(store.clone());

    let declared = service.declare_goods(404).await;
    assert_eq!(declared.code, ResultCode::NotFound);
    assert_eq!(declared.message, "cargo 404 not found");

    let ordered = service.create_order(404, 1).await;
    assert_eq!(ordered.code, ResultCode::NotFound);

    assert_eq!(store.count("declaration").await, 0);
    assert_eq!(store.count("orders").await, 0);
}

#[tokio::test]
async fn test_order_before_declare_depends_on_policy() {
    let store = InMemoryStore::new();
    let strict = DeclarationService::new(store.clone())
        .with_transition_policy(TransitionPolicy::Strict);
    let cargo_id = register_plain(&strict, "oranges").await;

    let rejected = strict.create_order(cargo_id, 9).await;
    assert_eq!(rejected.code, ResultCode::InvalidTransition);
    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Created);
    assert_eq!(store.count("orders").await, 0);

    let permissive = DeclarationService::new(store.clone());
    assert!(permissive.create_order(cargo_id, 9).await.is_success());
    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::PendingCustomsClearance);
}

#[tokio::test]
async fn test_failed_declaration_insert_restores_cargo_status() {
    let inner = InMemoryStore::new();
    let store = FailingInsertStore::new(inner.clone(), "declaration");
    let service = DeclarationService::new(store);
    let cargo_id = service
        .create_goods(Cargo::new("nickel"))
        .await
        .into_data()
        .and_then(|c| c.id)
        .unwrap();

    let result = service.declare_goods(cargo_id).await;
    assert_eq!(result.code, ResultCode::Error);
    assert!(result.message.contains("read-only"));

    let cargo: Cargo = inner.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Created);
}

#[tokio::test]
async fn test_restore_keeps_fields_changed_during_declaration() {
    let inner = InMemoryStore::new();
    let cargo_id = inner
        .insert(Cargo::new("cobalt"))
        .await
        .unwrap()
        .id
        .unwrap();
    let store = FailingInsertStore {
        rename_cargo: Some(cargo_id),
        ..FailingInsertStore::new(inner.clone(), "declaration")
    };
    let service = DeclarationService::new(store);

    let result = service.declare_goods(cargo_id).await;
    assert_eq!(result.code, ResultCode::Error);

    let cargo: Cargo = inner.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Created);
    assert_eq!(cargo.name, "renamed");
}

#[tokio::test]
async fn test_failed_order_insert_without_compensation_leaves_status() {
    let inner = InMemoryStore::new();
    let store = FailingInsertStore::new(inner.clone(), "orders");
    let service = DeclarationService::new(store).with_compensation(false);
    let cargo_id = service
        .create_goods(Cargo::new("zinc").with_status(CargoStatus::Declared))
        .await
        .into_data()
        .and_then(|c| c.id)
        .unwrap();

    let result = service.create_order(cargo_id, 12).await;
    assert_eq!(result.code, ResultCode::Error);

    let cargo: Cargo = inner.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::PendingCustomsClearance);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_declarations_yield_one_success() {
    let store = InMemoryStore::new();
    let service = std::sync::Arc::new(DeclarationService::new(store.clone()));
    let cargo_id = register_plain(&service, "lithium").await;

    let (a, b) = tokio::join!(service.declare_goods(cargo_id), service.declare_goods(cargo_id));

    let codes = [a.code, b.code];
    assert_eq!(
        codes.iter().filter(|c| **c == ResultCode::Success).count(),
        1
    );
    assert_eq!(
        codes
            .iter()
            .filter(|c| **c == ResultCode::DuplicateDeclaration)
            .count(),
        1
    );

    assert_eq!(store.count("declaration").await, 1);
    let cargo: Cargo = store.get_by_id(cargo_id).await.unwrap().unwrap();
    assert_eq!(cargo.status, CargoStatus::Declared);
}

#[tokio::test]
async fn test_index_conflict_reports_duplicate_under_both_policies() {
    for policy in [TransitionPolicy::Permissive, TransitionPolicy::Strict] {
        let inner = InMemoryStore::new();
        let service = DeclarationService::new(BlindLookupStore {
            inner: inner.clone(),
        })
        .with_transition_policy(policy);
        let cargo_id = inner
            .insert(Cargo::new("gallium"))
            .await
            .unwrap()
            .id
            .unwrap();

        let first = service.declare_goods(cargo_id).await;
        assert_eq!(first.code, ResultCode::Success, "{:?}", policy);

        let second = service.declare_goods(cargo_id).await;
        assert_eq!(second.code, ResultCode::DuplicateDeclaration, "{:?}", policy);
        assert!(second.data.is_none());

        assert_eq!(inner.count("declaration").await, 1);
        let cargo: Cargo = inner.get_by_id(cargo_id).await.unwrap().unwrap();
        assert_eq!(cargo.status, CargoStatus::Declared);
    }
}
