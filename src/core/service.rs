use crate::core::clock::SystemClock;
use crate::core::{
    ApiResult, Cargo, Clock, ConfigProvider, Declaration, Id, Order, Page, RecordStore, Result,
};
use crate::domain::model::{CargoStatus, TransitionPolicy};
use crate::utils::error::CustomsError;
use crate::utils::validation::{validate_finite, validate_positive_number};

/// Declaration workflow: cargo registration, customs declaration, ordering
/// and declaration listing.
///
/// Every operation returns an [`ApiResult`]; errors never escape.
pub struct DeclarationService<S: RecordStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    policy: TransitionPolicy,
    compensate: bool,
}

impl<S: RecordStore> DeclarationService<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: RecordStore, C: Clock> DeclarationService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            policy: TransitionPolicy::default(),
            compensate: true,
        }
    }

    pub fn from_config<P: ConfigProvider>(store: S, clock: C, config: &P) -> Self {
        Self::with_clock(store, clock)
            .with_transition_policy(config.transition_policy())
            .with_compensation(config.compensate_on_failure())
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether a failed child insert restores the cargo's previous status.
    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create_goods(&self, cargo: Cargo) -> ApiResult<Cargo> {
        let result = async {
            validate_finite("weight_kg", cargo.weight_kg)?;
            self.store.insert(cargo).await
        }
        .await;

        match result {
            Ok(stored) => {
                tracing::info!(cargo_id = ?stored.id, status = %stored.status, "Cargo registered");
                ApiResult::success(stored)
            }
            Err(e) => Self::fail("create_goods", e),
        }
    }

    pub async fn declare_goods(&self, cargo_id: Id) -> ApiResult<Declaration> {
        match self.try_declare(cargo_id).await {
            Ok(declaration) => {
                tracing::info!(
                    cargo_id,
                    declaration_no = %declaration.declaration_no,
                    "Cargo declared"
                );
                ApiResult::success(declaration)
            }
            Err(e) => Self::fail("declare_goods", e),
        }
    }

    pub async fn create_order(&self, cargo_id: Id, customer_id: Id) -> ApiResult<Order> {
        match self.try_order(cargo_id, customer_id).await {
            Ok(order) => {
                tracing::info!(
                    cargo_id,
                    customer_id,
                    order_no = %order.order_no,
                    "Order created"
                );
                ApiResult::success(order)
            }
            Err(e) => Self::fail("create_order", e),
        }
    }

    pub async fn find_declaration(&self, page: u64, size: u64) -> ApiResult<Page<Declaration>> {
        let result = async {
            validate_positive_number("page", page, 1)?;
            validate_positive_number("size", size, 1)?;
            self.store.find_page::<Declaration>(page, size).await
        }
        .await;

        match result {
            Ok(found) => {
                tracing::debug!(page, size, total = found.total, "Listed declarations");
                ApiResult::success(found)
            }
            Err(e) => Self::fail("find_declaration", e),
        }
    }

    pub async fn find_all_declaration(&self) -> ApiResult<Vec<Declaration>> {
        match self.store.find_all::<Declaration>().await {
            Ok(all) => {
                tracing::debug!(count = all.len(), "Listed all declarations");
                ApiResult::success(all)
            }
            Err(e) => Self::fail("find_all_declaration", e),
        }
    }

    async fn try_declare(&self, cargo_id: Id) -> Result<Declaration> {
        let existing = self
            .store
            .find_one(|d: &Declaration| d.cargo_id == cargo_id)
            .await?;
        if existing.is_some() {
            return Err(CustomsError::DuplicateDeclaration { cargo_id });
        }

        let declaration = Declaration::new(cargo_id, self.clock.now());
        let previous = self
            .transition_cargo(cargo_id, CargoStatus::Declared)
            .await?;

        match self.store.insert(declaration).await {
            Ok(stored) => Ok(stored),
            // lost the race to a concurrent declaration; its status change stands
            Err(CustomsError::Conflict { .. }) => {
                Err(CustomsError::DuplicateDeclaration { cargo_id })
            }
            Err(e) => {
                self.restore(cargo_id, previous).await;
                Err(e)
            }
        }
    }

    async fn try_order(&self, cargo_id: Id, customer_id: Id) -> Result<Order> {
        let order = Order::new(cargo_id, customer_id, self.clock.now());
        let previous = self
            .transition_cargo(cargo_id, CargoStatus::PendingCustomsClearance)
            .await?;

        match self.store.insert(order).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                self.restore(cargo_id, previous).await;
                Err(e)
            }
        }
    }

    /// Moves the cargo to `next` and returns the status it had before.
    ///
    /// A cargo already in `next` is rewritten unchanged without a policy check.
    async fn transition_cargo(&self, cargo_id: Id, next: CargoStatus) -> Result<CargoStatus> {
        let mut cargo = self
            .store
            .get_by_id::<Cargo>(cargo_id)
            .await?
            .ok_or(CustomsError::NotFound {
                entity: "cargo",
                id: cargo_id,
            })?;

        let current = cargo.status;
        if current != next && !current.can_transition_to(next) {
            match self.policy {
                TransitionPolicy::Strict => {
                    return Err(CustomsError::InvalidTransition {
                        cargo_id,
                        from: current,
                        to: next,
                    });
                }
                TransitionPolicy::Permissive => {
                    tracing::warn!(
                        cargo_id,
                        from = %current,
                        to = %next,
                        "Cargo status change outside the lifecycle table"
                    );
                }
            }
        }

        cargo.status = next;
        self.store.update_by_id(&cargo).await?;
        Ok(current)
    }

    /// Puts back only the status; other cargo fields keep whatever is stored now.
    async fn restore(&self, cargo_id: Id, previous: CargoStatus) {
        if !self.compensate {
            tracing::warn!(cargo_id, "Child insert failed; cargo status left updated");
            return;
        }

        let restored = async {
            let mut cargo = self
                .store
                .get_by_id::<Cargo>(cargo_id)
                .await?
                .ok_or(CustomsError::NotFound {
                    entity: "cargo",
                    id: cargo_id,
                })?;
            cargo.status = previous;
            self.store.update_by_id(&cargo).await
        }
        .await;

        match restored {
            Ok(()) => tracing::warn!(
                cargo_id,
                status = %previous,
                "Child insert failed; cargo status restored"
            ),
            Err(e) => tracing::error!(cargo_id, "Failed to restore cargo status: {}", e),
        }
    }

    fn fail<T>(operation: &str, e: CustomsError) -> ApiResult<T> {
        match e.result_code() {
            crate::core::ResultCode::Error => {
                tracing::error!(operation, category = ?e.category(), "{}", e)
            }
            _ => tracing::warn!(operation, "{}", e),
        }
        e.into()
    }
}
