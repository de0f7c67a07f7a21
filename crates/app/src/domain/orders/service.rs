//! Orders service.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    auth::{AdminCapability, Principal},
    database::Db,
    domain::{
        carts::PgCartsRepository,
        orders::{
            data::{Checkout, NewOrder, PaymentSetup},
            errors::OrdersServiceError,
            pricing::OrderTotals,
            records::{
                OrderItemRecord, OrderRecord, OrderStatus, OrderUuid, PaymentMethod, PaymentResult,
            },
            repository::{OrderInsert, PgOrdersRepository},
        },
        products::{PgProductsRepository, records::ProductUuid},
        users::records::UserUuid,
    },
    payments::{IntentStatus, NewPaymentIntent, PaymentGateway, PaymentGatewayError, PaymentIntent},
};

/// Outcome of a gateway-initiated payment confirmation.
#[derive(Debug, Clone)]
pub enum IntentConfirmation {
    /// This call flipped the order to paid.
    Paid(OrderRecord),

    /// The order was already paid, possibly by a concurrent confirmation.
    AlreadyPaid(OrderUuid),

    /// The order was cancelled before payment landed.
    Cancelled(OrderUuid),

    /// No order carries this intent.
    UnknownIntent,
}

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    repository: PgOrdersRepository,
    carts_repository: PgCartsRepository,
    products_repository: PgProductsRepository,
}

impl std::fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn PaymentGateway>, currency: impl Into<String>) -> Self {
        Self {
            db,
            gateway,
            currency: currency.into(),
            repository: PgOrdersRepository::new(),
            carts_repository: PgCartsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[OrderItemRecord],
    ) -> Result<(), OrdersServiceError> {
        for (product, quantity) in stock_lines(items) {
            let reserved = self
                .products_repository
                .reserve_stock(tx, product, quantity)
                .await?;

            if !reserved {
                return Err(OrdersServiceError::OutOfStock(product));
            }
        }

        Ok(())
    }

    async fn release_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
    ) -> Result<bool, OrdersServiceError> {
        if !self.repository.mark_stock_released(tx, order.uuid).await? {
            return Ok(false);
        }

        for (product, quantity) in stock_lines(&order.items) {
            self.products_repository
                .release_stock(tx, product, quantity)
                .await?;
        }

        Ok(true)
    }

    /// Take stock back for a cancelled order that is being reopened.
    async fn reclaim_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
    ) -> Result<bool, OrdersServiceError> {
        if !self.repository.clear_stock_released(tx, order.uuid).await? {
            return Ok(false);
        }

        self.reserve_stock(tx, &order.items).await?;

        Ok(true)
    }

    /// Undo a stripe checkout whose intent could not be created.
    async fn abandon_checkout(&self, order: &OrderRecord) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        self.release_stock(&mut tx, order).await?;
        self.repository.delete_order(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn finalize_stripe_checkout(
        &self,
        order: &OrderRecord,
        intent: &PaymentIntent,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .set_payment_intent(&mut tx, order.uuid, &intent.id)
            .await?;

        let mut cart = self
            .carts_repository
            .lock_cart(&mut tx, order.user_uuid)
            .await?;

        cart.clear();

        self.carts_repository.save_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Paid transition shared by explicit and gateway-initiated confirmation.
    async fn transition_to_paid(
        &self,
        order: OrderUuid,
        payment_result: Option<&PaymentResult>,
    ) -> Result<Option<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let paid = self
            .repository
            .mark_paid(&mut tx, order, payment_result)
            .await?;

        tx.commit().await?;

        Ok(paid)
    }

    async fn verified_payment(
        &self,
        order: &OrderRecord,
        payment_intent_id: Option<&str>,
    ) -> Result<PaymentResult, OrdersServiceError> {
        let intent_id = match (payment_intent_id, order.payment_intent_id.as_deref()) {
            (Some(given), Some(stored)) if given != stored => {
                return Err(OrdersServiceError::PaymentIntentMismatch);
            }
            (Some(given), _) => given,
            (None, Some(stored)) => stored,
            (None, None) => return Err(OrdersServiceError::MissingRequiredData),
        };

        let intent = self
            .gateway
            .retrieve_intent(intent_id)
            .await
            .map_err(OrdersServiceError::PaymentGateway)?;

        if intent.id != intent_id {
            return Err(OrdersServiceError::PaymentIntentMismatch);
        }

        if intent.status != IntentStatus::Succeeded {
            return Err(OrdersServiceError::PaymentNotSuccessful(
                intent.status.as_str().to_string(),
            ));
        }

        Ok(payment_result(&intent))
    }
}

fn payment_result(intent: &PaymentIntent) -> PaymentResult {
    PaymentResult {
        id: intent.id.clone(),
        status: intent.status.as_str().to_string(),
        update_time: Timestamp::now(),
        email: intent.receipt_email.clone(),
    }
}

/// Stock lines in product order, so every transaction locks product rows in the same sequence.
fn stock_lines(items: &[OrderItemRecord]) -> Vec<(ProductUuid, u32)> {
    let mut lines: Vec<(ProductUuid, u32)> = items
        .iter()
        .map(|item| (item.product_uuid, item.quantity))
        .collect();

    lines.sort_by_key(|(product, _)| *product);

    lines
}

/// An unpaid order that no longer holds its stock cannot be paid.
fn is_void(order: &OrderRecord) -> bool {
    !order.is_paid
        && (order.order_status == OrderStatus::Cancelled || order.stock_released_at.is_some())
}

/// Why a paid transition matched no row.
fn paid_conflict(order: &OrderRecord) -> OrdersServiceError {
    if is_void(order) {
        OrdersServiceError::Cancelled
    } else {
        OrdersServiceError::AlreadyPaid
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(user_uuid = %user, payment_method = %order.payment_method),
        err
    )]
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<Checkout, OrdersServiceError> {
        let missing = order.shipping_address.missing_fields();

        if !missing.is_empty() {
            return Err(OrdersServiceError::InvalidShippingAddress(missing));
        }

        let mut tx = self.db.begin().await?;

        let mut cart = self
            .carts_repository
            .find_cart_for_update(&mut tx, user)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(OrdersServiceError::EmptyCart)?;

        // The cart lock serialises this check against the user's other checkouts.
        if self.repository.has_pending_checkout(&mut tx, user).await? {
            return Err(OrdersServiceError::CheckoutInProgress);
        }

        let items: Vec<OrderItemRecord> = cart.items.iter().map(OrderItemRecord::from).collect();

        self.reserve_stock(&mut tx, &items).await?;

        let totals = OrderTotals::from_items_price(
            items
                .iter()
                .map(|item| item.price.saturating_mul(u64::from(item.quantity)))
                .fold(0, u64::saturating_add),
        );

        let (is_paid, order_status) = match order.payment_method {
            PaymentMethod::Cod => (true, OrderStatus::Processing),
            PaymentMethod::Stripe => (false, OrderStatus::Pending),
        };

        let created = self
            .repository
            .create_order(
                &mut tx,
                OrderInsert {
                    uuid: OrderUuid::new(),
                    user_uuid: user,
                    items: &items,
                    shipping_address: &order.shipping_address,
                    payment_method: order.payment_method,
                    totals,
                    is_paid,
                    order_status,
                },
            )
            .await?;

        if order.payment_method == PaymentMethod::Cod {
            cart.clear();
            self.carts_repository.save_cart(&mut tx, &cart).await?;
        }

        tx.commit().await?;

        if order.payment_method == PaymentMethod::Cod {
            info!(order_uuid = %created.uuid, total_price = created.total_price, "placed order");

            return Ok(Checkout {
                order: created,
                payment: None,
            });
        }

        let intent = self
            .gateway
            .create_intent(NewPaymentIntent {
                amount: created.total_price,
                currency: self.currency.clone(),
                metadata: BTreeMap::from([
                    ("order_uuid".to_string(), created.uuid.to_string()),
                    ("user_uuid".to_string(), user.to_string()),
                ]),
            })
            .await;

        let intent = match intent {
            Ok(intent) => intent,
            Err(error) => {
                warn!(order_uuid = %created.uuid, error = %error, "payment intent creation failed");

                self.abandon_checkout(&created).await?;

                return Err(OrdersServiceError::PaymentSetupFailed(error));
            }
        };

        let Some(client_secret) = intent.client_secret.clone() else {
            self.abandon_checkout(&created).await?;

            return Err(OrdersServiceError::PaymentSetupFailed(
                PaymentGatewayError::UnexpectedResponse(
                    "intent has no client secret".to_string(),
                ),
            ));
        };

        let updated = self.finalize_stripe_checkout(&created, &intent).await?;

        info!(
            order_uuid = %updated.uuid,
            payment_intent_id = %intent.id,
            total_price = updated.total_price,
            "placed order"
        );

        Ok(Checkout {
            order: updated,
            payment: Some(PaymentSetup {
                client_secret,
                payment_intent_id: intent.id,
            }),
        })
    }

    async fn get_order(
        &self,
        principal: Principal,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        if !principal.can_access(order.user_uuid) {
            return Err(OrdersServiceError::Forbidden);
        }

        Ok(order)
    }

    async fn list_my_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_orders_for_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_all_orders(
        &self,
        _admin: AdminCapability,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_orders(&mut tx).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.mark_paid",
        skip(self, principal, payment_intent_id),
        fields(order_uuid = %order, user_uuid = %principal.user_uuid),
        err
    )]
    async fn mark_paid(
        &self,
        principal: Principal,
        order: OrderUuid,
        payment_intent_id: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let current = self.get_order(principal, order).await?;

        if current.is_paid {
            return Err(OrdersServiceError::AlreadyPaid);
        }

        if is_void(&current) {
            return Err(OrdersServiceError::Cancelled);
        }

        let payment_result = match current.payment_method {
            PaymentMethod::Stripe => Some(
                self.verified_payment(&current, payment_intent_id.as_deref())
                    .await?,
            ),
            PaymentMethod::Cod => None,
        };

        match self
            .transition_to_paid(order, payment_result.as_ref())
            .await?
        {
            Some(paid) => {
                info!("order paid");

                Ok(paid)
            }
            None => {
                let latest = self.get_order(principal, order).await?;

                Err(paid_conflict(&latest))
            }
        }
    }

    #[tracing::instrument(
        name = "orders.service.confirm_intent",
        skip(self, intent),
        fields(payment_intent_id = %intent.id),
        err
    )]
    async fn confirm_intent(
        &self,
        intent: PaymentIntent,
    ) -> Result<IntentConfirmation, OrdersServiceError> {
        if intent.status != IntentStatus::Succeeded {
            return Err(OrdersServiceError::PaymentNotSuccessful(
                intent.status.as_str().to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let order = self
            .repository
            .find_order_by_intent(&mut tx, &intent.id)
            .await?;

        tx.commit().await?;

        let Some(order) = order else {
            warn!("payment intent matches no order");

            return Ok(IntentConfirmation::UnknownIntent);
        };

        if intent.amount != order.total_price {
            return Err(OrdersServiceError::PaymentIntentMismatch);
        }

        match self
            .transition_to_paid(order.uuid, Some(&payment_result(&intent)))
            .await?
        {
            Some(paid) => {
                info!(order_uuid = %paid.uuid, "order paid by gateway notification");

                Ok(IntentConfirmation::Paid(paid))
            }
            None => {
                let mut tx = self.db.begin().await?;
                let latest = self.repository.get_order(&mut tx, order.uuid).await?;
                tx.commit().await?;

                info!(order_uuid = %order.uuid, "order payment already settled");

                Ok(match paid_conflict(&latest) {
                    OrdersServiceError::Cancelled => IntentConfirmation::Cancelled(order.uuid),
                    _ => IntentConfirmation::AlreadyPaid(order.uuid),
                })
            }
        }
    }

    #[tracing::instrument(
        name = "orders.service.set_status",
        skip(self, _admin),
        fields(order_uuid = %order, status = %status),
        err
    )]
    async fn set_status(
        &self,
        _admin: AdminCapability,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.get_order_for_update(&mut tx, order).await?;

        if status == OrderStatus::Cancelled {
            if self.release_stock(&mut tx, &current).await? {
                info!("released reserved stock");
            }
        } else if current.stock_released_at.is_some()
            && self.reclaim_stock(&mut tx, &current).await?
        {
            info!("reserved stock for reopened order");
        }

        let updated = self.repository.set_status(&mut tx, order, status).await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Check out the user's cart, reserving stock for every line.
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<Checkout, OrdersServiceError>;

    /// Retrieve an order visible to the principal.
    async fn get_order(
        &self,
        principal: Principal,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_my_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Every order, newest first.
    async fn list_all_orders(
        &self,
        admin: AdminCapability,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Record payment for an order owned by the principal (or any order, for admins).
    async fn mark_paid(
        &self,
        principal: Principal,
        order: OrderUuid,
        payment_intent_id: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Apply a gateway-reported successful intent.
    async fn confirm_intent(
        &self,
        intent: PaymentIntent,
    ) -> Result<IntentConfirmation, OrdersServiceError>;

    /// Set the fulfilment status.
    async fn set_status(
        &self,
        admin: AdminCapability,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
