//! Checkout orchestration.
//!
//! Two paths with deliberately different order-creation timing:
//!
//! - **Cash on delivery** creates the order eagerly in one call.
//! - **Gateway** first asks the server for a payment session, hands it to a
//!   [`PaymentGateway`] to collect a signed completion, and only then asks
//!   the server to verify the signature and create the order. No order
//!   exists until verification succeeds, so an abandoned or tampered
//!   payment leaves nothing behind.
//!
//! Either way, success drains the local cart projection and records the
//! order id (when one can be found in the response) for the confirmation
//! screen. A response with no recognizable id is still a success.

use std::sync::Arc;

use serde_json::Value;

use kirana_core::{AddressId, OrderId};

use crate::api::ApiError;
use crate::api::types::{AddressInput, AddressKind, PaymentCompletion, PaymentSession};
use crate::addresses::AddressBook;
use crate::cart::CartState;
use crate::session::SessionStore;
use crate::store::StoreBackend;

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CashOnDelivery,
    Gateway,
}

/// An address for checkout: either a saved one or one to create first.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressSelection {
    Saved(AddressId),
    New(AddressInput),
}

/// Everything the buyer chose on the checkout screen.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub billing: AddressSelection,
    /// Falls back to the billing address when absent.
    pub shipping: Option<AddressSelection>,
    pub payment_method: PaymentMethod,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Absent when the server's response carried no recognizable id.
    pub order_id: Option<OrderId>,
}

/// The gateway widget failed or the buyer abandoned it.
#[derive(Debug, thiserror::Error)]
#[error("payment gateway: {0}")]
pub struct GatewayError(pub String);

/// Why a checkout did not produce an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("missing required address field: {0}")]
    MissingField(&'static str),
    #[error("failed to save address: {0}")]
    Address(#[source] ApiError),
    #[error("failed to create order: {0}")]
    OrderCreate(#[source] ApiError),
    #[error("failed to start payment: {0}")]
    PaymentSession(#[source] ApiError),
    #[error("payment not completed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("payment verification failed: {0}")]
    Verification(#[source] ApiError),
}

/// Collects a signed payment completion for a server-issued session.
///
/// Implemented by whatever hosts the payment widget; tests script it.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn collect(&self, session: &PaymentSession) -> Result<PaymentCompletion, GatewayError>;
}

/// Drives a draft through address resolution, payment and order creation.
pub struct CheckoutFlow<B> {
    backend: Arc<B>,
    session: Arc<dyn SessionStore>,
}

impl<B: StoreBackend> CheckoutFlow<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, session: Arc<dyn SessionStore>) -> Self {
        Self { backend, session }
    }

    /// Place an order for the current cart.
    ///
    /// On success the cart projection is cleared and the order id (if the
    /// response carried one) is persisted in the session. On any failure the
    /// cart is left untouched.
    #[tracing::instrument(skip_all, fields(method = ?draft.payment_method))]
    pub async fn place_order<G: PaymentGateway>(
        &self,
        cart: &CartState<B>,
        addresses: &AddressBook<B>,
        draft: &OrderDraft,
        gateway: &G,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let billing = self
            .resolve_address(addresses, &draft.billing, AddressKind::Billing)
            .await?;
        let shipping = match &draft.shipping {
            Some(selection) => {
                self.resolve_address(addresses, selection, AddressKind::Shipping)
                    .await?
            }
            None => billing,
        };

        let response = match draft.payment_method {
            PaymentMethod::CashOnDelivery => self
                .backend
                .create_cod_order(billing, shipping)
                .await
                .map_err(CheckoutError::OrderCreate)?,
            PaymentMethod::Gateway => {
                let session = self
                    .backend
                    .create_payment_session()
                    .await
                    .map_err(CheckoutError::PaymentSession)?;
                tracing::debug!(amount = %session.total(), "Payment session issued");
                let completion = gateway.collect(&session).await?;
                self.backend
                    .verify_payment(&completion, billing, shipping)
                    .await
                    .map_err(CheckoutError::Verification)?
            }
        };

        Ok(self.confirm(cart, &response))
    }

    /// Turn a selection into a saved address id, creating the address first
    /// when it is new.
    async fn resolve_address(
        &self,
        addresses: &AddressBook<B>,
        selection: &AddressSelection,
        kind: AddressKind,
    ) -> Result<AddressId, CheckoutError> {
        match selection {
            AddressSelection::Saved(id) => Ok(*id),
            AddressSelection::New(input) => {
                validate_address(input)?;
                let mut input = input.clone();
                input.address_type = kind;
                input.is_default = kind == AddressKind::Billing;
                let created = addresses
                    .create(&input)
                    .await
                    .map_err(CheckoutError::Address)?;
                Ok(created.id)
            }
        }
    }

    fn confirm(&self, cart: &CartState<B>, response: &Value) -> OrderConfirmation {
        let order_id = extract_order_id(response);
        match &order_id {
            Some(id) => self.session.set_last_order_id(id),
            None => {
                tracing::warn!("Order created but response carried no recognizable id");
            }
        }
        cart.clear();
        OrderConfirmation { order_id }
    }
}

fn validate_address(input: &AddressInput) -> Result<(), CheckoutError> {
    let required: [(&'static str, &str); 6] = [
        ("full_name", &input.full_name),
        ("phone_number", &input.phone_number),
        ("street_address", &input.street_address),
        ("city", &input.city),
        ("state", &input.state),
        ("postal_code", &input.postal_code),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(CheckoutError::MissingField(name));
        }
    }
    Ok(())
}

/// Pull an order id out of a loosely-shaped creation/verification response.
///
/// Tries `id`, `order_id`, `data.id`, `data.order_id` in order, accepting
/// a non-empty string or a number at each spot.
fn extract_order_id(response: &Value) -> Option<OrderId> {
    const PATHS: [&[&str]; 4] = [&["id"], &["order_id"], &["data", "id"], &["data", "order_id"]];

    for path in PATHS {
        let mut node = response;
        for key in path {
            match node.get(key) {
                Some(next) => node = next,
                None => {
                    node = &Value::Null;
                    break;
                }
            }
        }
        match node {
            Value::String(s) if !s.is_empty() => return Some(OrderId::new(s.clone())),
            Value::Number(n) => return Some(OrderId::new(n.to_string())),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::notify::Notifier;
    use crate::session::MemorySession;
    use crate::test_support::{FakeStore, product};

    struct ApprovingGateway;

    impl PaymentGateway for ApprovingGateway {
        async fn collect(
            &self,
            session: &PaymentSession,
        ) -> Result<PaymentCompletion, GatewayError> {
            Ok(PaymentCompletion {
                razorpay_order_id: session.razorpay_order_id.clone(),
                razorpay_payment_id: "pay_test_1".to_owned(),
                razorpay_signature: "sig_test_1".to_owned(),
            })
        }
    }

    struct AbandoningGateway;

    impl PaymentGateway for AbandoningGateway {
        async fn collect(
            &self,
            _session: &PaymentSession,
        ) -> Result<PaymentCompletion, GatewayError> {
            Err(GatewayError("dismissed by buyer".to_owned()))
        }
    }

    /// Approves like [`ApprovingGateway`] but counts widget openings.
    #[derive(Default)]
    struct CountingGateway {
        opened: std::sync::atomic::AtomicUsize,
    }

    impl CountingGateway {
        fn opened(&self) -> usize {
            self.opened.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl PaymentGateway for CountingGateway {
        async fn collect(
            &self,
            session: &PaymentSession,
        ) -> Result<PaymentCompletion, GatewayError> {
            self.opened
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            ApprovingGateway.collect(session).await
        }
    }

    fn new_billing() -> AddressSelection {
        AddressSelection::New(AddressInput {
            full_name: "Asha Nair".to_owned(),
            phone_number: "9876543210".to_owned(),
            street_address: "14 MG Road".to_owned(),
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            postal_code: "560001".to_owned(),
            ..AddressInput::default()
        })
    }

    struct Fixture {
        store: Arc<FakeStore>,
        cart: CartState<FakeStore>,
        addresses: AddressBook<FakeStore>,
        session: Arc<MemorySession>,
        flow: CheckoutFlow<FakeStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(FakeStore::default());
        store.stock_product(product(1, "Copper Wire 2mm", "149.50"));
        store.seed_cart_line(1, 2);

        let cart = CartState::new(store.clone(), Notifier::default());
        cart.refresh().await;
        let addresses = AddressBook::new(store.clone());
        let session = Arc::new(MemorySession::default());
        let flow = CheckoutFlow::new(store.clone(), session.clone());
        Fixture {
            store,
            cart,
            addresses,
            session,
            flow,
        }
    }

    fn draft(method: PaymentMethod) -> OrderDraft {
        OrderDraft {
            billing: new_billing(),
            shipping: None,
            payment_method: method,
        }
    }

    #[test]
    fn test_extract_order_id_shapes() {
        let cases = [
            (json!({"id": 42}), Some("42")),
            (json!({"order_id": "ord_7"}), Some("ord_7")),
            (json!({"data": {"id": 9}}), Some("9")),
            (json!({"data": {"order_id": "ord_x"}}), Some("ord_x")),
            (json!({"id": ""}), None),
            (json!({"status": "ok"}), None),
            (json!({}), None),
        ];
        for (body, expected) in cases {
            let got = extract_order_id(&body);
            assert_eq!(got.as_ref().map(OrderId::as_str), expected, "body {body}");
        }
    }

    #[test]
    fn test_extract_order_id_prefers_top_level_id() {
        let body = json!({"id": 1, "order_id": "ord_2", "data": {"id": 3}});
        assert_eq!(extract_order_id(&body).unwrap().as_str(), "1");
    }

    #[tokio::test]
    async fn test_cod_happy_path() {
        let f = fixture().await;

        let confirmation = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::CashOnDelivery), &ApprovingGateway)
            .await
            .unwrap();

        assert_eq!(confirmation.order_id.as_ref().unwrap().as_str(), "9001");
        assert!(f.cart.is_empty());
        assert_eq!(f.session.last_order_id().unwrap().as_str(), "9001");
        assert_eq!(f.store.order_creates(), 1);
        // No gateway involvement on the cash path.
        assert_eq!(f.store.verify_calls(), 0);
        // New billing address was saved and reused for shipping.
        assert_eq!(f.addresses.saved().len(), 1);
        let (billing, shipping) = f.store.last_order_addresses().unwrap();
        assert_eq!(billing, shipping);
    }

    #[tokio::test]
    async fn test_separate_shipping_address_sent_distinct() {
        let f = fixture().await;
        let shipping_input = AddressInput {
            full_name: "Ravi Nair".to_owned(),
            phone_number: "9876500000".to_owned(),
            street_address: "2 Residency Road".to_owned(),
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            postal_code: "560025".to_owned(),
            ..AddressInput::default()
        };
        let draft = OrderDraft {
            billing: new_billing(),
            shipping: Some(AddressSelection::New(shipping_input)),
            payment_method: PaymentMethod::CashOnDelivery,
        };

        f.flow
            .place_order(&f.cart, &f.addresses, &draft, &ApprovingGateway)
            .await
            .unwrap();

        let (billing, shipping) = f.store.last_order_addresses().unwrap();
        assert_ne!(billing, shipping);

        // Both rows landed remotely, tagged by role.
        let saved = f.store.saved_addresses();
        assert_eq!(saved.len(), 2);
        let billing_row = saved.iter().find(|a| a.id == billing).unwrap();
        let shipping_row = saved.iter().find(|a| a.id == shipping).unwrap();
        assert_eq!(billing_row.address_type, AddressKind::Billing);
        assert!(billing_row.is_default);
        assert_eq!(shipping_row.address_type, AddressKind::Shipping);
        assert!(!shipping_row.is_default);
    }

    #[tokio::test]
    async fn test_cod_create_failure_is_fatal_and_keeps_cart() {
        let f = fixture().await;
        f.store.fail_create_order(true);

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::CashOnDelivery), &ApprovingGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrderCreate(_)));
        assert_eq!(f.cart.count(), 2);
        assert_eq!(f.store.order_creates(), 0);
        assert_eq!(f.session.last_order_id(), None);
    }

    #[tokio::test]
    async fn test_payment_session_failure_never_opens_widget() {
        let f = fixture().await;
        f.store.fail_payment_session(true);
        let gateway = CountingGateway::default();

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::Gateway), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::PaymentSession(_)));
        assert_eq!(gateway.opened(), 0);
        assert_eq!(f.store.verify_calls(), 0);
        assert_eq!(f.cart.count(), 2);
    }

    #[tokio::test]
    async fn test_gateway_confirmation_extracts_nested_id() {
        let f = fixture().await;
        f.store
            .set_verify_response(serde_json::json!({"data": {"order_id": "ord_z"}}));

        let confirmation = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::Gateway), &ApprovingGateway)
            .await
            .unwrap();

        assert_eq!(confirmation.order_id.unwrap().as_str(), "ord_z");
        assert_eq!(f.session.last_order_id().unwrap().as_str(), "ord_z");
        assert!(f.cart.is_empty());
    }

    #[tokio::test]
    async fn test_cod_without_id_is_still_success() {
        let f = fixture().await;
        f.store.set_cod_response(json!({"status": "confirmed"}));

        let confirmation = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::CashOnDelivery), &ApprovingGateway)
            .await
            .unwrap();

        assert_eq!(confirmation.order_id, None);
        assert!(f.cart.is_empty());
        assert_eq!(f.session.last_order_id(), None);
    }

    #[tokio::test]
    async fn test_gateway_happy_path() {
        let f = fixture().await;

        let confirmation = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::Gateway), &ApprovingGateway)
            .await
            .unwrap();

        assert_eq!(confirmation.order_id.unwrap().as_str(), "ord_42");
        assert!(f.cart.is_empty());
        assert_eq!(f.store.verify_calls(), 1);
        // The eager COD endpoint was never touched.
        assert_eq!(f.store.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_gateway_abandonment_leaves_cart_intact() {
        let f = fixture().await;

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::Gateway), &AbandoningGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Gateway(_)));
        assert_eq!(f.cart.count(), 2);
        assert_eq!(f.store.verify_calls(), 0);
        assert_eq!(f.session.last_order_id(), None);
    }

    #[tokio::test]
    async fn test_gateway_verification_failure_creates_no_order() {
        let f = fixture().await;
        f.store.fail_verify(true);

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::Gateway), &ApprovingGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Verification(_)));
        assert_eq!(f.cart.count(), 2);
        assert_eq!(f.session.last_order_id(), None);
    }

    #[tokio::test]
    async fn test_address_create_failure_aborts_before_order() {
        let f = fixture().await;
        f.store.fail_create_address(true);

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::CashOnDelivery), &ApprovingGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Address(_)));
        assert_eq!(f.store.order_creates(), 0);
        assert_eq!(f.cart.count(), 2);
    }

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let f = fixture().await;
        let input = AddressInput {
            full_name: "Asha Nair".to_owned(),
            phone_number: "9876543210".to_owned(),
            ..AddressInput::default()
        };
        let draft = OrderDraft {
            billing: AddressSelection::New(input),
            shipping: None,
            payment_method: PaymentMethod::CashOnDelivery,
        };

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft, &ApprovingGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::MissingField(_)));
        assert!(f.addresses.saved().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_fails_fast() {
        let f = fixture().await;
        f.cart.clear();

        let err = f
            .flow
            .place_order(&f.cart, &f.addresses, &draft(PaymentMethod::CashOnDelivery), &ApprovingGateway)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(f.store.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_saved_addresses_skip_creation() {
        let f = fixture().await;
        let billing = f
            .addresses
            .create(&match new_billing() {
                AddressSelection::New(input) => input,
                AddressSelection::Saved(_) => unreachable!(),
            })
            .await
            .unwrap();

        let draft = OrderDraft {
            billing: AddressSelection::Saved(billing.id),
            shipping: Some(AddressSelection::Saved(billing.id)),
            payment_method: PaymentMethod::CashOnDelivery,
        };
        f.flow
            .place_order(&f.cart, &f.addresses, &draft, &ApprovingGateway)
            .await
            .unwrap();

        // Only the one we created up front.
        assert_eq!(f.addresses.saved().len(), 1);
    }
}
