//! In-process [`StoreBackend`] fake used by the cart, address and checkout
//! tests. Behaves like the remote store where the state machines depend on
//! it: cart adds merge by product server-side, addresses get sequential ids,
//! and any operation can be scripted to fail.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use rust_decimal::Decimal;
use serde_json::{Value, json};

use kirana_core::{AddressId, CartItemId, ProductId};

use crate::api::ApiError;
use crate::api::types::{
    Address, AddressInput, PaymentCompletion, PaymentSession, Product, ProductRef, RemoteCart,
    RemoteCartLine,
};
use crate::store::StoreBackend;

/// Parse a decimal literal; for test fixtures only.
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

/// A catalog product with the given id, name and price.
pub fn product(id: i64, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        price: dec(price),
        images: Value::Array(vec![]),
        brand: String::new(),
        stock: 100,
        description: String::new(),
    }
}

fn fake_error(op: &str) -> ApiError {
    ApiError::Api {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: format!("fake failure: {op}"),
    }
}

#[derive(Default)]
struct FakeState {
    // product id -> (cart item id, quantity)
    cart: BTreeMap<i64, (i64, i64)>,
    products: BTreeMap<i64, Product>,
    addresses: Vec<Address>,
    last_add_delta: Option<i64>,
    last_order_addresses: Option<(AddressId, AddressId)>,
}

/// Scripted in-memory store.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
    next_cart_item_id: AtomicI64,
    next_address_id: AtomicI64,

    fail_get_cart: AtomicBool,
    fail_add: AtomicBool,
    fail_remove: AtomicBool,
    fail_create_address: AtomicBool,
    fail_create_order: AtomicBool,
    fail_payment_session: AtomicBool,
    fail_verify: AtomicBool,

    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    order_creates: AtomicUsize,
    verify_calls: AtomicUsize,

    cod_response: Mutex<Option<Value>>,
    verify_response: Mutex<Option<Value>>,
}

impl FakeStore {
    pub fn stock_product(&self, product: Product) {
        let mut state = self.state.lock().unwrap();
        state.products.insert(product.id.as_i64(), product);
    }

    /// Put a line directly into the remote cart, as if added earlier.
    pub fn seed_cart_line(&self, product_id: i64, quantity: i64) {
        let item_id = self.next_cart_item_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().unwrap();
        state.cart.insert(product_id, (item_id, quantity));
    }

    pub fn fail_get_cart(&self, fail: bool) {
        self.fail_get_cart.store(fail, Ordering::SeqCst);
    }

    pub fn fail_add_to_cart(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    pub fn fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create_address(&self, fail: bool) {
        self.fail_create_address.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create_order(&self, fail: bool) {
        self.fail_create_order.store(fail, Ordering::SeqCst);
    }

    pub fn fail_payment_session(&self, fail: bool) {
        self.fail_payment_session.store(fail, Ordering::SeqCst);
    }

    pub fn fail_verify(&self, fail: bool) {
        self.fail_verify.store(fail, Ordering::SeqCst);
    }

    /// Override the body returned by order creation (default `{"id": 9001}`).
    pub fn set_cod_response(&self, body: Value) {
        *self.cod_response.lock().unwrap() = Some(body);
    }

    /// Override the body returned by verification (default `{"order_id": "ord_42"}`).
    pub fn set_verify_response(&self, body: Value) {
        *self.verify_response.lock().unwrap() = Some(body);
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn order_creates(&self) -> usize {
        self.order_creates.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn last_add_delta(&self) -> Option<i64> {
        self.state.lock().unwrap().last_add_delta
    }

    /// The `(billing, shipping)` pair sent with the most recent order create.
    pub fn last_order_addresses(&self) -> Option<(AddressId, AddressId)> {
        self.state.lock().unwrap().last_order_addresses
    }

    pub fn cart_quantity(&self, product_id: i64) -> i64 {
        self.state
            .lock()
            .unwrap()
            .cart
            .get(&product_id)
            .map_or(0, |(_, q)| *q)
    }

    pub fn saved_addresses(&self) -> Vec<Address> {
        self.state.lock().unwrap().addresses.clone()
    }
}

impl StoreBackend for FakeStore {
    async fn get_cart(&self) -> Result<RemoteCart, ApiError> {
        if self.fail_get_cart.load(Ordering::SeqCst) {
            return Err(fake_error("get_cart"));
        }
        let state = self.state.lock().unwrap();
        let items = state
            .cart
            .iter()
            .map(|(product_id, (item_id, quantity))| RemoteCartLine {
                id: CartItemId::new(*item_id),
                product: ProductRef {
                    id: ProductId::new(*product_id),
                },
                quantity: *quantity,
            })
            .collect();
        Ok(RemoteCart { items })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let state = self.state.lock().unwrap();
        state
            .products
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| fake_error("get_product"))
    }

    async fn add_to_cart(&self, product: ProductId, quantity: i64) -> Result<(), ApiError> {
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(fake_error("add_to_cart"));
        }
        self.add_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        state.last_add_delta = Some(quantity);
        // Merge by product like the real store does.
        if let Some((_, existing)) = state.cart.get_mut(&product.as_i64()) {
            *existing += quantity;
            if *existing <= 0 {
                state.cart.remove(&product.as_i64());
            }
        } else if quantity > 0 {
            let item_id = self.next_cart_item_id.fetch_add(1, Ordering::SeqCst) + 1;
            state.cart.insert(product.as_i64(), (item_id, quantity));
        }
        Ok(())
    }

    async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(fake_error("remove_cart_item"));
        }
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.cart.retain(|_, (item_id, _)| *item_id != item.as_i64());
        Ok(())
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        Ok(self.state.lock().unwrap().addresses.clone())
    }

    async fn create_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        if self.fail_create_address.load(Ordering::SeqCst) {
            return Err(fake_error("create_address"));
        }
        let id = self.next_address_id.fetch_add(1, Ordering::SeqCst) + 1;
        let address = Address {
            id: AddressId::new(id),
            full_name: input.full_name.clone(),
            phone_number: input.phone_number.clone(),
            company_name: input.company_name.clone(),
            gst_number: input.gst_number.clone(),
            street_address: input.street_address.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            postal_code: input.postal_code.clone(),
            country: input.country.clone(),
            address_type: input.address_type,
            is_default: input.is_default,
        };
        self.state.lock().unwrap().addresses.push(address.clone());
        Ok(address)
    }

    async fn update_address(
        &self,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        let mut state = self.state.lock().unwrap();
        let address = state
            .addresses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| fake_error("update_address"))?;
        address.full_name = input.full_name.clone();
        address.phone_number = input.phone_number.clone();
        address.company_name = input.company_name.clone();
        address.gst_number = input.gst_number.clone();
        address.street_address = input.street_address.clone();
        address.city = input.city.clone();
        address.state = input.state.clone();
        address.postal_code = input.postal_code.clone();
        address.country = input.country.clone();
        address.address_type = input.address_type;
        address.is_default = input.is_default;
        Ok(address.clone())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.addresses.retain(|a| a.id != id);
        Ok(())
    }

    async fn create_cod_order(
        &self,
        billing: AddressId,
        shipping: AddressId,
    ) -> Result<Value, ApiError> {
        if self.fail_create_order.load(Ordering::SeqCst) {
            return Err(fake_error("create_cod_order"));
        }
        self.order_creates.fetch_add(1, Ordering::SeqCst);
        // Placing an order drains the remote cart.
        let mut state = self.state.lock().unwrap();
        state.last_order_addresses = Some((billing, shipping));
        state.cart.clear();
        drop(state);
        let body = self.cod_response.lock().unwrap().clone();
        Ok(body.unwrap_or_else(|| json!({"id": 9001})))
    }

    async fn create_payment_session(&self) -> Result<PaymentSession, ApiError> {
        if self.fail_payment_session.load(Ordering::SeqCst) {
            return Err(fake_error("create_payment_session"));
        }
        Ok(PaymentSession {
            key: "rzp_test_key".to_owned(),
            amount: 24_950,
            currency: "INR".to_owned(),
            razorpay_order_id: "order_rzp_1".to_owned(),
        })
    }

    async fn verify_payment(
        &self,
        _completion: &PaymentCompletion,
        _billing: AddressId,
        _shipping: AddressId,
    ) -> Result<Value, ApiError> {
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(fake_error("verify_payment"));
        }
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().cart.clear();
        let body = self.verify_response.lock().unwrap().clone();
        Ok(body.unwrap_or_else(|| json!({"order_id": "ord_42"})))
    }
}
