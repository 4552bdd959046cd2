//! Checkout commands.
//!
//! Only the cash-on-delivery path is exposed here: the gateway path needs a
//! shell that can host the provider's payment widget, which a terminal
//! cannot. The flow still goes through the full address resolution and
//! order-confirmation machinery.

use kirana_core::AddressId;
use kirana_client::addresses::AddressBook;
use kirana_client::cart::CartState;
use kirana_client::checkout::{
    AddressSelection, CheckoutFlow, GatewayError, OrderDraft, PaymentGateway, PaymentMethod,
};
use kirana_client::api::types::{PaymentCompletion, PaymentSession};

use super::{CommandError, Context};

/// Gateway stand-in for shells that cannot host the payment widget.
struct NoWidget;

impl PaymentGateway for NoWidget {
    async fn collect(&self, _session: &PaymentSession) -> Result<PaymentCompletion, GatewayError> {
        Err(GatewayError(
            "the terminal cannot host the payment widget".to_owned(),
        ))
    }
}

/// Place a cash-on-delivery order with saved addresses.
pub async fn cash_on_delivery(billing: i64, shipping: Option<i64>) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;

    let cart = CartState::new(ctx.client.clone(), ctx.notifier.clone());
    cart.refresh().await;

    let addresses = AddressBook::new(ctx.client.clone());
    addresses.refresh().await?;

    let draft = OrderDraft {
        billing: AddressSelection::Saved(AddressId::new(billing)),
        shipping: shipping.map(|id| AddressSelection::Saved(AddressId::new(id))),
        payment_method: PaymentMethod::CashOnDelivery,
    };

    let flow = CheckoutFlow::new(ctx.client.clone(), ctx.session.clone());
    let confirmation = flow.place_order(&cart, &addresses, &draft, &NoWidget).await?;
    ctx.flush_toast();

    match confirmation.order_id {
        Some(id) => println!("Order placed: {id}"),
        None => println!("Order placed"),
    }
    Ok(())
}
