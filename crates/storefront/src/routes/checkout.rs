//! Checkout route handlers (the core workflow).
//!
//! A linear, mostly-irreversible flow spread over several views:
//! address selection → invoice review → UPI payment + proof → submission.
//! The state machine lives in the session (`CheckoutState`); every
//! handler loads it, transitions it, and saves it back before responding.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{AddressId, UpiPaymentRequest};

use crate::backend::ProofImage;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, on_backend_error};
use crate::models::checkout::{AddressSnapshot, CheckoutStage, CheckoutState};
use crate::models::{CurrentUser, session_keys};
use crate::services::cart;
use crate::services::checkout::{self, PlaceOrderError, Proof};
use crate::state::AppState;

use super::account::{AddressForm, AddressFormErrors};

// =============================================================================
// Session State
// =============================================================================

async fn load_state(session: &Session) -> Result<CheckoutState, AppError> {
    Ok(session
        .get::<CheckoutState>(session_keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

async fn save_state(session: &Session, state: &CheckoutState) -> Result<(), AppError> {
    session.insert(session_keys::CHECKOUT, state).await?;
    Ok(())
}

async fn clear_state(session: &Session) -> Result<(), AppError> {
    session
        .remove::<CheckoutState>(session_keys::CHECKOUT)
        .await?;
    Ok(())
}

// =============================================================================
// View Types & Templates
// =============================================================================

/// One selectable saved address.
pub struct AddressOption {
    pub id: i64,
    pub label: String,
    pub phone: String,
    pub selected: bool,
}

/// Address selection page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address.html")]
pub struct CheckoutAddressTemplate {
    pub addresses: Vec<AddressOption>,
    pub form: AddressForm,
    pub errors: AddressFormErrors,
    pub error: Option<String>,
}

/// One invoice review line.
pub struct ReviewLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Invoice review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/review.html")]
pub struct CheckoutReviewTemplate {
    pub lines: Vec<ReviewLine>,
    pub total: String,
    pub address_line: String,
    pub pincode: String,
    pub phone: String,
    pub can_proceed: bool,
}

/// UPI payment + proof page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct CheckoutPayTemplate {
    pub upi_link: String,
    pub vpa: String,
    pub payee: String,
    pub amount: String,
    pub error: Option<String>,
    /// An order already exists from a previous attempt; submitting again
    /// resumes the remaining steps instead of re-creating it.
    pub order_pinned: bool,
    /// Proof already went through; the form may be submitted empty.
    pub proof_attached: bool,
}

/// Address selection form.
#[derive(Debug, Deserialize)]
pub struct SelectAddressForm {
    pub address_id: i64,
}

// =============================================================================
// Address Selection
// =============================================================================

/// Checkout entry: pick the delivery address.
///
/// Unreachable with an empty cart - the entry point bounces back to the
/// cart page, which is where the disabled state lives.
#[instrument(skip(state, session, user))]
pub async fn select_address_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let quantities = match cart::quantities(state.backend(), &user).await {
        Ok(quantities) => quantities,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };
    if quantities.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let mut checkout = load_state(&session).await?;
    if checkout.stage == CheckoutStage::Completed {
        checkout = CheckoutState::new();
    }
    save_state(&session, &checkout).await?;

    render_address_page(&state, &session, &user, &checkout, AddressForm::default(), AddressFormErrors::default(), None)
        .await
}

#[allow(clippy::too_many_arguments)]
async fn render_address_page(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    checkout: &CheckoutState,
    form: AddressForm,
    errors: AddressFormErrors,
    error: Option<String>,
) -> Result<Response, AppError> {
    let backend_user = match state.backend().get_user(&user.token).await {
        Ok(user) => user,
        Err(e) => return Err(on_backend_error(session, e).await),
    };

    let selected = checkout.address.as_ref().map(|a| a.id);
    let addresses = backend_user
        .addresses
        .iter()
        .map(|a| AddressOption {
            id: a.id.as_i64(),
            label: format!("{}, {}, {} - {}", a.name, a.city, a.state, a.pincode),
            phone: a.phone.clone(),
            selected: selected == Some(a.id),
        })
        .collect();

    Ok(CheckoutAddressTemplate {
        addresses,
        form,
        errors,
        error,
    }
    .into_response())
}

/// Select an existing address and move to review.
#[instrument(skip(state, session, user))]
pub async fn select_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<SelectAddressForm>,
) -> Result<Response, AppError> {
    let backend_user = match state.backend().get_user(&user.token).await {
        Ok(user) => user,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    let address_id = AddressId::new(form.address_id);
    let Some(address) = backend_user.addresses.iter().find(|a| a.id == address_id) else {
        return Err(AppError::BadRequest("unknown address".to_string()));
    };

    let mut checkout = load_state(&session).await?;
    checkout.select_address(AddressSnapshot {
        id: address.id,
        name: address.name.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        pincode: address.pincode.clone(),
        phone: address.phone.clone(),
    })?;
    save_state(&session, &checkout).await?;

    Ok(Redirect::to("/checkout/review").into_response())
}

/// Create an address inline, select it, and move to review.
#[instrument(skip(state, session, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let checkout = load_state(&session).await?;

    // Field validation happens before any network call.
    let write = match form.validate() {
        Ok(write) => write,
        Err(errors) => {
            return render_address_page(&state, &session, &user, &checkout, form, errors, None)
                .await;
        }
    };

    let created = match state.backend().add_address(&user.token, &write).await {
        Ok(created) => created,
        Err(e) => return Err(on_backend_error(&session, e).await),
    };

    let mut checkout = checkout;
    checkout.select_address(AddressSnapshot {
        id: created.id,
        name: created.name,
        city: created.city,
        state: created.state,
        pincode: created.pincode,
        phone: created.phone,
    })?;
    save_state(&session, &checkout).await?;

    Ok(Redirect::to("/checkout/review").into_response())
}

// =============================================================================
// Invoice Review
// =============================================================================

/// Review the invoice: current catalog prices times cart quantities.
///
/// The displayed lines are pinned into the checkout state; order creation
/// sends exactly these. A cart edited mid-checkout simply re-renders with
/// the smaller total.
#[instrument(skip(state, session, user))]
pub async fn review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let mut checkout = load_state(&session).await?;
    let Some(address) = checkout.address.clone() else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    if checkout.created_order.is_none() {
        let quantities = match cart::quantities(state.backend(), &user).await {
            Ok(quantities) => quantities,
            Err(e) => return Err(on_backend_error(&session, e).await),
        };
        let invoice = match checkout::build_invoice(state.backend(), &user, &quantities).await {
            Ok(invoice) => invoice,
            Err(e) => return Err(on_backend_error(&session, e).await),
        };
        checkout.set_invoice(invoice)?;
        save_state(&session, &checkout).await?;
    }

    let invoice = checkout.invoice.clone().unwrap_or_default();
    let lines = invoice
        .lines
        .iter()
        .map(|line| ReviewLine {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: tiffinbox_core::Rupees::new(line.unit_price).to_string(),
            line_total: line.total().to_string(),
        })
        .collect();

    Ok(CheckoutReviewTemplate {
        lines,
        total: invoice.total().to_string(),
        address_line: address.delivery_line(),
        pincode: address.pincode,
        phone: address.phone,
        can_proceed: checkout.can_proceed(),
    }
    .into_response())
}

/// Move from review to payment.
#[instrument(skip(session))]
pub async fn proceed(session: Session) -> Result<Response, AppError> {
    let mut checkout = load_state(&session).await?;
    checkout.proceed_to_payment()?;
    save_state(&session, &checkout).await?;
    Ok(Redirect::to("/checkout/pay").into_response())
}

// =============================================================================
// Payment & Submission
// =============================================================================

fn pay_template(
    state: &AppState,
    checkout: &CheckoutState,
    error: Option<String>,
) -> CheckoutPayTemplate {
    let total = checkout
        .invoice
        .as_ref()
        .map(crate::models::checkout::Invoice::total)
        .unwrap_or_default();
    let upi = &state.config().upi;
    let request = UpiPaymentRequest::new(upi.vpa.clone(), upi.payee_name.clone(), total);

    CheckoutPayTemplate {
        upi_link: request.deep_link(),
        vpa: upi.vpa.clone(),
        payee: upi.payee_name.clone(),
        amount: total.to_string(),
        error,
        order_pinned: checkout.created_order.is_some(),
        proof_attached: checkout.proof_attached,
    }
}

/// Show the UPI payment request and the proof form.
///
/// Pure rendering: the deep link is built from config and the pinned
/// invoice total; no network call happens on this page.
#[instrument(skip(state, session))]
pub async fn pay_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<Response, AppError> {
    let checkout = load_state(&session).await?;
    match checkout.stage {
        CheckoutStage::AwaitingPaymentProof
        | CheckoutStage::SubmittingOrder
        | CheckoutStage::Failed(_) => {}
        _ => return Ok(Redirect::to("/checkout/review").into_response()),
    }

    let error = match checkout.stage {
        CheckoutStage::Failed(step) => Some(format!(
            "The previous attempt failed while {}. Nothing has been retried automatically - submit again to resume.",
            step.describe()
        )),
        _ => None,
    };

    Ok(pay_template(&state, &checkout, error).into_response())
}

/// Submit the order: create, attach proof, clear cart - in that order,
/// never in parallel, never retrying a step that already succeeded.
#[instrument(skip(state, session, user, multipart))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut checkout = load_state(&session).await?;
    let proof = read_proof(multipart).await?;

    // At least one proof mechanism is required - unless an earlier attempt
    // already attached it.
    if !checkout.proof_attached && proof.is_empty() {
        return Ok(pay_template(
            &state,
            &checkout,
            Some("Provide a transaction reference or a payment screenshot.".to_string()),
        )
        .into_response());
    }

    checkout.begin_submit()?;
    save_state(&session, &checkout).await?;

    match checkout::place_order(state.backend(), &user, &mut checkout, proof).await {
        Ok(order_id) => {
            clear_state(&session).await?;
            tracing::info!(order_id = %order_id, "Checkout complete");
            Ok(Redirect::to(&format!("/orders?placed={order_id}")).into_response())
        }
        Err(PlaceOrderError::Incomplete(what)) => {
            tracing::warn!(what, "Checkout state incomplete at submission");
            clear_state(&session).await?;
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(PlaceOrderError::Step {
            step,
            order_id,
            source,
        }) => {
            // Keep the failed state (with the pinned order id) for retry.
            save_state(&session, &checkout).await?;
            if source.is_auth_failure() {
                return Err(on_backend_error(&session, source).await);
            }
            tracing::error!(
                error = %source,
                step = step.describe(),
                order_id = ?order_id,
                "Checkout step failed"
            );

            let message = match order_id {
                Some(id) => format!(
                    "Order #{id} was created, but {} failed. Submit again to finish up - the order will not be created twice.",
                    step.describe()
                ),
                None => format!("Submission failed while {}. Please retry.", step.describe()),
            };
            Ok(pay_template(&state, &checkout, Some(message)).into_response())
        }
    }
}

/// Pull the proof fields out of the multipart body.
async fn read_proof(mut multipart: Multipart) -> Result<Proof, AppError> {
    let mut proof = Proof::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?
    {
        match field.name() {
            Some("utr") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    proof.utr = Some(text.to_string());
                }
            }
            Some("screenshot") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    proof.screenshot = Some(ProofImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(proof)
}
