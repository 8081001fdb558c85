//! Checkout domain module - return indicators and the login redirect.

mod login_redirect;
mod return_url;

pub use login_redirect::login_redirect;
pub use return_url::{
    has_indicators, strip_indicators, CheckoutKind, CheckoutReturn, ReturnOutcome,
    INDICATOR_PARAMS,
};
