//! Checkout return indicators carried on the page URL.
//!
//! The external payment surface sends the user back to the profile page
//! with `membership=success|canceled` or `content_purchase=success|canceled`,
//! plus `session_id` (and `video_id` for content) on success. Indicators are
//! consumed once and stripped.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::VideoId;

pub const MEMBERSHIP_PARAM: &str = "membership";
pub const CONTENT_PURCHASE_PARAM: &str = "content_purchase";
pub const SESSION_ID_PARAM: &str = "session_id";
pub const VIDEO_ID_PARAM: &str = "video_id";

/// Query parameters removed from the URL after a return is handled.
pub const INDICATOR_PARAMS: [&str; 4] = [
    MEMBERSHIP_PARAM,
    CONTENT_PURCHASE_PARAM,
    SESSION_ID_PARAM,
    VIDEO_ID_PARAM,
];

/// What was being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutKind {
    Membership,
    ContentPurchase,
}

/// What the return URL claims happened. Never trusted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReturnOutcome {
    /// Payment reportedly succeeded; must be echoed by the backend.
    Success { session_id: String },
    /// The user backed out of checkout.
    Canceled,
    /// Success indicator without a session id to verify.
    Unverifiable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReturn {
    pub kind: CheckoutKind,
    pub outcome: ReturnOutcome,
    pub video_id: Option<VideoId>,
}

impl CheckoutReturn {
    /// Reads the return indicators from `url`.
    ///
    /// Membership indicators win when both are present. Unknown indicator
    /// values are ignored.
    pub fn parse(url: &Url) -> Option<Self> {
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        let (kind, status) = match (param(MEMBERSHIP_PARAM), param(CONTENT_PURCHASE_PARAM)) {
            (Some(s), _) if is_known_status(&s) => (CheckoutKind::Membership, s),
            (_, Some(s)) if is_known_status(&s) => (CheckoutKind::ContentPurchase, s),
            _ => return None,
        };

        let outcome = if status == "canceled" {
            ReturnOutcome::Canceled
        } else {
            match param(SESSION_ID_PARAM) {
                Some(session_id) => ReturnOutcome::Success { session_id },
                None => ReturnOutcome::Unverifiable,
            }
        };

        let video_id = param(VIDEO_ID_PARAM).and_then(|v| VideoId::new(v).ok());

        Some(Self {
            kind,
            outcome,
            video_id,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.outcome {
            ReturnOutcome::Success { session_id } => Some(session_id),
            _ => None,
        }
    }
}

fn is_known_status(value: &str) -> bool {
    matches!(value, "success" | "canceled")
}

/// `url` with the indicator parameters removed; other parameters and the
/// fragment are preserved.
pub fn strip_indicators(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !INDICATOR_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// True when `url` still carries any indicator.
pub fn has_indicators(url: &Url) -> bool {
    url.query_pairs()
        .any(|(k, _)| INDICATOR_PARAMS.contains(&k.as_ref()))
}
