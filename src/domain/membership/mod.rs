//! Membership domain module.
//!
//! # Module Structure
//!
//! - `status` - MembershipStatus as reported by the backend
//! - `record` - Membership record for one profile
//! - `cta` - Call-to-action state derived from the membership

mod cta;
pub(crate) mod record;
mod status;

pub use cta::{CtaIntent, CtaState};
pub use record::Membership;
pub use status::MembershipStatus;
