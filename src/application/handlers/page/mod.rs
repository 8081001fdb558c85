//! Profile page query handlers.

mod load_profile_page;

pub use load_profile_page::{LoadProfilePageHandler, LoadProfilePageQuery, LoadProfilePageResult, PageError};
