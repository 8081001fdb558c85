//! Fanpass - Access entitlements for a creator content storefront
//!
//! This crate decides, per viewer and per content item, whether paid media is
//! unlocked. It resolves memberships, one-off purchases, promotion windows,
//! and loyalty tokens against the storefront backend, prices items, drives
//! external checkout, and reconciles the page after a payment redirect.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
