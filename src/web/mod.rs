//! Web dashboard layer for browser-based UI.
//!
//! Provides the landing page, the filterable publication dashboard and the
//! add/detail/delete pages. Uses Askama templates for server-side rendering;
//! `static/dashboard.js` refreshes the grid in place on filter changes and
//! change notifications.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering handlers
//! - [`views`] - View models shared by templates
//! - [`routes`] - Dashboard route configuration

pub mod handlers;
pub mod routes;
pub mod views;
