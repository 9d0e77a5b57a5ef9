//! HTML template rendering handlers for the web dashboard.

mod dashboard;
mod error;
mod landing;
mod publications;

pub use dashboard::{dashboard_handler, grid_handler};
pub use error::{ErrorTemplate, error_page};
pub use landing::landing_handler;
pub use publications::{
    create_publication_handler, delete_publication_handler, new_publication_handler,
    publication_detail_handler,
};
