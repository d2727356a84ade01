//! OpenAPI API Title:
//!     Village Store
//!
//! OpenAPI API Version:
//!     2.1.0
//!
//! OpenAPI API Description:
//!     Buy and sell villages.
//!
//! OpenAPI Base Path:
//!     /api

pub mod audit;
pub mod handlers;
pub mod models;

pub mod legacy {
    /// OpenAPI Path:
    ///     /old
    ///
    /// OpenAPI Method:
    ///     GET
    ///
    /// OpenAPI Responses:
    ///     200  Ghost  Never documented properly
    pub fn old() {}
}
