//! OpenAPI Tag:
//!     Villages
//!     Buying and selling villages.

use crate::models;
use crate::models::{Village as Listing, VillageForm};

/// OpenAPI Summary:
///     List villages
///
/// OpenAPI Path:
///     /villages
///
/// OpenAPI Method:
///     GET
///
/// OpenAPI Tags:
///     Villages
///
/// OpenAPI Query String Parameters:
///     status  models::Status  optional  Only villages with this status
///     limit   u32             optional  Page size
///
/// OpenAPI Responses:
///     200  Vec<models::Village>  The villages
pub fn list_villages() {}

/// OpenAPI Summary:
///     Show one village
///
/// OpenAPI Path:
///     /villages/:id
///
/// OpenAPI Method:
///     GET
///
/// OpenAPI Tags:
///     Villages
///
/// OpenAPI Responses:
///     200  Listing  The village
///     404  ()       No such village
pub fn show_village() {}

/// OpenAPI Summary:
///     Put a village up for sale
///
/// OpenAPI Path:
///     /villages
///
/// OpenAPI Method:
///     POST
///
/// OpenAPI Content Type:
///     json, xml
///
/// OpenAPI Request Body:
///     VillageForm
///
/// OpenAPI Responses:
///     201  models::Village  Created
pub fn create_village(form: VillageForm) -> Listing {
    unimplemented!("{}", form.display_name)
}

/// Take a village off the market
///
/// @Router /villages/:id [delete]
/// @Param reason query String false "Why it was withdrawn"
/// @Success 204 {object} () "Withdrawn"
pub fn withdraw_village() {}
