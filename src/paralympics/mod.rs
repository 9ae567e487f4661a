// Paralympics app - regions (NOC codes) and Games editions
//
// - region: Region records + persistence
// - event:  Games editions shown on the pages
// - schema: JSON validation / serialization for the region API
// - pages:  server-rendered HTML
// - routes: axum router (server feature)

pub mod event;
pub mod pages;
pub mod region;
pub mod schema;

#[cfg(feature = "server")]
pub mod routes;

pub use event::{get_event, get_events, insert_event, insert_events, load_events_csv, Event};
pub use region::{
    delete_region, get_all_regions, get_region, insert_region, insert_regions, load_regions_csv,
    update_region, Region,
};
pub use schema::{FieldError, RegionPatch, RegionSchema, SchemaError};
