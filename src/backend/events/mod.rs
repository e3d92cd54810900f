//! Events Module
//!
//! - **`db`** - event and roster queries
//! - **`handlers`** - the `/api/events` endpoints

pub mod db;

pub mod handlers;

pub use handlers::{
    create_event, delete_event, get_event, list_events, register_for_event,
    unregister_from_event, update_event,
};
