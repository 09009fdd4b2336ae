//! Markers API
//!
//! One endpoint, dispatched by method:
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /markers | GET | `?tag[]=<slug>&user_id=<id>` listing or `?user_id=<id>&search=<text>` search |
//! | /markers | POST | form `user_id, name, tag, new_tag, lat, lng` creates a marker |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/markers", get(handler::list).post(handler::create))
}
