use crate::db::{DbPool, OrmConn};
use crate::events::EventHub;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub events: EventHub,
}
