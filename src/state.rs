use crate::{db::OrmConn, notify::NotificationDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub notifier: NotificationDispatcher,
}
