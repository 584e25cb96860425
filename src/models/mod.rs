pub mod impact;
pub mod notification;
pub mod package;
pub mod pickup;
pub mod rewards;
pub mod user;
