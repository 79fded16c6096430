pub mod action;
pub mod conversation;
pub mod search;
pub mod vehicle;
