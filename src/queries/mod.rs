pub mod feeds;
pub mod mail;
pub mod seen;
