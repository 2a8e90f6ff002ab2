pub(crate) mod admin;
pub(crate) mod chat;
pub(crate) mod serve;
pub(crate) mod tools;
