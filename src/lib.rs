rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod dataset;
pub mod event;
pub mod i18n;
pub mod session;
pub mod store;
pub mod ui;
