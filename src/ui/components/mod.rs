pub mod header;
pub mod menu;
pub mod module_view;
pub mod progress_bar;
