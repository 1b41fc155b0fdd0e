pub mod error_panel;
pub mod export_buttons;
pub mod header;
pub mod progress_bar;
pub mod result_list;
pub mod summary;
pub mod upload_area;
