pub mod banner;
pub mod chrome;
pub mod form;
pub mod form_widget;
pub mod result_view;
pub mod status_bar;
