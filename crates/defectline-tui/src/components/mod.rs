pub mod report_table;
pub mod submit_form;
