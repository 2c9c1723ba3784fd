pub mod json_store;
pub mod sample_data;
