pub mod export_use_case;
pub mod load_use_case;
pub mod ports;
