pub mod log;
pub mod path_validator;
