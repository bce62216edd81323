pub mod assign;
pub mod assignment;
pub mod error;
pub mod randomize;
pub mod settings;
pub mod spoiler_log;
pub mod traverse;
pub mod validate;
