pub mod data;
pub mod logging;
pub mod text;
pub mod validation;
