pub mod geography;
pub mod json_repair;
pub mod validators;
