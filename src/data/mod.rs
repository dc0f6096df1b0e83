pub mod axis_format;
pub mod field;
pub mod format;
pub mod point;
