//! Result reporting: console text, JSON report, CSV series

pub mod csv;
pub mod json;
pub mod text;
