pub mod access;
pub mod descriptor;
pub mod names;
