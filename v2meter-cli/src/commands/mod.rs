pub mod doctor;
pub mod query;
pub mod render;
pub mod run;
