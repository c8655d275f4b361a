pub mod analytics;
pub mod attempt;
pub mod college;
pub mod study_material;
pub mod user;
