pub mod analytics;
pub mod auth;
pub mod colleges;
pub mod study_materials;
pub mod test_attempts;
pub mod tests;
pub mod users;
