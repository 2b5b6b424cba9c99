pub mod espn;
pub mod schema;
