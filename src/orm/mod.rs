pub mod companies;
pub mod posts;
pub mod reports;
pub mod users;
pub mod votes;
