pub mod endorsements;
pub mod links;
pub mod projects;
pub mod sessions;
pub mod users;
