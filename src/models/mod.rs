mod endorsement;
mod links;
mod project;
mod session;
mod user;

pub use endorsement::{Endorser, ReceivedEndorsement, SkillKind};
pub use links::UserLinks;
pub use project::{Author, Project};
pub use session::Session;
pub use user::{ROLE_ADMIN, ROLE_MEMBER, User};
