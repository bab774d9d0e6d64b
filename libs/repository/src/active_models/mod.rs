pub(crate) mod news;
pub(crate) mod user;

pub(crate) mod prelude {
    pub use super::news::Entity as News;
    pub use super::user::Entity as User;
}
