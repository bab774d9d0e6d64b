pub mod news;
pub mod user;

pub mod prelude {
    pub use crate::news::News as NewsEntity;
    pub use crate::user::User as UserEntity;
}
