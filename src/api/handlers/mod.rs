pub mod health;
pub mod invitation;
pub mod member;
pub mod project;
pub mod resource;
pub mod role;
pub mod user;
