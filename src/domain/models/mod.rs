pub mod connection;
pub mod directory;
pub mod environment;
pub mod file;
pub mod file_type;
pub mod invitation;
pub mod membership;
pub mod notification;
pub mod project;
pub mod role;
pub mod user;
