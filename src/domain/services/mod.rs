pub mod admission;
pub mod invitation_state;
pub mod membership_guard;
pub mod membership_service;
pub mod resources;
pub mod token_issuer;
