pub mod admin;
pub mod arc;
pub mod article;
pub mod campaign;
pub mod character;
pub mod dashboard;
pub mod document;
pub mod hashtag;
pub mod invitation;
pub mod link;
pub mod me;
pub mod member;
pub mod public;
pub mod quest;
pub mod search;
pub mod session;
pub mod world;
pub mod world_link;
