pub mod health;
pub mod projects;
pub mod templates;
pub mod workspaces;
