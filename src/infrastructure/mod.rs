// Infrastructure layer module
// Database adapters implementing the domain repository ports

pub mod db;
pub mod repositories;
pub mod retry;
