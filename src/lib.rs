pub mod entity;
pub mod error;
pub mod prelude;
pub mod server;
pub mod state;
pub mod sv;
pub mod utils;
