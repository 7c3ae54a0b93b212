pub mod cleanup;
pub mod exec;
pub mod io;
pub mod paths;
