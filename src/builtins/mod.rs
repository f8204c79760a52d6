pub mod bg;
pub mod cd;
pub mod echo;
pub mod fg;
pub mod jobs_cmd;
pub mod kill_cmd;
pub mod registry;
pub mod system;
