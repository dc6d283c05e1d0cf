pub mod handle;
pub mod run;
