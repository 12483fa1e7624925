//! Run Controller
pub mod controller;

pub use self::controller::RunController;
