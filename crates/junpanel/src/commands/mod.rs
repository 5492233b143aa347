pub mod action;
pub mod check;
pub mod ps;
pub mod serve;
pub mod status;
