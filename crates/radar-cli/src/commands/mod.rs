pub mod check;
pub mod scan;
pub mod serve;
