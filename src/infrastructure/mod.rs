pub mod lambda;
pub mod storage;
