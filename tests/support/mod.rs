#![allow(dead_code)]

pub mod accrual_stub;
pub mod fixtures;
