use std::convert::Infallible;

use tapioca::prelude::*;

pub struct Test1;

#[injectable]
impl Test1 {
    #[inject]
    pub fn new() -> Self {
        todo!()
    }
}

pub struct Test2;

#[injectable]
impl Test2 {
    #[inject]
    pub fn new() -> Test2 {
        todo!()
    }
}

pub struct Test3;

#[injectable]
impl Test3 {
    #[inject]
    pub fn new() -> Result<Self, Infallible> {
        todo!()
    }
}

pub struct Test4;

#[injectable]
impl Test4 {
    #[inject]
    pub fn new() -> Result<Test4, Infallible> {
        todo!()
    }
}

pub struct Test5;

#[injectable]
impl Test5 {
    #[inject]
    pub fn new() -> std::result::Result<Test5, Infallible> {
        todo!()
    }
}

fn main() {}
