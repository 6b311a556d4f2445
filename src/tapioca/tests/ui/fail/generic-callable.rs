use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[callable]
    pub fn run<T>() {}
}

fn main() {
    let _ = Test;
}
