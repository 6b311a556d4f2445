use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[callable]
    pub fn run(&mut self) {}
}

fn main() {
    let _ = Test;
}
