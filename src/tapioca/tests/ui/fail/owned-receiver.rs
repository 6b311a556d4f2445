use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[callable]
    pub fn consume(self) {}
}

fn main() {
    let _ = Test;
}
