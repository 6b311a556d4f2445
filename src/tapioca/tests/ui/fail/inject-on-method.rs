use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[inject]
    pub fn new(&self) -> Self {
        Self
    }
}

fn main() {
    let _ = Test;
}
