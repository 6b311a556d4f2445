use tapioca::prelude::*;

pub struct Test;

#[injectable(scoped)]
impl Test {
    #[inject]
    pub fn new() -> Self {
        Self
    }
}

fn main() {
    let _ = Test;
}
