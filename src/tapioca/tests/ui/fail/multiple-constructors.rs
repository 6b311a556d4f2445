use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[inject]
    pub fn first() -> Self {
        Self
    }

    #[inject]
    pub fn second() -> Self {
        Self
    }
}

fn main() {
    let _ = Test;
}
