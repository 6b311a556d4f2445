use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[inject]
    pub fn new(#[default(None)] other: std::sync::Arc<Test>) -> Self {
        Self
    }
}

fn main() {
    let _ = Test;
}
