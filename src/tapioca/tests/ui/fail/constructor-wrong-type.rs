use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[inject]
    pub fn new() -> String {
        String::new()
    }
}

fn main() {
    let _ = Test;
}
