use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Test {
    #[inject]
    pub fn new() -> Result<u32, std::fmt::Error> {
        Ok(0)
    }
}

fn main() {
    let _ = Test;
}
