use tapioca::prelude::*;

pub struct Test;

#[injectable]
impl Default for Test {
    fn default() -> Self {
        Self
    }
}

fn main() {
    let _ = Test;
}
