#[derive(reqbind::Reply)]
#[reply(json, text)]
pub struct Greeting {
    pub name: String,
}

fn main() {}
