#[derive(reqbind::Params)]
pub struct TodoPath<T> {
    #[param("id")]
    pub id: T,
}

#[derive(reqbind::RequestShape)]
pub struct Borrowed<'a> {
    pub title: &'a str,
}

fn main() {}
