/// A logical API operation that knows its path relative to the base URL.
///
/// Paths may start with `/` and may carry a query string
/// (`users?page=2`); they must not be absolute URLs.
pub trait Endpoint {
    fn path(&self) -> String;
}

impl Endpoint for str {
    fn path(&self) -> String {
        self.to_string()
    }
}

impl Endpoint for String {
    fn path(&self) -> String {
        self.clone()
    }
}

impl<E: Endpoint + ?Sized> Endpoint for &E {
    fn path(&self) -> String {
        (**self).path()
    }
}
