use std::future::Future;
use std::pin::Pin;

use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Application logic invoked once per connection.
///
/// A handler may read the body from [`Request::body_mut`] and must end the
/// response exactly once, through `end` or `json`.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, req: &'a mut Request, res: &'a mut ResponseWriter) -> HandlerFuture<'a>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut Request, &'a mut ResponseWriter) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(&'a self, req: &'a mut Request, res: &'a mut ResponseWriter) -> HandlerFuture<'a> {
        (self)(req, res)
    }
}

/// Pins a closure to the signature [`Handler`] expects.
///
/// ```ignore
/// let hello = handler_fn(|_req, res| Box::pin(async move {
///     res.end("Hello World")?;
///     anyhow::Ok(())
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut Request, &'a mut ResponseWriter) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    f
}
