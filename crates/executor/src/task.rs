use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

/// A type-erased task, for mixing differently-typed closures in one list
pub type BoxTask<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send + 'static>;

/// Erase the type of a task closure.
///
/// # Example
///
/// ```
/// use fanout_executor::{boxed, BoxTask};
///
/// let tasks: Vec<BoxTask<u32, String>> = vec![
///     boxed(|| async { Ok(1) }),
///     boxed(|| async { Err("unavailable".to_string()) }),
/// ];
/// assert_eq!(tasks.len(), 2);
/// ```
pub fn boxed<F, Fut, T, E>(task: F) -> BoxTask<T, E>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::new(move || task().boxed())
}
