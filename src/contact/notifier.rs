use std::convert::Infallible;
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use super::model::ContactParams;

pub type BoxedSendFuture<'a, E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send + 'a>>;

/// Delivers a contact message, e.g. through an email API.
pub trait Notifier: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, params: &'a ContactParams) -> Self::Fut<'a>;
}

/// Accepts every message without sending it anywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    type Error = Infallible;
    type Fut<'a> = Ready<Result<(), Infallible>>;

    fn send<'a>(&'a self, params: &'a ContactParams) -> Self::Fut<'a> {
        tracing::debug!(
            subject = %params.subject,
            "no notifier configured, contact message dropped"
        );
        ready(Ok(()))
    }
}
