//! Session helpers keeping handlers free of Actix session details.
//!
//! The signed cookie carries the authenticated user id, written by the
//! external login service, plus any pending flash notices.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const NOTICES_KEY: &str = "notices";

/// Newtype exposing the session operations handlers need.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user's id.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current user id, if the cookie carries a valid one.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<i64>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw.map(UserId::new) {
            Some(Ok(id)) => Ok(Some(id)),
            Some(Err(error)) => {
                tracing::warn!("invalid user id in session cookie: {error}");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or fail with `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Queue a flash notice for the next page view.
    pub fn push_notice(&self, notice: impl Into<String>) -> Result<(), Error> {
        let mut notices = self.pending_notices()?;
        notices.push(notice.into());
        self.0
            .insert(NOTICES_KEY, notices)
            .map_err(|error| Error::internal(format!("failed to persist notice: {error}")))
    }

    /// Return and clear queued notices.
    pub fn take_notices(&self) -> Result<Vec<String>, Error> {
        let notices = self.pending_notices()?;
        self.0.remove(NOTICES_KEY);
        Ok(notices)
    }

    fn pending_notices(&self) -> Result<Vec<String>, Error> {
        self.0
            .get::<Vec<String>>(NOTICES_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|error| Error::internal(format!("failed to read notices: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
