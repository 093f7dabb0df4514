//! Test doubles for the identity and authority collaborators

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::authority::{PermissionAuthority, PermissionFuture, PermissionQuery, PermissionSet};
use crate::core::AuthorityError;
use crate::identity::IdentityProvider;

/// Identity with settable values and read counters
#[derive(Default)]
pub(crate) struct MockIdentity {
    session_id: Mutex<Option<String>>,
    user_id: Mutex<Option<String>>,
    sub_context: Mutex<Option<String>>,
    session_reads: AtomicUsize,
    user_reads: AtomicUsize,
    sub_context_reads: AtomicUsize,
}

impl MockIdentity {
    pub(crate) fn new(session_id: Option<&str>, user_id: Option<&str>) -> Self {
        let identity = Self::default();
        identity.set_session_id(session_id);
        identity.set_user_id(user_id);
        identity
    }

    /// Authenticated caller with session "s1" and user "cis.user.TEST"
    pub(crate) fn authenticated() -> Self {
        Self::new(Some("s1"), Some("cis.user.TEST"))
    }

    pub(crate) fn anonymous() -> Self {
        Self::new(None, None)
    }

    pub(crate) fn with_sub_context(self, sub_context: &str) -> Self {
        *self.sub_context.lock().unwrap() = Some(sub_context.to_string());
        self
    }

    pub(crate) fn set_session_id(&self, session_id: Option<&str>) {
        *self.session_id.lock().unwrap() = session_id.map(str::to_string);
    }

    pub(crate) fn set_user_id(&self, user_id: Option<&str>) {
        *self.user_id.lock().unwrap() = user_id.map(str::to_string);
    }

    pub(crate) fn session_reads(&self) -> usize {
        self.session_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn user_reads(&self) -> usize {
        self.user_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn sub_context_reads(&self) -> usize {
        self.sub_context_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn authenticated_session_id(&self) -> Option<String> {
        self.session_reads.fetch_add(1, Ordering::SeqCst);
        self.session_id.lock().unwrap().clone()
    }

    async fn authenticated_user_id(&self) -> Option<String> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        self.user_id.lock().unwrap().clone()
    }

    async fn current_sub_context(&self) -> Option<String> {
        self.sub_context_reads.fetch_add(1, Ordering::SeqCst);
        self.sub_context.lock().unwrap().clone()
    }
}

/// Scripted outcome of a remote lookup
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Grant(Vec<&'static str>),
    Fail(AuthorityError),
    Panic,
    Hang,
}

/// Authority returning a scripted reply and recording every query
pub(crate) struct MockAuthority {
    reply: Mutex<Reply>,
    queries: Mutex<Vec<PermissionQuery>>,
}

impl MockAuthority {
    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn granting(permissions: &[&'static str]) -> Self {
        Self::new(Reply::Grant(permissions.to_vec()))
    }

    pub(crate) fn failing(err: AuthorityError) -> Self {
        Self::new(Reply::Fail(err))
    }

    pub(crate) fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub(crate) fn queries(&self) -> Vec<PermissionQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl PermissionAuthority for MockAuthority {
    fn is_authorized(&self, query: PermissionQuery) -> PermissionFuture<'_> {
        let reply = self.reply.lock().unwrap().clone();
        let context = query.sub_context.clone();
        self.queries.lock().unwrap().push(query);

        Box::pin(async move {
            match reply {
                Reply::Grant(names) => Ok(PermissionSet::granted(
                    context,
                    names.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
                )),
                Reply::Fail(err) => Err(err),
                Reply::Panic => panic!("authority exploded"),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(PermissionSet::default())
                }
            }
        })
    }
}
