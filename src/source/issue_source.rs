//! Issue source trait.
//!
//! Defines the interface every tracker backend implements: enumerate the
//! field directory and run a search that returns issues with changelogs.
//! Paging, retries and caching are the source's business.

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::model::{FieldDescriptor, Issue};

/// Trait for issue sources.
///
/// Implemented by the HTTP tracker client and the offline dump reader.
pub trait IssueSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The tracker's field directory.
    fn fields(&self) -> impl Future<Output = Result<Vec<FieldDescriptor>>> + Send;

    /// Issues matching `query`, with changelogs attached.
    ///
    /// `max_results` caps the number of issues returned; `None` means all.
    fn search_issues(
        &self,
        query: &str,
        max_results: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Issue>>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of `IssueSource` for boxing.
pub trait IssueSourceBoxed: Send + Sync {
    fn name(&self) -> &str;
    fn fields_boxed(&self) -> BoxFuture<'_, Result<Vec<FieldDescriptor>>>;
    fn search_issues_boxed(&self, query: &str, max_results: Option<usize>) -> BoxFuture<'_, Result<Vec<Issue>>>;
}

/// Boxed source for runtime selection between backends.
pub struct BoxedSource {
    inner: Box<dyn IssueSourceBoxed>,
}

impl BoxedSource {
    pub fn new<S: IssueSource + 'static>(source: S) -> Self {
        Self {
            inner: Box::new(BoxedSourceWrapper(source)),
        }
    }
}

impl std::fmt::Debug for BoxedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedSource")
            .field("name", &self.inner.name())
            .finish()
    }
}

impl IssueSource for BoxedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        self.inner.fields_boxed().await
    }

    async fn search_issues(&self, query: &str, max_results: Option<usize>) -> Result<Vec<Issue>> {
        self.inner.search_issues_boxed(query, max_results).await
    }
}

/// Wrapper to implement `IssueSourceBoxed` for any `IssueSource`.
struct BoxedSourceWrapper<S: IssueSource + 'static>(S);

impl<S: IssueSource + 'static> IssueSourceBoxed for BoxedSourceWrapper<S> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn fields_boxed(&self) -> BoxFuture<'_, Result<Vec<FieldDescriptor>>> {
        Box::pin(self.0.fields())
    }

    fn search_issues_boxed(&self, query: &str, max_results: Option<usize>) -> BoxFuture<'_, Result<Vec<Issue>>> {
        // Owned copy so the future does not borrow the caller's query.
        let query = query.to_string();
        Box::pin(async move { self.0.search_issues(&query, max_results).await })
    }
}
