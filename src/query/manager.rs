//! Query manager.
//!
//! Holds the resolved attribute directory and known-values table, fetches
//! issues from an [`IssueSource`] and hands out resolvers and change
//! iterators over them.

use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::config::QuerySettings;
use crate::error::Result;
use crate::model::{FieldDescriptor, Issue, ResolvedValue};
use crate::source::IssueSource;

use super::changes::{ChangeHistoryReconstructor, IssueChanges};
use super::directory::AttributeDirectory;
use super::resolver::{FieldValueResolver, KnownValues};

/// Issue queries against one source.
///
/// Log events are emitted inside the manager's span, `query_manager` by
/// default; pass another with [`QueryManager::with_span`] to attach the
/// manager's logs to a caller's context.
#[derive(Debug)]
pub struct QueryManager<S: IssueSource> {
    source: S,
    directory: AttributeDirectory,
    known_values: KnownValues,
    max_results: Option<usize>,
    span: Span,
}

impl<S: IssueSource> QueryManager<S> {
    /// Fetch the field directory from `source` and build a manager.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the directory cannot be fetched, or
    /// [`crate::Error::UnknownField`] if a configured attribute names a field
    /// the tracker does not have.
    pub async fn connect(source: S, settings: QuerySettings) -> Result<Self> {
        let span = info_span!("query_manager", source = source.name());
        let fields = source.fields().instrument(span.clone()).await?;
        span.in_scope(|| debug!(count = fields.len(), "Fetched field directory"));

        Self::new(source, fields, settings).map(|manager| manager.with_span(span))
    }

    /// Build a manager from an already fetched field directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if a configured attribute names
    /// a field missing from `fields`.
    pub fn new(source: S, fields: Vec<FieldDescriptor>, settings: QuerySettings) -> Result<Self> {
        let directory = AttributeDirectory::new(fields, &settings.attributes)?;

        let span = info_span!("query_manager", source = source.name());
        span.in_scope(|| {
            for attribute in settings.known_values.keys() {
                if directory.field_for_attribute(attribute).is_none() {
                    warn!(attribute = %attribute, "Known values given for an unconfigured attribute");
                }
            }
            debug!(
                attributes = settings.attributes.len(),
                max_results = ?settings.max_results,
                "Query manager ready"
            );
        });

        Ok(Self {
            source,
            directory,
            known_values: settings.known_values,
            max_results: settings.max_results,
            span,
        })
    }

    /// Replace the span log events are emitted in.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn directory(&self) -> &AttributeDirectory {
        &self.directory
    }

    #[must_use]
    pub const fn known_values(&self) -> &KnownValues {
        &self.known_values
    }

    #[must_use]
    pub const fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Field id for a field display name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if no field has that name.
    pub fn field_name_to_id(&self, name: &str) -> Result<&str> {
        self.directory.resolve(name)
    }

    /// Resolver bound to this manager's directory and known values.
    #[must_use]
    pub const fn resolver(&self) -> FieldValueResolver<'_> {
        FieldValueResolver::new(&self.directory, &self.known_values)
    }

    /// Current value of a field on `issue`.
    #[must_use]
    pub fn resolve_field_value(&self, issue: &Issue, field_id: &str) -> Option<ResolvedValue> {
        self.resolver().resolve(issue, field_id)
    }

    /// Current value of a configured attribute on `issue`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownAttribute`] if the attribute is not
    /// configured.
    pub fn resolve_attribute_value(&self, issue: &Issue, attribute: &str) -> Result<Option<ResolvedValue>> {
        self.resolver().resolve_attribute(issue, attribute)
    }

    /// Snapshot sequence of `issue` for the tracked `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownField`] if a tracked field is unknown.
    pub fn iter_changes<'a, F: AsRef<str>>(
        &'a self,
        issue: &'a Issue,
        fields: &[F],
    ) -> Result<IssueChanges<'a>> {
        ChangeHistoryReconstructor::new(&self.directory, &self.known_values).reconstruct(issue, fields)
    }

    /// Issues matching `query`, capped at the configured `max_results`.
    ///
    /// # Errors
    ///
    /// Returns the source's error.
    pub async fn find_issues(&self, query: &str) -> Result<Vec<Issue>> {
        self.span.in_scope(|| match self.max_results {
            Some(cap) => info!(query, max_results = cap, "Fetching issues"),
            None => info!(query, "Fetching issues"),
        });

        let issues = self
            .source
            .search_issues(query, self.max_results)
            .instrument(self.span.clone())
            .await?;

        self.span
            .in_scope(|| info!(count = issues.len(), "Fetched issues"));
        Ok(issues)
    }
}
