//! Entity service
//!
//! [`EntityService`] binds a [`Transport`] to one domain and project and
//! wires the pure building blocks of `alm-entity` (parser, paginator, batch
//! resolver, reference URLs) to real requests.

use crate::transport::{headers, Transport};
use alm_entity::{
    fields, parse_collection, parse_projects, reference_url, AlmConfig, AlmError, AlmResult,
    BatchResolver, Entity, EntityCollection, EntityKind, Paginator, ProjectContext, QuerySpec,
    TransportError, TypeRegistry,
};
use std::sync::Arc;

/// REST paths, relative to the base URL
pub mod paths {
    //! Endpoint paths

    /// Credentials endpoint
    pub const AUTHENTICATE: &str = "authentication-point/alm-authenticate";
    /// Session endpoint, answers 201 when a session is opened
    pub const SITE_SESSION: &str = "rest/site-session";

    /// Entity collection of a project
    #[must_use]
    pub fn collection(domain: &str, project: &str, collection: &str) -> String {
        format!("rest/domains/{domain}/projects/{project}/{collection}")
    }

    /// Projects of a domain
    #[must_use]
    pub fn projects(domain: &str) -> String {
        format!("rest/domains/{domain}/projects")
    }

    /// Attachments of a run
    #[must_use]
    pub fn run_attachments(run_id: &str) -> String {
        format!("run/{run_id}/attachments/")
    }
}

const JSON_HEADERS: [(&str, &str); 1] = [(headers::ACCEPT, headers::APPLICATION_JSON)];

/// Read-only entity access for one project
pub struct EntityService<T: Transport> {
    transport: T,
    registry: Arc<TypeRegistry>,
    context: ProjectContext,
    paginator: Paginator,
    resolver: BatchResolver,
}

impl<T: Transport> EntityService<T> {
    /// Create service with the default registry, page size and batch size
    #[must_use]
    pub fn new(transport: T, context: ProjectContext) -> Self {
        Self {
            transport,
            registry: TypeRegistry::shared_defaults(),
            context,
            paginator: Paginator::default(),
            resolver: BatchResolver::default(),
        }
    }

    /// Create service from configuration
    ///
    /// # Errors
    /// Returns [`AlmError::Config`] if the configuration does not validate.
    pub fn from_config(transport: T, config: &AlmConfig) -> AlmResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            registry: TypeRegistry::shared_defaults(),
            context: config.project_context(),
            paginator: config.paginator()?,
            resolver: config.batch_resolver()?,
        })
    }

    /// With a custom type registry
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// With a paginator
    #[must_use]
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// With a batch resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: BatchResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Underlying transport
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Type registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Bound domain and project
    #[inline]
    #[must_use]
    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Fetch one page of a collection
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses, malformed bodies and unregistered
    /// types are returned unchanged.
    pub fn entities(&self, collection: &str, query: &QuerySpec) -> AlmResult<EntityCollection> {
        let path = paths::collection(self.context.domain(), self.context.project(), collection);
        tracing::debug!(%path, query = %query, "fetching page");

        let response = self
            .transport
            .get(&path, &query.to_params(), &JSON_HEADERS)?
            .error_for_status(&path)?;
        parse_collection(response.body(), &self.registry)
    }

    /// Server-reported number of entities matching the query's conditions
    ///
    /// Only the conditions of `query` are used; one entity with only its id
    /// is requested.
    ///
    /// # Errors
    /// As [`Self::entities`].
    pub fn total_count(&self, collection: &str, query: &QuerySpec) -> AlmResult<u64> {
        let count_query = QuerySpec::new()
            .with_field(fields::ID)
            .with_page_size(1)
            .with_conditions(query.conditions().iter().cloned());
        Ok(self.entities(collection, &count_query)?.total())
    }

    /// Fetch every entity matching the query, page by page
    ///
    /// # Errors
    /// The first failing page aborts the walk.
    pub fn all_entities(&self, collection: &str, query: &QuerySpec) -> AlmResult<Vec<Entity>> {
        let entities = self
            .paginator
            .fetch_all(query, |page| self.entities(collection, page))?;
        tracing::info!(collection, count = entities.len(), "collection fetched");
        Ok(entities)
    }

    /// Fetch every entity of a kind
    ///
    /// # Errors
    /// As [`Self::all_entities`].
    pub fn all_of_kind(&self, kind: EntityKind, query: &QuerySpec) -> AlmResult<Vec<Entity>> {
        self.all_entities(kind.collection_name(), query)
    }

    /// Fetch entities by id, in batches
    ///
    /// # Errors
    /// The first failing batch aborts the lookup.
    pub fn entities_by_ids<I, S>(&self, collection: &str, ids: I, fields: &[String]) -> AlmResult<Vec<Entity>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entities = self
            .resolver
            .fetch_by_ids(ids, fields, |batch| self.entities(collection, batch))?;
        tracing::info!(collection, count = entities.len(), "entities resolved by id");
        Ok(entities)
    }

    /// Deep link for an entity, based on the transport's base URL
    ///
    /// # Errors
    /// Returns [`AlmError::UnregisteredType`] if the entity's type is unknown.
    pub fn reference_url(&self, entity: &Entity) -> AlmResult<String> {
        reference_url(entity, &self.registry, &self.context, self.transport.base_url())
    }

    /// Names of the projects of the bound domain the user may open
    ///
    /// # Errors
    /// A failure status carrying an error document becomes
    /// [`AlmError::RemoteApplication`]; malformed listings are
    /// [`AlmError::MalformedResponse`].
    pub fn allowed_projects(&self) -> AlmResult<Vec<String>> {
        let path = paths::projects(self.context.domain());
        let response = self
            .transport
            .get(&path, &[], &JSON_HEADERS)?
            .error_for_status(&path)
            .map_err(AlmError::from_remote)?;
        parse_projects(response.body())
    }

    /// Raw attachment bytes of a run
    ///
    /// # Errors
    /// Any status other than 200 is returned as [`AlmError::Transport`].
    pub fn run_attachments(&self, run_id: &str) -> AlmResult<Vec<u8>> {
        let path = paths::run_attachments(run_id);
        let response = self
            .transport
            .get(&path, &[], &[(headers::ACCEPT, headers::OCTET_STREAM)])?;

        if response.status() != 200 {
            return Err(TransportError::status(&path, response.status(), response.text()).into());
        }
        Ok(response.into_body())
    }

    /// Open a session
    ///
    /// Any existing session is dropped first. Returns `Ok(true)` only when
    /// the credentials are accepted and the session endpoint answers 201.
    ///
    /// # Errors
    /// A non-2xx answer from either endpoint is returned as
    /// [`AlmError::RemoteApplication`] when it carries an error document,
    /// otherwise as [`AlmError::Transport`].
    pub fn login(&self, user: &str, password: Option<&str>) -> AlmResult<bool> {
        self.transport.clear_session()?;

        let document = auth_document(user, password.unwrap_or_default());
        let xml_headers = [
            (headers::CONTENT_TYPE, headers::APPLICATION_XML),
            (headers::ACCEPT, headers::APPLICATION_XML),
        ];
        let auth = self
            .transport
            .post(paths::AUTHENTICATE, Some(document), &xml_headers)?
            .error_for_status(paths::AUTHENTICATE)
            .map_err(AlmError::from_remote)?;

        if auth.status() != 200 {
            tracing::warn!(user, status = auth.status(), "credentials not accepted");
            return Ok(false);
        }

        let session = self
            .transport
            .post(paths::SITE_SESSION, None, &[])?
            .error_for_status(paths::SITE_SESSION)
            .map_err(AlmError::from_remote)?;
        let opened = session.status() == 201;
        if opened {
            tracing::info!(user, "session opened");
        } else {
            tracing::warn!(user, status = session.status(), "session not opened");
        }
        Ok(opened)
    }
}

fn auth_document(user: &str, password: &str) -> String {
    format!(
        "<alm-authentication><user>{}</user><password>{}</password></alm-authentication>",
        escape_xml(user),
        escape_xml(password)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
