use alm_client::{headers, paths, EntityService};
use alm_entity::{
    AlmConfig, AlmError, BatchResolver, EntityDescriptor, EntityKind, Paginator, QuerySpec,
    TransportError, TypeRegistry,
};
use alm_test_utils::{
    entity_json, error_document, id_page, page_body, test_context, FakeTransport, Method,
};
use pretty_assertions::assert_eq;
use std::num::{NonZeroU64, NonZeroUsize};
use std::sync::Arc;

fn service(transport: &FakeTransport) -> EntityService<&FakeTransport> {
    EntityService::new(transport, test_context())
}

#[test]
fn entities_requests_project_collection_as_json() {
    let transport = FakeTransport::default().respond(
        200,
        page_body(
            1,
            vec![entity_json("test", &[("id", Some("3")), ("name", Some("login")), ("owner", None)])],
        ),
    );

    let page = service(&transport)
        .entities("tests", &QuerySpec::new().with_fields(["id", "name", "owner"]))
        .unwrap();

    assert_eq!(page.total(), 1);
    let test = &page.entities()[0];
    assert_eq!(test.kind(), EntityKind::Test);
    assert_eq!(test.name(), Some("login"));
    assert!(test.is_null("owner"));

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "rest/domains/DEFAULT/projects/demo/tests");
    assert_eq!(request.param("fields"), Some("id,name,owner"));
    assert_eq!(request.header(headers::ACCEPT), Some(headers::APPLICATION_JSON));
}

#[test]
fn entities_surfaces_failure_status() {
    let transport = FakeTransport::default().respond(500, "boom");
    let err = service(&transport).entities("runs", &QuerySpec::new()).unwrap_err();

    assert!(matches!(
        err,
        AlmError::Transport(TransportError::Status { status: 500, ref body, .. }) if body == "boom"
    ));
}

#[test]
fn total_count_keeps_only_conditions() {
    let transport = FakeTransport::default().respond(200, id_page(4321, "run", [1]));
    let query = QuerySpec::new()
        .with_fields(["name", "status"])
        .with_page_size(500)
        .with_condition("status", "'Passed'");

    let total = service(&transport).total_count("runs", &query).unwrap();

    assert_eq!(total, 4321);
    let request = &transport.requests()[0];
    assert_eq!(request.param("fields"), Some("id"));
    assert_eq!(request.param("page-size"), Some("1"));
    assert_eq!(request.param("start-index"), None);
    assert_eq!(request.param("query"), Some("{status['Passed']}"));
}

#[test]
fn all_entities_walks_planned_pages() {
    let transport = FakeTransport::default()
        .respond(200, id_page(5, "run", [1, 2]))
        .respond(200, id_page(5, "run", [3, 4]))
        .respond(200, id_page(5, "run", [5]));
    let service = service(&transport).with_paginator(Paginator::new(NonZeroU64::new(2).unwrap()));

    let runs = service.all_of_kind(EntityKind::Run, &QuerySpec::new()).unwrap();

    let ids: Vec<_> = runs.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

    let starts: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| r.param("start-index").map(ToString::to_string))
        .collect();
    assert_eq!(starts, vec![Some("1".into()), Some("3".into()), Some("5".into())]);
}

#[test]
fn all_entities_ignores_total_changing_mid_walk() {
    let transport = FakeTransport::default()
        .respond(200, id_page(3, "run", [1, 2]))
        .respond(200, id_page(40, "run", [3]));
    let service = service(&transport).with_paginator(Paginator::new(NonZeroU64::new(2).unwrap()));

    let runs = service.all_entities("runs", &QuerySpec::new()).unwrap();

    assert_eq!(runs.len(), 3);
    assert_eq!(transport.pending(), 0);
    assert_eq!(transport.request_count(), 2);
}

#[test]
fn all_entities_with_empty_result_makes_one_request() {
    let transport = FakeTransport::default().respond(200, page_body(0, vec![]));

    let runs = service(&transport).all_entities("runs", &QuerySpec::new()).unwrap();

    assert!(runs.is_empty());
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn entities_by_ids_batches_and_pins_page_size() {
    let transport = FakeTransport::default()
        .respond(200, id_page(2, "test-set", [7, 8]))
        .respond(200, id_page(1, "test-set", [9]));
    let service = service(&transport).with_resolver(BatchResolver::new(NonZeroUsize::new(2).unwrap()));

    let sets = service
        .entities_by_ids("test-sets", ["7", "8", "9"], &["name".to_string()])
        .unwrap();

    assert_eq!(sets.len(), 3);
    let requests = transport.requests();
    assert_eq!(requests[0].param("query"), Some("{id[7 OR 8]}"));
    assert_eq!(requests[0].param("page-size"), Some("2"));
    assert_eq!(requests[1].param("query"), Some("{id[9]}"));
    assert_eq!(requests[1].param("page-size"), Some("1"));
}

#[test]
fn entities_by_ids_treats_ids_as_a_set() {
    let transport = FakeTransport::default().respond(200, id_page(1, "test", [1]));
    let service = service(&transport).with_resolver(BatchResolver::new(NonZeroUsize::new(2).unwrap()));

    let tests = service.entities_by_ids("tests", ["1", "1", "1"], &[]).unwrap();

    assert_eq!(tests.len(), 1);
    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0].param("query"), Some("{id[1]}"));
}

#[test]
fn entities_by_ids_rejects_non_numeric_ids() {
    let transport = FakeTransport::default();
    let err = service(&transport)
        .entities_by_ids("tests", ["4", "4] OR id[5"], &[])
        .unwrap_err();

    assert!(matches!(err, AlmError::InvalidId(_)));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn entities_by_ids_with_no_ids_makes_no_request() {
    let transport = FakeTransport::default();
    let found = service(&transport)
        .entities_by_ids("tests", Vec::<String>::new(), &[])
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn reference_url_uses_transport_base_url() {
    let transport = FakeTransport::new("https://alm.example.com/qcbin/")
        .respond(200, id_page(1, "release-cycle", [12]));
    let service = service(&transport);

    let cycles = service.all_of_kind(EntityKind::Sprint, &QuerySpec::new()).unwrap();

    assert_eq!(
        service.reference_url(&cycles[0]).unwrap(),
        "tds://demo.DEFAULT.alm.example.com/qcbin/[AnyModule]?EntityType=ICycle&EntityID=12"
    );
}

#[test]
fn custom_registry_accepts_extra_types() {
    let mut registry = TypeRegistry::with_defaults();
    registry
        .register(
            "manual-run",
            EntityDescriptor::new(
                EntityKind::Run,
                "{scheme}://{project}.{domain}.{host}/[TestRuns]?EntityType=IRun&EntityID={id}",
            ),
        )
        .unwrap();
    let transport = FakeTransport::default().respond(200, id_page(1, "manual-run", [4]));
    let service = service(&transport).with_registry(Arc::new(registry));

    let runs = service.all_entities("runs", &QuerySpec::new()).unwrap();

    assert_eq!(runs[0].type_name(), "manual-run");
    assert_eq!(
        service.reference_url(&runs[0]).unwrap(),
        "td://demo.DEFAULT.alm.test:8080/qcbin/[TestRuns]?EntityType=IRun&EntityID=4"
    );
}

#[test]
fn allowed_projects_parses_both_shapes() {
    let transport = FakeTransport::default()
        .respond(200, r#"{"Project": [{"Name": "demo"}, {"Name": "legacy"}]}"#)
        .respond(200, r#"{"Projects": {"Project": {"Name": "solo"}}}"#);
    let service = service(&transport);

    assert_eq!(service.allowed_projects().unwrap(), vec!["demo", "legacy"]);
    assert_eq!(service.allowed_projects().unwrap(), vec!["solo"]);
    assert_eq!(transport.requests()[0].path, "rest/domains/DEFAULT/projects");
}

#[test]
fn allowed_projects_reports_remote_title() {
    let transport = FakeTransport::default().respond(403, error_document("Forbidden domain"));
    let err = service(&transport).allowed_projects().unwrap_err();

    assert!(matches!(
        err,
        AlmError::RemoteApplication { status: 403, ref title } if title == "Forbidden domain"
    ));
}

#[test]
fn allowed_projects_keeps_plain_failures() {
    let transport = FakeTransport::default().respond(502, "<html>bad gateway</html>");
    let err = service(&transport).allowed_projects().unwrap_err();

    assert!(matches!(err, AlmError::Transport(TransportError::Status { status: 502, .. })));
}

#[test]
fn run_attachments_returns_raw_bytes() {
    let transport = FakeTransport::default().respond(200, vec![0x50, 0x4b, 0x03, 0x04]);

    let bytes = service(&transport).run_attachments("77").unwrap();

    assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    let request = &transport.requests()[0];
    assert_eq!(request.path, "run/77/attachments/");
    assert_eq!(request.header(headers::ACCEPT), Some(headers::OCTET_STREAM));
}

#[test]
fn run_attachments_requires_exactly_ok() {
    let transport = FakeTransport::default().respond(204, "");
    let err = service(&transport).run_attachments("77").unwrap_err();

    assert!(matches!(err, AlmError::Transport(TransportError::Status { status: 204, .. })));
}

#[test]
fn login_opens_session() {
    let transport = FakeTransport::default().respond(200, "").respond(201, "");

    assert!(service(&transport).login("sa", Some("p&w")).unwrap());

    assert_eq!(transport.session_clears(), 1);
    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, paths::AUTHENTICATE);
    assert_eq!(
        requests[0].body.as_deref(),
        Some("<alm-authentication><user>sa</user><password>p&amp;w</password></alm-authentication>")
    );
    assert_eq!(requests[0].header(headers::CONTENT_TYPE), Some(headers::APPLICATION_XML));
    assert_eq!(requests[1].path, paths::SITE_SESSION);
    assert_eq!(requests[1].body, None);
}

#[test]
fn login_without_password_sends_empty_one() {
    let transport = FakeTransport::default().respond(200, "").respond(201, "");

    assert!(service(&transport).login("sa", None).unwrap());
    let body = transport.requests()[0].body.clone().unwrap();
    assert!(body.contains("<password></password>"));
}

#[test]
fn login_fails_when_session_not_created() {
    let transport = FakeTransport::default().respond(200, "").respond(200, "");
    assert!(!service(&transport).login("sa", Some("pw")).unwrap());
}

#[test]
fn login_surfaces_session_failure_status() {
    let transport = FakeTransport::default().respond(200, "").respond(500, "server exploded");
    let err = service(&transport).login("sa", Some("pw")).unwrap_err();

    assert!(matches!(
        err,
        AlmError::Transport(TransportError::Status { status: 500, ref path, ref body })
            if path == paths::SITE_SESSION && body == "server exploded"
    ));
}

#[test]
fn login_reports_session_error_document() {
    let transport = FakeTransport::default()
        .respond(200, "")
        .respond(503, error_document("Site is in maintenance"));
    let err = service(&transport).login("sa", Some("pw")).unwrap_err();

    assert!(matches!(
        err,
        AlmError::RemoteApplication { status: 503, ref title } if title == "Site is in maintenance"
    ));
}

#[test]
fn login_skips_session_when_credentials_not_ok() {
    let transport = FakeTransport::default().respond(202, "");

    assert!(!service(&transport).login("sa", Some("pw")).unwrap());
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn login_rejected_with_error_document() {
    let transport = FakeTransport::default().respond(401, error_document("Authentication failed"));
    let err = service(&transport).login("sa", Some("bad")).unwrap_err();

    assert!(matches!(err, AlmError::RemoteApplication { status: 401, .. }));
    assert_eq!(transport.request_count(), 1);
}

#[test]
fn from_config_binds_sizes_and_project() {
    let config = AlmConfig::new()
        .with_base_url("http://alm.test:8080/qcbin")
        .with_project("QA", "payments")
        .with_page_size(10)
        .with_batch_size(5);
    let transport = FakeTransport::default().respond(200, id_page(0, "test", []));

    let service = EntityService::from_config(&transport, &config).unwrap();
    service.all_entities("tests", &QuerySpec::new()).unwrap();

    assert_eq!(service.context().domain(), "QA");
    let request = &transport.requests()[0];
    assert_eq!(request.path, "rest/domains/QA/projects/payments/tests");
    assert_eq!(request.param("page-size"), Some("10"));
}

#[test]
fn from_config_rejects_invalid_config() {
    let transport = FakeTransport::default();
    let result = EntityService::from_config(&transport, &AlmConfig::new());
    assert!(matches!(result, Err(AlmError::Config(_))));
}

#[test]
fn missing_scripted_response_is_connection_error() {
    let transport = FakeTransport::default();
    let err = service(&transport).entities("tests", &QuerySpec::new()).unwrap_err();
    assert!(matches!(err, AlmError::Transport(TransportError::Connection { .. })));
}
