use super::*;
use crate::catalog::{default_catalog, DEFAULT_PLAN_ID, DEFAULT_SERVICE_ID};
use crate::store::PasswordGenerator;
use broker_api::Parameters;
use serde_json::json;
use std::thread;

const HOST: &str = "broker.test";

fn create_test_ledger() -> (ProvisioningLedger, Arc<StoreRegistry>) {
    let registry = Arc::new(StoreRegistry::with_passwords(PasswordGenerator::seeded(1)));
    let ledger = ProvisioningLedger::new(Arc::new(default_catalog()), registry.clone());
    (ledger, registry)
}

fn request(params: Parameters) -> ProvisionRequest {
    ProvisionRequest::new(DEFAULT_SERVICE_ID, DEFAULT_PLAN_ID).with_parameters(params)
}

fn validation(result: Result<ProvisionOutcome>) -> String {
    match result {
        Err(BrokerError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_provision_creates_instance_and_store() {
    let (ledger, registry) = create_test_ledger();

    let outcome = ledger.provision("i1", request(Parameters::new()), HOST).unwrap();

    assert_eq!(outcome, ProvisionOutcome::Created);
    let summary = ledger.instance("i1").unwrap();
    assert!(registry.get_store(&summary.store_id).is_ok());
    assert_eq!(summary.request.service_id, DEFAULT_SERVICE_ID);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_provision_validation_order() {
    let (ledger, registry) = create_test_ledger();

    assert_eq!(
        validation(ledger.provision("", ProvisionRequest::default(), HOST)),
        "Missing InstanceID"
    );
    assert_eq!(
        validation(ledger.provision("i1", ProvisionRequest::new("", ""), HOST)),
        "Missing service_id"
    );
    assert_eq!(
        validation(ledger.provision("i1", ProvisionRequest::new("svc", ""), HOST)),
        "Missing plan_id"
    );
    assert_eq!(
        validation(ledger.provision("i1", ProvisionRequest::new("svc", "plan"), HOST)),
        "Can't find service/plan svc/plan"
    );
    // A plan id that exists, but not under this service.
    assert!(matches!(
        ledger.provision("i1", ProvisionRequest::new("other", DEFAULT_PLAN_ID), HOST),
        Err(BrokerError::Validation(_))
    ));

    assert!(ledger.is_empty());
    assert!(registry.is_empty());
}

#[test]
fn test_identical_provision_is_idempotent() {
    let (ledger, registry) = create_test_ledger();
    let params = Parameters::new().with("size", 3);

    let first = ledger.provision("i1", request(params.clone()), HOST).unwrap();
    let second = ledger.provision("i1", request(params), HOST).unwrap();

    assert_eq!(first, ProvisionOutcome::Created);
    assert_eq!(second, ProvisionOutcome::AlreadyProvisioned);
    assert_eq!(ledger.len(), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_differing_provision_conflicts() {
    let (ledger, registry) = create_test_ledger();

    ledger
        .provision("i1", request(Parameters::new().with("size", 3)), HOST)
        .unwrap();
    let before = ledger.instance("i1").unwrap();

    let err = ledger
        .provision("i1", request(Parameters::new().with("size", 4)), HOST)
        .unwrap_err();

    assert!(matches!(err, BrokerError::Conflict(_)));
    assert_eq!(ledger.instance("i1").unwrap(), before);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_deprovision_requires_ids() {
    let (ledger, _) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();

    assert_eq!(
        ledger.deprovision("i1", None, Some(DEFAULT_PLAN_ID)),
        Err(BrokerError::Validation("Missing ServiceID".into()))
    );
    assert_eq!(
        ledger.deprovision("i1", Some(DEFAULT_SERVICE_ID), Some("")),
        Err(BrokerError::Validation("Missing PlanID".into()))
    );
    assert!(ledger.instance("i1").is_some());
}

#[test]
fn test_deprovision_unknown_instance_is_gone() {
    let (ledger, _) = create_test_ledger();

    assert!(matches!(
        ledger.deprovision("nope", Some("s"), Some("p")),
        Err(BrokerError::Gone(_))
    ));
}

#[test]
fn test_deprovision_cascades() {
    let (ledger, registry) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();
    ledger.bind("i1", "b1").unwrap();
    let store_id = ledger.instance("i1").unwrap().store_id;
    registry.set_value(&store_id, "k", b"v".to_vec()).unwrap();

    ledger
        .deprovision("i1", Some(DEFAULT_SERVICE_ID), Some(DEFAULT_PLAN_ID))
        .unwrap();

    assert!(matches!(registry.get_store(&store_id), Err(BrokerError::NotFound(_))));
    assert!(matches!(ledger.bind("i1", "b1"), Err(BrokerError::Gone(_))));
    assert!(matches!(
        ledger.unbind("i1", "b1", Some("s"), Some("p")),
        Err(BrokerError::Gone(_))
    ));
    assert!(ledger.is_empty());
}

#[test]
fn test_deprovision_survives_store_deleted_directly() {
    let (ledger, registry) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();
    let store_id = ledger.instance("i1").unwrap().store_id;
    registry.delete_store(&store_id).unwrap();

    assert!(ledger.deprovision("i1", Some("s"), Some("p")).is_ok());
    assert!(ledger.is_empty());
}

#[test]
fn test_bind_issues_store_credentials() {
    let (ledger, registry) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();
    let store = registry
        .get_store(&ledger.instance("i1").unwrap().store_id)
        .unwrap();

    let outcome = ledger.bind("i1", "b1").unwrap();

    match outcome {
        BindOutcome::Created(creds) => {
            assert_eq!(creds, store.credentials());
            assert!(!creds.user.is_empty());
            assert!(!creds.password.is_empty());
            assert!(creds.url.starts_with("http://broker.test/db/"));
        }
        other => panic!("expected a new binding, got {:?}", other),
    }
}

#[test]
fn test_repeat_bind_is_a_no_op() {
    let (ledger, _) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();

    assert!(matches!(ledger.bind("i1", "b1"), Ok(BindOutcome::Created(_))));
    assert_eq!(ledger.bind("i1", "b1"), Ok(BindOutcome::AlreadyBound));
    assert_eq!(ledger.instance("i1").unwrap().binding_ids, vec!["b1".to_string()]);
}

#[test]
fn test_bind_validation_and_gone() {
    let (ledger, _) = create_test_ledger();

    assert_eq!(
        ledger.bind("", "b1"),
        Err(BrokerError::Validation("Missing InstanceID".into()))
    );
    assert_eq!(
        ledger.bind("i1", ""),
        Err(BrokerError::Validation("Missing BindingID".into()))
    );
    assert!(matches!(ledger.bind("i1", "b1"), Err(BrokerError::Gone(_))));
}

#[test]
fn test_unbind_lifecycle() {
    let (ledger, _) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();
    ledger.bind("i1", "b1").unwrap();

    assert_eq!(
        ledger.unbind("i1", "b1", None, Some("p")),
        Err(BrokerError::Validation("Missing ServiceID".into()))
    );
    assert!(ledger.unbind("i1", "b1", Some("s"), Some("p")).is_ok());
    assert_eq!(
        ledger.unbind("i1", "b1", Some("s"), Some("p")),
        Err(BrokerError::Gone("Can't find binding with id: b1".into()))
    );
    // Unbinding frees the id for a fresh bind.
    assert!(matches!(ledger.bind("i1", "b1"), Ok(BindOutcome::Created(_))));
}

#[test]
fn test_full_lifecycle() {
    let (ledger, registry) = create_test_ledger();

    assert_eq!(
        ledger.provision("i1", request(Parameters::new()), HOST),
        Ok(ProvisionOutcome::Created)
    );
    assert!(matches!(ledger.bind("i1", "b1"), Ok(BindOutcome::Created(_))));
    assert_eq!(ledger.unbind("i1", "b1", Some("s"), Some("p")), Ok(()));
    assert!(matches!(
        ledger.unbind("i1", "b1", Some("s"), Some("p")),
        Err(BrokerError::Gone(_))
    ));
    assert_eq!(
        ledger.deprovision("i1", Some(DEFAULT_SERVICE_ID), Some(DEFAULT_PLAN_ID)),
        Ok(())
    );

    // No memory of the old instance: different parameters are a fresh create.
    assert_eq!(
        ledger.provision("i1", request(Parameters::new().with("x", json!(true))), HOST),
        Ok(ProvisionOutcome::Created)
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_concurrent_provisions_of_one_id() {
    let (ledger, registry) = create_test_ledger();
    let ledger = Arc::new(ledger);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.provision("i1", request(Parameters::new()), HOST))
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let created = outcomes
        .iter()
        .filter(|o| **o == Ok(ProvisionOutcome::Created))
        .count();
    assert_eq!(created, 1);
    assert!(outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_deprovision_spares_store_recreated_under_same_id() {
    let (ledger, registry) = create_test_ledger();
    ledger.provision("i1", request(Parameters::new()), HOST).unwrap();
    let store_id = ledger.instance("i1").unwrap().store_id;

    registry.delete_store(&store_id).unwrap();
    let replacement = registry.create_store(Some(&store_id), HOST).unwrap();

    ledger
        .deprovision("i1", Some(DEFAULT_SERVICE_ID), Some(DEFAULT_PLAN_ID))
        .unwrap();

    assert!(Arc::ptr_eq(&registry.get_store(&store_id).unwrap(), &replacement));
    assert!(ledger.is_empty());
}
