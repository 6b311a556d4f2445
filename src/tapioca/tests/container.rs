use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::Mutex;
use tapioca::container::Unresolvable;
use tapioca::prelude::*;

pub const STATUS_INIT: &str = "initialized";
pub const STATUS_MODIFIED: &str = "modified";

pub trait TestContract: Send + Sync {
    fn status(&self) -> String;
}

pub trait TestAbstract: Send + Sync {
    fn kind(&self) -> &'static str;
}

pub struct TestDependency {
    status: Mutex<String>,
}

#[injectable(implements(dyn TestContract, dyn TestAbstract))]
impl TestDependency {
    #[inject]
    pub fn new(#[default(String::from(STATUS_INIT))] status: String) -> Self {
        Self {
            status: Mutex::new(status),
        }
    }

    pub fn set_status(&self, status: &str) {
        *self.status.lock() = status.to_owned();
    }
}

impl TestContract for TestDependency {
    fn status(&self) -> String {
        self.status.lock().clone()
    }
}

impl TestAbstract for TestDependency {
    fn kind(&self) -> &'static str {
        "dependency"
    }
}

pub struct TestClass;

#[injectable]
impl TestClass {
    #[inject]
    pub fn new() -> Self {
        Self
    }

    #[callable]
    pub fn one_dependency(&self, dependency: Arc<TestDependency>) -> bool {
        dependency.status() == STATUS_INIT
    }

    #[callable]
    pub fn one_dependency_static(dependency: Arc<TestDependency>) -> bool {
        dependency.status() == STATUS_INIT
    }

    #[callable]
    pub fn modified_dependency(dependency: Arc<TestDependency>) -> bool {
        dependency.status() == STATUS_MODIFIED
    }

    #[callable]
    pub fn contract_status(&self, contract: Arc<dyn TestContract>) -> String {
        contract.status()
    }
}

pub struct TestConsumer {
    contract: Arc<dyn TestContract>,
}

#[injectable]
impl TestConsumer {
    #[inject]
    pub fn new(contract: Arc<dyn TestContract>) -> Self {
        Self { contract }
    }
}

pub struct TestCounter {
    count: Mutex<u32>,
}

pub trait Counter: Send + Sync {
    fn increase(&self) -> u32;
}

#[injectable(singleton, implements(dyn Counter))]
impl TestCounter {
    #[inject]
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
        }
    }
}

impl Counter for TestCounter {
    fn increase(&self) -> u32 {
        let mut count = self.count.lock();
        *count += 1;
        *count
    }
}

fn container() -> Container {
    let mut container = Container::default();
    container.register::<TestDependency>();
    container.register::<TestClass>();
    container
}

fn check_dependency() -> Callable<'static> {
    Callable::function(|dependency: Arc<TestDependency>, Arg(param): Arg<String>| {
        Ok::<_, Infallible>(dependency.status() == STATUS_INIT && param == "second parameter")
    })
}

#[test]
fn bind_to_interface_succeeds() {
    let mut container = container();

    container.bind::<dyn TestContract, TestDependency>().unwrap();
    assert!(container.is_bound::<dyn TestContract>());

    container.unbind::<dyn TestContract>();
    assert!(!container.is_bound::<dyn TestContract>());
}

#[test]
fn bind_to_abstraction_succeeds() {
    let mut container = container();

    container.bind::<dyn TestAbstract, TestDependency>().unwrap();
    assert!(container.is_bound::<dyn TestAbstract>());

    let object = container.new::<dyn TestAbstract>(args![]).unwrap();
    assert_eq!(object.kind(), "dependency");
}

#[test]
fn bind_fails_when_interface_is_not_implemented() {
    let mut container = container();

    let err = container.bind::<dyn TestContract, TestClass>().unwrap_err();
    assert!(matches!(err, ContainerError::InvalidBinding { .. }));
    assert!(!container.is_bound::<dyn TestContract>());

    let err = container.bind::<dyn TestAbstract, TestClass>().unwrap_err();
    assert!(matches!(err, ContainerError::InvalidBinding { .. }));
    assert!(!container.is_bound::<dyn TestAbstract>());
}

#[test]
fn rebind_replaces_previous_binding() {
    let mut container = container();
    container.bind::<dyn TestContract, TestDependency>().unwrap();
    container.bind::<dyn TestContract, TestDependency>().unwrap();

    assert!(container.is_bound::<dyn TestContract>());
    assert!(container.new::<dyn TestContract>(args![]).is_ok());
}

#[test]
fn share_under_interface_succeeds() {
    let mut container = container();

    container.share_as::<dyn TestContract>(Arc::new(TestDependency::new(String::from(
        STATUS_MODIFIED,
    ))));
    assert!(container.is_shared::<dyn TestContract>());
    assert!(!container.is_shared::<TestDependency>());
    assert_eq!(
        container.get::<dyn TestContract>().unwrap().status(),
        STATUS_MODIFIED
    );

    assert!(container.remove::<dyn TestContract>());
    assert!(container.get::<dyn TestContract>().is_none());
}

#[test]
fn share_under_own_type_preserves_identity() {
    let mut container = container();
    let dependency = Arc::new(TestDependency::new(String::from(STATUS_INIT)));

    container.share(Arc::clone(&dependency));
    assert!(container.is_shared::<TestDependency>());
    assert!(Arc::ptr_eq(
        &dependency,
        &container.get::<TestDependency>().unwrap()
    ));

    assert!(container.remove::<TestDependency>());
    assert!(container.get::<TestDependency>().is_none());
}

#[test]
fn tap_closure_succeeds() {
    let mut container = container();

    let result: bool = container
        .tap(check_dependency(), args![String::from("second parameter")])
        .unwrap();
    assert!(result);
}

#[test]
fn tap_closure_fails_when_argument_has_other_type() {
    let mut container = container();

    let err = container
        .tap::<()>(
            Callable::function(|Arg(_param): Arg<String>, _dependency: Arc<TestDependency>| {
                Ok::<_, Infallible>(())
            }),
            args![()],
        )
        .unwrap_err();
    assert!(matches!(err, ContainerError::ArgumentType { .. }));
}

#[test]
fn tap_closure_fails_when_too_many_arguments() {
    let mut container = container();

    let err = container
        .tap::<bool>(
            check_dependency(),
            args![String::from("second parameter"), String::from("third")],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::TooManyArguments {
            consumed: 1,
            supplied: 2,
            ..
        }
    ));
}

#[test]
fn tap_closure_fails_when_too_few_arguments() {
    let mut container = container();

    let err = container
        .tap::<bool>(check_dependency(), args![])
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::MissingArgument { position: 1, .. }
    ));
}

#[test]
fn tap_instance_method_succeeds() {
    let mut container = container();
    let test_class = TestClass::new();

    let result: bool = container
        .tap(Callable::method(&test_class, "one_dependency"), args![])
        .unwrap();
    assert!(result);
}

#[test]
fn tap_instance_method_fails_without_instance() {
    let mut container = container();

    let err = container
        .tap::<bool>(
            Callable::static_method::<TestClass>("one_dependency"),
            args![],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::StaticCallOnInstanceMethod { .. }
    ));

    let err = container
        .tap::<bool>(Callable::path("TestClass::one_dependency"), args![])
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::StaticCallOnInstanceMethod { .. }
    ));
}

#[test]
fn tap_static_method_succeeds() {
    let mut container = container();

    let result: bool = container
        .tap(
            Callable::static_method::<TestClass>("one_dependency_static"),
            args![],
        )
        .unwrap();
    assert!(result);

    let result: bool = container
        .tap(Callable::path("TestClass::one_dependency_static"), args![])
        .unwrap();
    assert!(result);
}

#[test]
fn new_without_arguments_uses_default() {
    let mut container = container();

    let dependency = container.new::<TestDependency>(args![]).unwrap();
    assert_eq!(dependency.status(), STATUS_INIT);
}

#[test]
fn new_with_arguments_succeeds() {
    let mut container = container();

    let dependency = container
        .new::<TestDependency>(args![String::from(STATUS_MODIFIED)])
        .unwrap();
    assert_eq!(dependency.status(), STATUS_MODIFIED);
}

#[test]
fn new_fails_when_abstraction_is_unbound() {
    let mut container = container();
    container.register::<TestConsumer>();

    let err = container.new::<dyn TestContract>(args![]).err().unwrap();
    assert!(matches!(
        err,
        ContainerError::UnresolvableDependency {
            parameter: None,
            reason: Unresolvable::Unknown,
            ..
        }
    ));

    let err = container.new::<TestConsumer>(args![]).err().unwrap();
    let ContainerError::UnresolvableDependency { parameter, .. } = &err else {
        panic!("`err` should be `UnresolvableDependency`");
    };
    assert_eq!(parameter.as_deref(), Some("contract"));
}

#[test]
fn tap_injects_shared_instance() {
    let mut container = container();
    let dependency = Arc::new(TestDependency::new(String::from(STATUS_INIT)));
    container.share(Arc::clone(&dependency));
    dependency.set_status(STATUS_MODIFIED);

    let result: bool = container
        .tap(Callable::path("TestClass::modified_dependency"), args![])
        .unwrap();
    assert!(result);
}

#[test]
fn singleton_is_constructed_once() {
    let mut container = Container::default();
    container.bind::<dyn Counter, TestCounter>().unwrap();

    let first = container.new::<TestCounter>(args![]).unwrap();
    let second = container.new::<TestCounter>(args![]).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert_eq!(first.increase(), 1);
    assert_eq!(second.increase(), 2);

    let counter = container.new::<dyn Counter>(args![]).unwrap();
    assert_eq!(counter.increase(), 3);
    assert!(container.is_shared::<TestCounter>());
}

#[test]
fn bound_contract_observes_shared_modification() {
    let mut container = container();
    container.bind::<dyn TestContract, TestDependency>().unwrap();

    let contract = container.new::<dyn TestContract>(args![]).unwrap();
    assert_eq!(contract.status(), STATUS_INIT);

    let consumer = container.new::<TestConsumer>(args![]);
    assert!(consumer.is_err());
    container.register::<TestConsumer>();
    let consumer = container.new::<TestConsumer>(args![]).unwrap();
    assert_eq!(consumer.contract.status(), STATUS_INIT);

    container.share(Arc::new(TestDependency::new(String::from(STATUS_MODIFIED))));
    let result: bool = container
        .tap(
            Callable::method(&TestClass::new(), "modified_dependency"),
            args![],
        )
        .unwrap();
    assert!(result);

    let status: String = container
        .tap(Callable::method(&TestClass::new(), "contract_status"), args![])
        .unwrap();
    assert_eq!(status, STATUS_INIT);
}
