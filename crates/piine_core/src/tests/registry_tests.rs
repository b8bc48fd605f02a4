use super::*;
use shared::domain::ElementRef;

#[derive(Default)]
struct Counter {
    clicks: Vec<&'static str>,
}

fn first(counter: &mut Counter, _trigger: &Trigger) {
    counter.clicks.push("first");
}

fn second(counter: &mut Counter, _trigger: &Trigger) {
    counter.clicks.push("second");
}

fn element(id: &str) -> Option<TriggerSource> {
    Some(TriggerSource::Element(ElementRef::new(id)))
}

fn fire(registry: &EventRegistry<Counter>, owner: &mut Counter, trigger: &Trigger) {
    for handler in registry.handlers_for(trigger) {
        handler(owner, trigger);
    }
}

#[test]
fn dispatches_matching_handlers_in_registration_order() {
    let mut registry = EventRegistry::new();
    registry
        .listen(element("add-user"), TriggerKind::Click, first)
        .expect("first listener");
    registry
        .listen(element("add-user"), TriggerKind::Click, second)
        .expect("second listener");
    registry
        .listen(element("ovation"), TriggerKind::Click, second)
        .expect("other listener");

    let mut owner = Counter::default();
    fire(&registry, &mut owner, &Trigger::click("add-user"));

    assert_eq!(owner.clicks, vec!["first", "second"]);
}

#[test]
fn missing_source_registers_nothing() {
    let mut registry: EventRegistry<Counter> = EventRegistry::new();
    assert!(registry.listen(None, TriggerKind::Click, first).is_none());
    assert!(registry.is_empty());
}

#[test]
fn unlisten_removes_only_that_listener() {
    let mut registry = EventRegistry::new();
    let key = registry
        .listen(element("react-user"), TriggerKind::Click, first)
        .expect("listener");
    registry
        .listen(element("react-user"), TriggerKind::Click, second)
        .expect("listener");

    assert!(registry.unlisten(key));
    assert!(!registry.unlisten(key));
    assert_eq!(registry.len(), 1);

    let mut owner = Counter::default();
    fire(&registry, &mut owner, &Trigger::click("react-user"));
    assert_eq!(owner.clicks, vec!["second"]);
}

#[test]
fn remove_all_clears_but_keeps_registry_usable() {
    let mut registry = EventRegistry::new();
    registry
        .listen(Some(TriggerSource::Window), TriggerKind::Unload, first)
        .expect("listener");
    registry.remove_all();
    assert!(registry.is_empty());
    assert!(registry
        .listen(Some(TriggerSource::Window), TriggerKind::Unload, first)
        .is_some());
}

#[test]
fn dispose_is_idempotent_and_refuses_new_listeners() {
    let mut registry = EventRegistry::new();
    registry
        .listen(Some(TriggerSource::Window), TriggerKind::Unload, first)
        .expect("listener");

    registry.dispose();
    registry.dispose();

    assert!(registry.is_disposed());
    assert!(registry.is_empty());
    assert!(registry
        .listen(Some(TriggerSource::Window), TriggerKind::Unload, first)
        .is_none());
}
