use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use piine_core::{instance, instance_or_init, AppController, StaticHost, ViewPort};
use shared::{
    domain::{ElementRef, ParticipantId},
    error::PiineError,
};

#[derive(Clone, Default)]
struct CountingView {
    added: Arc<Mutex<Vec<u32>>>,
    releases: Arc<AtomicUsize>,
}

impl ViewPort for CountingView {
    fn mount(&mut self, _host: &ElementRef) {}

    fn add_participant(&mut self, label: ParticipantId) {
        self.added.lock().expect("added").push(label.0);
    }

    fn remove_participant(&mut self, _label: ParticipantId) {}

    fn mark_reacting(&mut self, _index: ParticipantId) {}

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn singleton_is_built_once_and_shared_until_unload() {
    assert!(instance().is_none());

    let view = CountingView::default();
    let builds = AtomicUsize::new(0);
    let build = || {
        builds.fetch_add(1, Ordering::SeqCst);
        AppController::with_seed(
            Arc::new(StaticHost::with_all_controls()),
            Box::new(view.clone()),
            5,
        )
    };

    let first = instance_or_init(build);
    let second = instance_or_init(|| panic!("singleton must not be rebuilt"));
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, instance().expect("installed")));
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    for _ in 0..3 {
        second.click("add-user").expect("join");
    }
    let snapshot = first.flush().await.expect("flush");
    assert_eq!(snapshot.participant_count, 3);
    assert_eq!(*view.added.lock().expect("added"), vec![0, 1, 2]);

    first.unload().expect("unload");
    first.closed().await;
    assert!(first.snapshot().disposed);
    assert_eq!(view.releases.load(Ordering::SeqCst), 1);
    assert_eq!(second.click("add-user"), Err(PiineError::Disposed));
}
