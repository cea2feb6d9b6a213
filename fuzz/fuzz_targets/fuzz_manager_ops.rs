#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use txundo_core::{Manager, ManagerConfig, ObjectRef};
use txundo_harness::{Counter, HistoryModel, shared};

#[derive(Debug, Arbitrary)]
enum Step {
    Commit(i16),
    Join(i16),
    Cancel(i16),
    Undo,
    Redo,
    /// Release the tracked counter's id and register it again.
    Reregister,
    /// Register and drop a throwaway object to churn the id table.
    Churn,
}

#[derive(Debug, Arbitrary)]
struct Input {
    max_depth: u8,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    // 0 means unlimited.
    let depth = match input.max_depth % 16 {
        0 => usize::MAX,
        d => d as usize,
    };
    let mut mgr = Manager::new(ManagerConfig::default().with_max_depth(depth));
    let (counter, handle) = shared(Counter::new(0));
    Counter::register(&counter, &handle, &mut mgr);
    let mut model = HistoryModel::new(0);

    for step in input.steps.iter().take(256) {
        match *step {
            Step::Commit(v) => {
                mgr.transaction("commit", None);
                set(&mut mgr, &counter, v);
                mgr.commit();
                model.commit(v.into());
                model.truncate_front(depth);
            }
            Step::Join(v) => {
                let joinable = model.can_undo() && !model.can_redo();
                mgr.transaction("join", mgr.last_transaction_id());
                set(&mut mgr, &counter, v);
                mgr.commit();
                if joinable {
                    model.join(v.into());
                } else {
                    model.commit(v.into());
                    model.truncate_front(depth);
                }
            }
            Step::Cancel(v) => {
                mgr.transaction("cancel", None);
                set(&mut mgr, &counter, v);
                mgr.cancel();
                model.discard_redo();
            }
            Step::Undo => {
                if mgr.can_undo() {
                    mgr.undo().unwrap();
                }
                model.undo();
            }
            Step::Redo => {
                if mgr.can_redo() {
                    mgr.redo().unwrap();
                }
                model.redo();
            }
            Step::Reregister => {
                // History recorded under the old id goes stale with it.
                if let Some(id) = counter.borrow().id() {
                    assert!(mgr.release_object(id));
                    assert!(mgr.object_by_id(id).is_none());
                }
                Counter::register(&counter, &handle, &mut mgr);
                mgr.clear();
                model = HistoryModel::new(counter.borrow().value());
            }
            Step::Churn => {
                let (_, other): (_, ObjectRef) = shared(Counter::new(0));
                let id = mgr.next_id(&other);
                assert!(mgr.release_object(id));
                assert!(!mgr.release_object(id));
            }
        }

        assert_eq!(counter.borrow().value(), model.current());
        assert_eq!(mgr.undo_depth(), model.undo_depth());
        assert_eq!(mgr.redo_depth(), model.redo_depth());
        assert!(mgr.undo_depth() <= depth);
        assert!(!mgr.transacting() && !mgr.replaying());
    }
});

fn set(mgr: &mut Manager, counter: &Rc<RefCell<Counter>>, v: i16) {
    counter.borrow_mut().set_value(mgr, v.into()).unwrap();
}
