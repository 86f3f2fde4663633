use super::*;
use std::cell::{Cell, RefCell};
use proptest::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

struct Sender {
    id: ObjectId,
}

impl Sender {
    fn new() -> Self {
        Self { id: ObjectId::next() }
    }
}

impl Object for Sender {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

static PINGED: Signal<Sender, i32> = Signal::new("pinged");
static PONGED: Signal<Sender, i32> = Signal::new("ponged");

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Slot<Sender, i32> {
    let log = log.clone();
    Rc::new(move |_: &Sender, value: &i32| log.borrow_mut().push(format!("{tag}:{value}")))
}

#[test]
fn emit_invokes_slots_in_connection_order() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");
    let b = recorder(&log, "b");

    assert!(PINGED.bind(&sender).connect(&a));
    assert!(PINGED.bind(&sender).connect(&b));
    PINGED.bind(&sender).emit(&1);

    assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
}

#[test]
fn duplicate_connection_is_rejected() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");

    assert!(PINGED.bind(&sender).connect(&a));
    assert!(!PINGED.bind(&sender).connect(&a));
    assert_eq!(sender_connection_count(sender.id), 1);

    PINGED.bind(&sender).emit(&7);
    assert_eq!(*log.borrow(), vec!["a:7"]);
}

#[test]
fn same_slot_with_distinct_receivers_connects_twice() {
    let sender = Sender::new();
    let count = Rc::new(Cell::new(0));
    let slot: Slot<Sender, i32> = {
        let count = count.clone();
        Rc::new(move |_: &Sender, _: &i32| count.set(count.get() + 1))
    };
    let first = ObjectId::next();
    let second = ObjectId::next();

    assert!(PINGED.bind(&sender).connect_with(&slot, Some(first)));
    assert!(PINGED.bind(&sender).connect_with(&slot, Some(second)));
    PINGED.bind(&sender).emit(&0);
    assert_eq!(count.get(), 2);
}

#[test]
fn disconnect_reports_whether_a_connection_was_removed() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");

    assert!(!PINGED.bind(&sender).disconnect(&a));
    PINGED.bind(&sender).connect(&a);
    assert!(!PONGED.bind(&sender).disconnect(&a));
    assert!(PINGED.bind(&sender).disconnect(&a));
    assert!(!PINGED.bind(&sender).disconnect(&a));

    PINGED.bind(&sender).emit(&3);
    assert!(log.borrow().is_empty());
    assert_eq!(sender_connection_count(sender.id), 0);
}

#[test]
fn signals_on_the_same_sender_are_independent() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");
    let b = recorder(&log, "b");

    PINGED.bind(&sender).connect(&a);
    PONGED.bind(&sender).connect(&b);
    PONGED.bind(&sender).emit(&2);

    assert_eq!(*log.borrow(), vec!["b:2"]);
}

#[test]
fn senders_do_not_share_connections() {
    let first = Sender::new();
    let second = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");

    PINGED.bind(&first).connect(&a);
    PINGED.bind(&second).emit(&5);
    assert!(log.borrow().is_empty());
}

#[test]
fn slot_connected_during_emission_waits_for_the_next_one() {
    let sender = Rc::new(Sender::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    let late = recorder(&log, "late");
    let connector: Slot<Sender, i32> = {
        let late = late.clone();
        let log = log.clone();
        Rc::new(move |sender: &Sender, value: &i32| {
            log.borrow_mut().push(format!("connector:{value}"));
            PINGED.bind(sender).connect(&late);
        })
    };

    PINGED.bind(&*sender).connect(&connector);
    PINGED.bind(&*sender).emit(&1);
    assert_eq!(*log.borrow(), vec!["connector:1"]);

    PINGED.bind(&*sender).emit(&2);
    assert_eq!(*log.borrow(), vec!["connector:1", "connector:2", "late:2"]);
}

#[test]
fn slot_disconnected_during_emission_is_skipped() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let victim = recorder(&log, "victim");
    let killer: Slot<Sender, i32> = {
        let victim = victim.clone();
        let log = log.clone();
        Rc::new(move |sender: &Sender, _: &i32| {
            log.borrow_mut().push("killer".to_string());
            assert!(PINGED.bind(sender).disconnect(&victim));
        })
    };

    PINGED.bind(&sender).connect(&killer);
    PINGED.bind(&sender).connect(&victim);
    PINGED.bind(&sender).emit(&1);

    assert_eq!(*log.borrow(), vec!["killer"]);
    assert_eq!(sender_connection_count(sender.id), 1);
}

#[test]
fn slot_disconnecting_itself_lets_its_neighbours_run() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = recorder(&log, "first");
    let last = recorder(&log, "last");
    let own: Rc<RefCell<Option<Slot<Sender, i32>>>> = Rc::default();
    let once: Slot<Sender, i32> = {
        let own = own.clone();
        let log = log.clone();
        Rc::new(move |sender: &Sender, value: &i32| {
            log.borrow_mut().push(format!("once:{value}"));
            if let Some(slot) = own.borrow().clone() {
                assert!(PINGED.bind(sender).disconnect(&slot));
            }
        })
    };
    *own.borrow_mut() = Some(once.clone());

    PINGED.bind(&sender).connect(&first);
    PINGED.bind(&sender).connect(&once);
    PINGED.bind(&sender).connect(&last);

    PINGED.bind(&sender).emit(&1);
    assert_eq!(*log.borrow(), vec!["first:1", "once:1", "last:1"]);
    assert_eq!(sender_connection_count(sender.id), 2);

    PINGED.bind(&sender).emit(&2);
    assert_eq!(
        *log.borrow(),
        vec!["first:1", "once:1", "last:1", "first:2", "last:2"]
    );
    own.borrow_mut().take();
}

#[test]
fn disconnect_sender_during_emission_stops_it() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let teardown: Slot<Sender, i32> = {
        let log = log.clone();
        Rc::new(move |sender: &Sender, _: &i32| {
            log.borrow_mut().push("teardown".to_string());
            disconnect_sender(sender.object_id());
        })
    };
    let after = recorder(&log, "after");

    PINGED.bind(&sender).connect(&teardown);
    PINGED.bind(&sender).connect(&after);
    PINGED.bind(&sender).emit(&1);

    assert_eq!(*log.borrow(), vec!["teardown"]);
    assert_eq!(sender_connection_count(sender.id), 0);
}

#[test]
fn nested_emission_on_the_same_sender() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reentrant: Slot<Sender, i32> = {
        let log = log.clone();
        Rc::new(move |sender: &Sender, value: &i32| {
            log.borrow_mut().push(format!("outer:{value}"));
            if *value > 0 {
                PINGED.bind(sender).emit(&(value - 1));
            }
        })
    };

    PINGED.bind(&sender).connect(&reentrant);
    PINGED.bind(&sender).emit(&2);

    assert_eq!(*log.borrow(), vec!["outer:2", "outer:1", "outer:0"]);
}

#[test]
fn disconnect_receiver_removes_all_of_its_connections() {
    let first = Sender::new();
    let second = Sender::new();
    let receiver = ObjectId::next();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");
    let b = recorder(&log, "b");
    let bare = recorder(&log, "bare");

    PINGED.bind(&first).connect_with(&a, Some(receiver));
    PONGED.bind(&second).connect_with(&b, Some(receiver));
    PINGED.bind(&first).connect(&bare);

    disconnect_receiver(Receiver::Object(receiver));
    PINGED.bind(&first).emit(&1);
    PONGED.bind(&second).emit(&1);

    assert_eq!(*log.borrow(), vec!["bare:1"]);
    assert_eq!(sender_connection_count(first.id), 1);
    assert_eq!(sender_connection_count(second.id), 0);
}

#[test]
fn bare_slot_is_its_own_receiver() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = recorder(&log, "a");

    PINGED.bind(&sender).connect(&a);
    disconnect_receiver(Receiver::of_slot(&a));
    PINGED.bind(&sender).emit(&1);
    assert!(log.borrow().is_empty());
}

#[test]
fn clear_signal_data_covers_both_roles() {
    let object = Sender::new();
    let other = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let as_sender = recorder(&log, "as-sender");
    let as_receiver = recorder(&log, "as-receiver");

    PINGED.bind(&object).connect(&as_sender);
    PINGED.bind(&other).connect_with(&as_receiver, Some(object.id));

    clear_signal_data(object.id);
    PINGED.bind(&object).emit(&1);
    PINGED.bind(&other).emit(&1);

    assert!(log.borrow().is_empty());
}

#[test]
fn panicking_slot_leaves_the_registry_usable() {
    let sender = Sender::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let boom: Slot<Sender, i32> = Rc::new(|_: &Sender, _: &i32| panic!("slot failed"));
    let victim = recorder(&log, "victim");
    let killer: Slot<Sender, i32> = {
        let victim = victim.clone();
        Rc::new(move |sender: &Sender, _: &i32| {
            PINGED.bind(sender).disconnect(&victim);
        })
    };

    PINGED.bind(&sender).connect(&killer);
    PINGED.bind(&sender).connect(&victim);
    PINGED.bind(&sender).connect(&boom);

    let result = catch_unwind(AssertUnwindSafe(|| PINGED.bind(&sender).emit(&1)));
    assert!(result.is_err());
    assert_eq!(sender_connection_count(sender.id), 2);

    assert!(PINGED.bind(&sender).disconnect(&boom));
    PINGED.bind(&sender).emit(&2);
    assert!(log.borrow().is_empty());
    assert_eq!(sender_connection_count(sender.id), 1);
}

#[test]
fn signal_ids_are_stable_and_distinct() {
    assert_eq!(PINGED.id(), PINGED.id());
    assert_ne!(PINGED.id(), PONGED.id());
    assert_eq!(PINGED.name(), "pinged");
}

proptest! {
    #[test]
    fn emit_reaches_each_distinct_slot_once_in_connect_order(
        count in 1usize..24,
        value in any::<i32>(),
    ) {
        let sender = Sender::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let slots: Vec<Slot<Sender, i32>> = (0..count)
            .map(|index| {
                let log = log.clone();
                Rc::new(move |_: &Sender, value: &i32| log.borrow_mut().push((index, *value)))
                    as Slot<Sender, i32>
            })
            .collect();

        for slot in &slots {
            prop_assert!(PINGED.bind(&sender).connect(slot));
        }
        for slot in &slots {
            prop_assert!(!PINGED.bind(&sender).connect(slot));
        }
        PINGED.bind(&sender).emit(&value);

        let expected: Vec<(usize, i32)> = (0..count).map(|index| (index, value)).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
        clear_signal_data(sender.id);
    }
}
